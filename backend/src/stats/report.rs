//! Statistics reports
//!
//! [`SimulationStatistics`] is the shape of both a single run's results and
//! the cross-run average, so a presentation layer handles both the same way.
//! Counts are `f64` because the cross-run figures are means.
//!
//! Metrics that have no data (a category with no completed messages, a
//! fraction of a zero-length run) are `None`, never zero.

use crate::models::{Message, NodeKind};
use serde::Serialize;

/// How a message left the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    Rejected,
    SentFromWorker,
    SentFromLazy,
}

impl MessageCategory {
    pub const ALL: [MessageCategory; 3] = [
        MessageCategory::Rejected,
        MessageCategory::SentFromWorker,
        MessageCategory::SentFromLazy,
    ];
}

/// Wait / in-system metrics over a set of completed messages
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MessageStatistics {
    pub count: f64,
    pub mean_wait_time: Option<f64>,
    pub mean_time_in_system: Option<f64>,

    /// Mean wait ÷ mean time in system
    pub efficiency: Option<f64>,
}

impl MessageStatistics {
    /// Compute the metrics of completed messages
    ///
    /// Messages still in the system (no exit time) are ignored.
    pub fn from_messages<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Self {
        let mut count = 0usize;
        let mut total_wait = 0.0;
        let mut total_in_system = 0.0;

        for message in messages {
            if let Some(in_system) = message.time_in_system() {
                count += 1;
                total_wait += message.wait_time();
                total_in_system += in_system;
            }
        }

        if count == 0 {
            return Self::default();
        }

        let n = count as f64;
        let mean_wait_time = total_wait / n;
        let mean_time_in_system = total_in_system / n;
        let efficiency = if mean_time_in_system > 0.0 {
            Some(mean_wait_time / mean_time_in_system)
        } else {
            None
        };

        Self {
            count: n,
            mean_wait_time: Some(mean_wait_time),
            mean_time_in_system: Some(mean_time_in_system),
            efficiency,
        }
    }

    fn average(items: &[&MessageStatistics]) -> Self {
        Self {
            count: mean(items.iter().map(|s| s.count)),
            mean_wait_time: mean_defined(items.iter().map(|s| s.mean_wait_time)),
            mean_time_in_system: mean_defined(items.iter().map(|s| s.mean_time_in_system)),
            efficiency: mean_defined(items.iter().map(|s| s.efficiency)),
        }
    }
}

/// Per-category metrics plus the pooled overall figure
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CategoryStatistics {
    pub rejected: MessageStatistics,
    pub sent_from_worker: MessageStatistics,
    pub sent_from_lazy: MessageStatistics,

    /// All categories pooled (weighted by message count)
    pub overall: MessageStatistics,
}

impl CategoryStatistics {
    pub fn get(&self, category: MessageCategory) -> &MessageStatistics {
        match category {
            MessageCategory::Rejected => &self.rejected,
            MessageCategory::SentFromWorker => &self.sent_from_worker,
            MessageCategory::SentFromLazy => &self.sent_from_lazy,
        }
    }

    fn average(items: &[&CategoryStatistics]) -> Self {
        let field = |f: fn(&CategoryStatistics) -> &MessageStatistics| {
            let column: Vec<&MessageStatistics> = items.iter().map(|s| f(s)).collect();
            MessageStatistics::average(&column)
        };

        Self {
            rejected: field(|s| &s.rejected),
            sent_from_worker: field(|s| &s.sent_from_worker),
            sent_from_lazy: field(|s| &s.sent_from_lazy),
            overall: field(|s| &s.overall),
        }
    }
}

/// Busy time and counters of one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComputerStatistics {
    pub kind: NodeKind,
    pub busy_time: f64,

    /// busy_time ÷ run end time
    pub busy_fraction: Option<f64>,

    pub received_messages: f64,
    pub sent_messages: f64,
    pub rejected_messages: f64,
}

impl ComputerStatistics {
    fn average(kind: NodeKind, items: &[&ComputerStatistics]) -> Self {
        Self {
            kind,
            busy_time: mean(items.iter().map(|s| s.busy_time)),
            busy_fraction: mean_defined(items.iter().map(|s| s.busy_fraction)),
            received_messages: mean(items.iter().map(|s| s.received_messages)),
            sent_messages: mean(items.iter().map(|s| s.sent_messages)),
            rejected_messages: mean(items.iter().map(|s| s.rejected_messages)),
        }
    }
}

/// Everything measured in a run, or the mean over several runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationStatistics {
    /// Length of the measured interval (the run horizon)
    pub run_end_time: f64,

    pub messages: CategoryStatistics,

    /// Master, Worker, Lazy
    pub computers: Vec<ComputerStatistics>,

    /// Time all three nodes were busy at once
    pub joint_work_time: f64,
    pub joint_work_fraction: Option<f64>,
}

impl SimulationStatistics {
    pub fn computer(&self, kind: NodeKind) -> Option<&ComputerStatistics> {
        self.computers.iter().find(|c| c.kind == kind)
    }

    /// Position-wise mean of run snapshots
    ///
    /// Optional metrics are averaged over the runs that define them. Returns
    /// `None` for an empty slice; a single snapshot averages to itself.
    pub fn average(snapshots: &[SimulationStatistics]) -> Option<SimulationStatistics> {
        if snapshots.is_empty() {
            return None;
        }

        let messages: Vec<&CategoryStatistics> = snapshots.iter().map(|s| &s.messages).collect();
        let computers = NodeKind::ALL
            .into_iter()
            .map(|kind| {
                let column: Vec<&ComputerStatistics> =
                    snapshots.iter().filter_map(|s| s.computer(kind)).collect();
                ComputerStatistics::average(kind, &column)
            })
            .collect();

        Some(SimulationStatistics {
            run_end_time: mean(snapshots.iter().map(|s| s.run_end_time)),
            messages: CategoryStatistics::average(&messages),
            computers,
            joint_work_time: mean(snapshots.iter().map(|s| s.joint_work_time)),
            joint_work_fraction: mean_defined(snapshots.iter().map(|s| s.joint_work_fraction)),
        })
    }
}

/// Arithmetic mean, 0.0 for no values
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Mean over the defined values only
fn mean_defined(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn departed(source: NodeKind, arrival: f64, wait: f64, exit: f64) -> Message {
        let mut message = Message::new(source, arrival);
        message.mark_enqueue_time(arrival);
        message.update_wait_time(arrival + wait);
        message.mark_departure(exit, false).unwrap();
        message
    }

    #[test]
    fn test_empty_set_has_no_data() {
        let stats = MessageStatistics::from_messages([]);
        assert_eq!(stats.count, 0.0);
        assert_eq!(stats.mean_wait_time, None);
        assert_eq!(stats.mean_time_in_system, None);
        assert_eq!(stats.efficiency, None);
    }

    #[test]
    fn test_efficiency_is_ratio_of_means() {
        let messages = [
            departed(NodeKind::Worker, 0.0, 2.0, 10.0),
            departed(NodeKind::Worker, 5.0, 4.0, 15.0),
        ];
        let stats = MessageStatistics::from_messages(&messages);
        assert_eq!(stats.count, 2.0);
        assert_eq!(stats.mean_wait_time, Some(3.0));
        assert_eq!(stats.mean_time_in_system, Some(10.0));
        assert_eq!(stats.efficiency, Some(0.3));
    }

    #[test]
    fn test_zero_time_in_system_omits_efficiency() {
        let messages = [departed(NodeKind::Lazy, 4.0, 0.0, 4.0)];
        let stats = MessageStatistics::from_messages(&messages);
        assert_eq!(stats.mean_time_in_system, Some(0.0));
        assert_eq!(stats.efficiency, None);
    }

    #[test]
    fn test_mean_defined_skips_missing_runs() {
        assert_eq!(mean_defined([Some(2.0), None, Some(4.0)].into_iter()), Some(3.0));
        assert_eq!(mean_defined([None, None].into_iter()), None);
        assert_eq!(mean([1.0, 2.0].into_iter()), 1.5);
    }

    #[test]
    fn test_average_of_nothing_is_none() {
        assert!(SimulationStatistics::average(&[]).is_none());
    }
}
