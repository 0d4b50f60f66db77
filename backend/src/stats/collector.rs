//! Per-run statistics collection
//!
//! The collector keeps every message that left the system during the current
//! run, grouped by how it left, plus the joint-work accumulator. At the end
//! of a run it turns them into a [`SimulationStatistics`] snapshot and keeps
//! that snapshot for cross-run aggregation.

use super::report::{
    CategoryStatistics, ComputerStatistics, MessageCategory, MessageStatistics,
    SimulationStatistics,
};
use crate::error::SimulationError;
use crate::models::{Message, Network, NodeKind};

/// Accumulates completed messages and joint busy time for one run at a time
///
/// # Example
/// ```
/// use routing_sim_core::stats::{MessageCategory, StatsCollector};
/// use routing_sim_core::{Message, NodeKind};
///
/// let mut stats = StatsCollector::new();
/// let mut msg = Message::new(NodeKind::Lazy, 1.0);
/// msg.mark_departure(6.0, true).unwrap();
///
/// assert_eq!(stats.store_message(msg).unwrap(), MessageCategory::Rejected);
/// assert_eq!(stats.messages(MessageCategory::Rejected).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatsCollector {
    rejected: Vec<Message>,
    sent_from_worker: Vec<Message>,
    sent_from_lazy: Vec<Message>,

    /// Time all three nodes were busy at once in the current run
    joint_work_time: f64,

    /// Snapshots of finished runs, in run order
    history: Vec<SimulationStatistics>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Category a completed message belongs to
    ///
    /// Rejection wins over source; a sent message must come from Worker or
    /// Lazy.
    pub fn classify(message: &Message) -> Result<MessageCategory, SimulationError> {
        match (message.is_rejected(), message.source()) {
            (true, _) => Ok(MessageCategory::Rejected),
            (false, NodeKind::Worker) => Ok(MessageCategory::SentFromWorker),
            (false, NodeKind::Lazy) => Ok(MessageCategory::SentFromLazy),
            (false, origin) => Err(SimulationError::UnclassifiableMessage {
                id: message.id().to_string(),
                origin,
            }),
        }
    }

    /// Record a message that left the system
    pub fn store_message(&mut self, message: Message) -> Result<MessageCategory, SimulationError> {
        let category = Self::classify(&message)?;
        tracing::trace!(id = message.id(), ?category, "message stored");
        self.bucket_mut(category).push(message);
        Ok(category)
    }

    /// Completed messages of a category in the current run
    pub fn messages(&self, category: MessageCategory) -> &[Message] {
        match category {
            MessageCategory::Rejected => &self.rejected,
            MessageCategory::SentFromWorker => &self.sent_from_worker,
            MessageCategory::SentFromLazy => &self.sent_from_lazy,
        }
    }

    fn bucket_mut(&mut self, category: MessageCategory) -> &mut Vec<Message> {
        match category {
            MessageCategory::Rejected => &mut self.rejected,
            MessageCategory::SentFromWorker => &mut self.sent_from_worker,
            MessageCategory::SentFromLazy => &mut self.sent_from_lazy,
        }
    }

    /// Metrics of each category in the current run
    pub fn per_category_averages(&self) -> Vec<(MessageCategory, MessageStatistics)> {
        MessageCategory::ALL
            .into_iter()
            .map(|category| {
                (
                    category,
                    MessageStatistics::from_messages(self.messages(category)),
                )
            })
            .collect()
    }

    /// Metrics of all completed messages pooled together
    pub fn overall_averages(&self) -> MessageStatistics {
        MessageStatistics::from_messages(
            self.rejected
                .iter()
                .chain(&self.sent_from_worker)
                .chain(&self.sent_from_lazy),
        )
    }

    /// Per-category and overall metrics in one report
    pub fn message_statistics(&self) -> CategoryStatistics {
        CategoryStatistics {
            rejected: MessageStatistics::from_messages(&self.rejected),
            sent_from_worker: MessageStatistics::from_messages(&self.sent_from_worker),
            sent_from_lazy: MessageStatistics::from_messages(&self.sent_from_lazy),
            overall: self.overall_averages(),
        }
    }

    /// Add a closed interval during which every node was busy
    pub fn add_joint_work_time(&mut self, duration: f64) {
        self.joint_work_time += duration.max(0.0);
    }

    pub fn joint_work_time(&self) -> f64 {
        self.joint_work_time
    }

    /// Busy time and counters of every node, Master first
    pub fn computer_statistics(network: &Network, run_end_time: f64) -> Vec<ComputerStatistics> {
        network
            .nodes()
            .map(|node| ComputerStatistics {
                kind: node.kind(),
                busy_time: node.busy_time(),
                busy_fraction: fraction(node.busy_time(), run_end_time),
                received_messages: node.received_messages() as f64,
                sent_messages: node.sent_messages() as f64,
                rejected_messages: node.rejected_messages() as f64,
            })
            .collect()
    }

    /// Statistics of the current run without closing it
    pub fn run_statistics(&self, network: &Network, run_end_time: f64) -> SimulationStatistics {
        SimulationStatistics {
            run_end_time,
            messages: self.message_statistics(),
            computers: Self::computer_statistics(network, run_end_time),
            joint_work_time: self.joint_work_time,
            joint_work_fraction: fraction(self.joint_work_time, run_end_time),
        }
    }

    /// Close the current run: snapshot it into the history and reset
    pub fn finish_run(&mut self, network: &Network, run_end_time: f64) -> &SimulationStatistics {
        let snapshot = self.run_statistics(network, run_end_time);
        tracing::debug!(
            run = self.history.len(),
            completed = snapshot.messages.overall.count,
            joint_work_time = snapshot.joint_work_time,
            "run statistics recorded"
        );
        self.history.push(snapshot);
        self.reset_run();
        &self.history[self.history.len() - 1]
    }

    /// Drop the current run's messages and joint-work total
    pub fn reset_run(&mut self) {
        self.rejected.clear();
        self.sent_from_worker.clear();
        self.sent_from_lazy.clear();
        self.joint_work_time = 0.0;
    }

    /// Snapshots of every finished run
    pub fn history(&self) -> &[SimulationStatistics] {
        &self.history
    }

    /// Mean over every finished run, `None` before the first one
    pub fn aggregate(&self) -> Option<SimulationStatistics> {
        SimulationStatistics::average(&self.history)
    }
}

fn fraction(part: f64, whole: f64) -> Option<f64> {
    if whole > 0.0 {
        Some(part / whole)
    } else {
        None
    }
}
