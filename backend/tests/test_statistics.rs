//! Run statistics and cross-run aggregation

use routing_sim_core::{
    CategoryStatistics, ComputerStatistics, EventKind, MessageStatistics, NodeKind,
    SimulationConfig, SimulationStatistics, Simulator,
};

fn computers(busy: [f64; 3], end: f64) -> Vec<ComputerStatistics> {
    NodeKind::ALL
        .into_iter()
        .zip(busy)
        .map(|(kind, busy_time)| ComputerStatistics {
            kind,
            busy_time,
            busy_fraction: if end > 0.0 { Some(busy_time / end) } else { None },
            received_messages: 10.0,
            sent_messages: 0.0,
            rejected_messages: 0.0,
        })
        .collect()
}

fn with_rejected(rejected: MessageStatistics, end: f64) -> SimulationStatistics {
    SimulationStatistics {
        run_end_time: end,
        messages: CategoryStatistics {
            rejected,
            overall: rejected,
            ..Default::default()
        },
        computers: computers([2.0, 4.0, 6.0], end),
        joint_work_time: 1.0,
        joint_work_fraction: if end > 0.0 { Some(1.0 / end) } else { None },
    }
}

#[test]
fn test_single_run_aggregate_is_identity() {
    let mut sim = Simulator::new(SimulationConfig::new(3_600.0, 1).with_seed(77)).unwrap();
    let aggregate = sim.run().unwrap();

    let run = sim.current_run_statistics().unwrap();
    assert_eq!(&aggregate, run);
    assert_eq!(sim.final_aggregate_statistics().as_ref(), Some(run));
}

#[test]
fn test_no_statistics_before_first_run() {
    let sim = Simulator::new(SimulationConfig::new(100.0, 1)).unwrap();
    assert!(sim.current_run_statistics().is_none());
    assert!(sim.final_aggregate_statistics().is_none());
    assert!(sim.run_digests().is_empty());
}

#[test]
fn test_average_is_position_wise_mean() {
    let first = with_rejected(
        MessageStatistics {
            count: 4.0,
            mean_wait_time: Some(1.0),
            mean_time_in_system: Some(4.0),
            efficiency: Some(0.25),
        },
        10.0,
    );
    let second = with_rejected(
        MessageStatistics {
            count: 2.0,
            mean_wait_time: Some(3.0),
            mean_time_in_system: Some(6.0),
            efficiency: Some(0.5),
        },
        10.0,
    );

    let mean = SimulationStatistics::average(&[first, second]).unwrap();
    assert_eq!(mean.run_end_time, 10.0);
    assert_eq!(mean.messages.rejected.count, 3.0);
    assert_eq!(mean.messages.rejected.mean_wait_time, Some(2.0));
    assert_eq!(mean.messages.rejected.mean_time_in_system, Some(5.0));
    assert_eq!(mean.messages.rejected.efficiency, Some(0.375));
    assert_eq!(mean.joint_work_fraction, Some(0.1));

    let lazy = mean.computer(NodeKind::Lazy).unwrap();
    assert_eq!(lazy.busy_time, 6.0);
    assert_eq!(lazy.received_messages, 10.0);
    assert_eq!(mean.computers.len(), 3);
}

#[test]
fn test_average_skips_runs_without_data() {
    let with_data = with_rejected(
        MessageStatistics {
            count: 2.0,
            mean_wait_time: Some(4.0),
            mean_time_in_system: Some(8.0),
            efficiency: Some(0.5),
        },
        10.0,
    );
    let empty = with_rejected(MessageStatistics::default(), 10.0);

    let mean = SimulationStatistics::average(&[with_data, empty]).unwrap();
    assert_eq!(mean.messages.rejected.count, 1.0);
    // undefined in one run: averaged over the run that defines it
    assert_eq!(mean.messages.rejected.mean_wait_time, Some(4.0));
    assert_eq!(mean.messages.rejected.efficiency, Some(0.5));
    assert_eq!(mean.messages.sent_from_lazy.mean_wait_time, None);
}

#[test]
fn test_multi_run_aggregate_matches_history() {
    let mut sim = Simulator::new(SimulationConfig::new(1_200.0, 4).with_seed(5)).unwrap();
    let aggregate = sim.run().unwrap();

    let history = sim.stats().history();
    assert_eq!(history.len(), 4);

    let expected_rejected = history
        .iter()
        .map(|s| s.messages.rejected.count)
        .sum::<f64>()
        / 4.0;
    assert!((aggregate.messages.rejected.count - expected_rejected).abs() < 1e-9);
    assert_eq!(aggregate.run_end_time, 1_200.0);
}

#[test]
fn test_overall_count_is_sum_of_categories() {
    let mut sim = Simulator::new(SimulationConfig::new(3_600.0, 1).with_seed(31)).unwrap();
    let stats = sim.run().unwrap();

    let messages = &stats.messages;
    assert_eq!(
        messages.overall.count,
        messages.rejected.count + messages.sent_from_worker.count + messages.sent_from_lazy.count
    );

    let master = stats.computer(NodeKind::Master).unwrap();
    let lazy = stats.computer(NodeKind::Lazy).unwrap();
    assert_eq!(
        master.sent_messages,
        messages.sent_from_worker.count + messages.sent_from_lazy.count
    );
    assert_eq!(lazy.rejected_messages, messages.rejected.count);
}

#[test]
fn test_lazy_rejection_fraction_converges() {
    let mut sim = Simulator::new(SimulationConfig::new(36_000.0, 2).with_seed(2024)).unwrap();

    let mut lazy_outcomes = 0u64;
    let mut rejections = 0u64;
    sim.run_with_observer(|event, _| match event.kind() {
        EventKind::ProcessingEnd {
            node: NodeKind::Lazy,
            ..
        } => lazy_outcomes += 1,
        EventKind::Reject { .. } => rejections += 1,
        _ => {}
    })
    .unwrap();

    // one outcome per end of service; a reject always follows its end
    assert!(lazy_outcomes > 5_000);
    let fraction = rejections as f64 / lazy_outcomes as f64;
    assert!((fraction - 0.75).abs() < 0.03, "fraction was {}", fraction);
}

#[test]
fn test_statistics_serialize_to_json() {
    let mut sim = Simulator::new(SimulationConfig::new(600.0, 1).with_seed(3)).unwrap();
    let stats = sim.run().unwrap();

    let value = serde_json::to_value(&stats).unwrap();
    assert_eq!(value["run_end_time"], 600.0);
    assert!(value["messages"]["overall"]["count"].is_number());
    assert_eq!(value["computers"][0]["kind"], "Master");
}
