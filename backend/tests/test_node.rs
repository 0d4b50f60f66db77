//! Tests for the Node state machine and routing outcomes

use routing_sim_core::rng::ScriptedStream;
use routing_sim_core::{EventKind, Message, NetworkConfig, Node, NodeError, NodeKind, NodeState};

fn network() -> NetworkConfig {
    NetworkConfig::default()
}

#[test]
fn test_node_ids_are_fixed() {
    assert_eq!(NodeKind::Master.id(), 1);
    assert_eq!(NodeKind::Worker.id(), 2);
    assert_eq!(NodeKind::Lazy.id(), 3);
    assert!(!NodeKind::Master.has_external_arrivals());
}

#[test]
fn test_enqueue_is_fifo() {
    let mut worker = Node::new(NodeKind::Worker);
    let first = Message::new(NodeKind::Worker, 1.0);
    let first_id = first.id().to_string();
    worker.enqueue(first, 1.0);
    worker.enqueue(Message::new(NodeKind::Worker, 2.0), 2.0);

    let mut rng = ScriptedStream::new([0.0]);
    let end = worker.begin_service(2.0, &mut rng, &network()).unwrap();

    let served = end.kind().message().unwrap();
    assert_eq!(served.id(), first_id);
    assert_eq!(served.wait_time(), 1.0);
    assert_eq!(worker.queue_len(), 1);
}

#[test]
fn test_begin_service_sets_busy_and_marker_together() {
    let mut lazy = Node::new(NodeKind::Lazy);
    lazy.enqueue(Message::new(NodeKind::Lazy, 0.0), 0.0);
    assert_eq!(lazy.state(), NodeState::Idle);
    assert_eq!(lazy.busy_since(), None);

    let mut rng = ScriptedStream::new([0.5, 0.0]);
    let end = lazy.begin_service(0.0, &mut rng, &network()).unwrap();

    assert_eq!(lazy.state(), NodeState::Busy);
    assert_eq!(lazy.busy_since(), Some(0.0));
    // x = 3 + 2·0.5 = 4 accepted at u = 0
    assert_eq!(end.time(), 4.0);
    assert!(matches!(end.kind(), EventKind::ProcessingEnd { node: NodeKind::Lazy, .. }));
}

#[test]
fn test_begin_service_while_busy_fails() {
    let mut worker = Node::new(NodeKind::Worker);
    worker.enqueue(Message::new(NodeKind::Worker, 0.0), 0.0);
    worker.enqueue(Message::new(NodeKind::Worker, 0.0), 0.0);

    let mut rng = ScriptedStream::new([]);
    worker.begin_service(0.0, &mut rng, &network()).unwrap();
    let err = worker.begin_service(1.0, &mut rng, &network()).unwrap_err();

    assert_eq!(
        err,
        NodeError::AlreadyBusy {
            node: NodeKind::Worker,
            time: 1.0
        }
    );
    assert_eq!(worker.queue_len(), 1);
}

#[test]
fn test_end_service_accumulates_busy_time() {
    let mut worker = Node::new(NodeKind::Worker);
    worker.enqueue(Message::new(NodeKind::Worker, 1.0), 1.0);

    let mut rng = ScriptedStream::new([0.4]);
    let end = worker.begin_service(1.0, &mut rng, &network()).unwrap();
    let end_time = end.time();
    let message = match end.into_kind() {
        EventKind::ProcessingEnd { message, .. } => message,
        other => panic!("unexpected event {:?}", other),
    };

    let outcome = worker.end_service(end_time, message, &mut rng, &network()).unwrap();

    assert!((worker.busy_time() - 7.0).abs() < 1e-9);
    assert_eq!(worker.state(), NodeState::Idle);
    assert_eq!(outcome.time(), end_time);
    assert!(matches!(
        outcome.kind(),
        EventKind::InternalArrival {
            target: NodeKind::Master,
            ..
        }
    ));
}

#[test]
fn test_worker_outcome_consumes_no_draw() {
    let mut rng = ScriptedStream::new([0.1]);
    NodeKind::Worker
        .determine_outcome(0.0, Message::new(NodeKind::Worker, 0.0), &mut rng, &network())
        .unwrap();
    assert_eq!(rng.remaining(), 1);
}

#[test]
fn test_lazy_rejects_at_threshold() {
    let mut rng = ScriptedStream::new([0.75, 0.76]);

    let rejected = NodeKind::Lazy
        .determine_outcome(0.0, Message::new(NodeKind::Lazy, 0.0), &mut rng, &network())
        .unwrap();
    assert!(matches!(rejected.kind(), EventKind::Reject { .. }));

    let forwarded = NodeKind::Lazy
        .determine_outcome(0.0, Message::new(NodeKind::Lazy, 0.0), &mut rng, &network())
        .unwrap();
    assert!(matches!(
        forwarded.kind(),
        EventKind::InternalArrival {
            target: NodeKind::Master,
            ..
        }
    ));
}

#[test]
fn test_master_routing_depends_on_source() {
    // same draw, different sources: 0.3 > 0.2 sends a Worker message,
    // 0.3 <= 0.5 returns a Lazy message
    let mut rng = ScriptedStream::new([0.3, 0.3]);

    let worker_msg = NodeKind::Master
        .determine_outcome(1.0, Message::new(NodeKind::Worker, 0.0), &mut rng, &network())
        .unwrap();
    assert!(matches!(worker_msg.kind(), EventKind::Send { .. }));

    let lazy_msg = NodeKind::Master
        .determine_outcome(1.0, Message::new(NodeKind::Lazy, 0.0), &mut rng, &network())
        .unwrap();
    assert!(matches!(
        lazy_msg.kind(),
        EventKind::InternalArrival {
            target: NodeKind::Lazy,
            ..
        }
    ));
}

#[test]
fn test_master_service_is_normal_clamped() {
    let mut master = Node::new(NodeKind::Master);
    master.enqueue(Message::new(NodeKind::Worker, 0.0), 0.0);

    // 3 + 1·(-5) is clamped to zero
    let mut rng = ScriptedStream::new([]).with_normals([-5.0]);
    let end = master.begin_service(2.0, &mut rng, &network()).unwrap();
    assert_eq!(end.time(), 2.0);
}

#[test]
fn test_needs_start_respects_pending_flag() {
    let mut master = Node::new(NodeKind::Master);
    assert!(!master.needs_start());

    master.enqueue(Message::new(NodeKind::Lazy, 0.0), 0.0);
    assert!(master.needs_start());

    master.mark_start_pending();
    assert!(!master.needs_start());

    let mut rng = ScriptedStream::new([]);
    master.begin_service(0.0, &mut rng, &network()).unwrap();
    master.enqueue(Message::new(NodeKind::Lazy, 0.0), 0.0);
    assert!(!master.needs_start()); // busy
}
