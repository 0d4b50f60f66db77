//! Simulator Engine
//!
//! Runs the event loop of the three-node network:
//!
//! ```text
//! For each run k:
//! 1. Fresh nodes, empty queue, clock 0, stream k
//! 2. Schedule SimulationStart at t=0
//! 3. Pop earliest event, advance clock, dispatch to its handler
//! 4. Handlers mutate nodes/messages and schedule follow-up events
//! 5. Events past the horizon are dropped, so the queue eventually drains
//! 6. Close open busy intervals at the horizon, snapshot the statistics
//! ```
//!
//! # Example
//!
//! ```
//! use routing_sim_core::{SimulationConfig, Simulator};
//!
//! let config = SimulationConfig::new(600.0, 2).with_seed(7);
//! let mut sim = Simulator::new(config).unwrap();
//! let aggregate = sim.run().unwrap();
//!
//! assert_eq!(aggregate.run_end_time, 600.0);
//! assert_eq!(sim.run_digests().len(), 2);
//! ```

use crate::arrivals::ExternalArrivalGenerator;
use crate::config::SimulationConfig;
use crate::core::time::Clock;
use crate::error::SimulationError;
use crate::models::{Event, EventKind, Message, Network, NetworkSnapshot, NodeKind};
use crate::orchestrator::queue::EventQueue;
use crate::orchestrator::trace::RunTrace;
use crate::rng::{RandomStream, RngManager};
use crate::stats::{SimulationStatistics, StatsCollector};

/// Discrete-event simulator of the Master / Worker / Lazy network
///
/// Generic over the random stream so tests can drive it with a
/// [`crate::rng::ScriptedStream`]; production code uses [`RngManager`].
#[derive(Debug)]
pub struct Simulator<R: RandomStream = RngManager> {
    config: SimulationConfig,

    /// Stream every run's stream is derived from
    base_stream: R,

    /// Stream of the run in progress
    rng: R,

    network: Network,
    queue: EventQueue,
    clock: Clock,
    arrivals: ExternalArrivalGenerator,
    stats: StatsCollector,

    /// Start of the open interval during which all three nodes are busy
    joint_work_start: Option<f64>,

    /// Zero-based index of the run in progress (or last finished)
    run_index: usize,

    trace: RunTrace,
    digests: Vec<String>,
}

impl Simulator<RngManager> {
    /// Create a simulator seeded from `config.seed`
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the configuration fails validation.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let stream = RngManager::new(config.seed);
        Self::with_stream(config, stream)
    }
}

impl<R: RandomStream> Simulator<R> {
    /// Create a simulator drawing from an explicit stream
    pub fn with_stream(config: SimulationConfig, stream: R) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self::unvalidated(config, stream))
    }

    /// Create a simulator without validating `config`
    ///
    /// Allows degenerate horizons such as `max_time = 0`.
    ///
    /// # Panics
    /// Panics if `max_time` is negative or not finite.
    pub fn unvalidated(config: SimulationConfig, stream: R) -> Self {
        let rng = stream.for_run(0);
        Self {
            network: Network::new(),
            queue: EventQueue::new(config.max_time),
            clock: Clock::new(config.max_time),
            arrivals: ExternalArrivalGenerator::new(&config.network),
            stats: StatsCollector::new(),
            joint_work_start: None,
            run_index: 0,
            trace: RunTrace::new(),
            digests: Vec::new(),
            base_stream: stream,
            rng,
            config,
        }
    }

    // ========================================================================
    // Run control
    // ========================================================================

    /// Execute every configured run, returns the cross-run mean
    ///
    /// Results of earlier calls are discarded, so calling `run` twice on
    /// the same simulator reproduces the same results.
    pub fn run(&mut self) -> Result<SimulationStatistics, SimulationError> {
        self.run_with_observer(|_, _| {})
    }

    /// Like [`Simulator::run`], calling `observer` after every processed
    /// event with the event and the resulting network state
    pub fn run_with_observer<F>(
        &mut self,
        mut observer: F,
    ) -> Result<SimulationStatistics, SimulationError>
    where
        F: FnMut(&Event, &NetworkSnapshot),
    {
        self.stats = StatsCollector::new();
        self.digests.clear();

        for _ in 0..self.config.runs {
            self.begin_run();
            while let Some(event) = self.step()? {
                observer(&event, &self.current_snapshot());
            }
            self.finish_run();
        }

        self.final_aggregate_statistics()
            .ok_or_else(|| SimulationError::InvalidConfig("runs must be >= 1".to_string()))
    }

    /// Reset the network for the next run and schedule its start event
    pub fn begin_run(&mut self) {
        self.run_index = self.stats.history().len();
        self.rng = self.base_stream.for_run(self.run_index);
        self.network = Network::new();
        self.queue.clear();
        self.clock.reset();
        self.arrivals = ExternalArrivalGenerator::new(&self.config.network);
        self.stats.reset_run();
        self.joint_work_start = None;
        self.trace = RunTrace::new();

        tracing::debug!(run = self.run_index, horizon = self.clock.horizon(), "run started");
        self.schedule_event(Event::new(0.0, EventKind::SimulationStart));
    }

    /// Queue an event, returns false if it lies past the horizon and was dropped
    pub fn schedule_event(&mut self, event: Event) -> bool {
        let time = event.time();
        let label = event.kind().label();
        let kept = self.queue.schedule(event);
        if !kept {
            tracing::trace!(time, kind = label, "event beyond horizon dropped");
        }
        kept
    }

    /// Process the earliest pending event
    ///
    /// Returns the processed event, or `None` once the queue is empty.
    pub fn step(&mut self) -> Result<Option<Event>, SimulationError> {
        let Some(event) = self.queue.pop() else {
            return Ok(None);
        };

        let time = event.time();
        if let Err(event_time) = self.clock.advance_to(time) {
            let err = SimulationError::TimeWentBackwards {
                clock: self.clock.now(),
                event_time,
            };
            tracing::error!(run = self.run_index, error = %err, "run aborted");
            return Err(err);
        }

        self.trace.record(&event);
        tracing::debug!(
            time,
            kind = event.kind().label(),
            node = ?event.kind().node(),
            "processing event"
        );

        let processed = event.clone();
        if let Err(err) = self.process_event(event) {
            tracing::error!(run = self.run_index, time, error = %err, "run aborted");
            return Err(err);
        }
        Ok(Some(processed))
    }

    /// Close the current run and record its statistics
    ///
    /// Busy intervals still open are closed at the horizon, so busy and
    /// joint-work fractions always cover `[0, max_time]`. Pending events are
    /// discarded.
    pub fn finish_run(&mut self) -> &SimulationStatistics {
        let end = self.clock.horizon();
        for kind in NodeKind::ALL {
            self.network.node_mut(kind).close_open_interval(end);
        }
        if let Some(start) = self.joint_work_start.take() {
            self.stats.add_joint_work_time(end - start);
        }
        self.queue.clear();

        let trace = std::mem::take(&mut self.trace);
        let events = trace.events();
        self.digests.push(trace.finish());

        let run = self.run_index;
        let stats = self.stats.finish_run(&self.network, end);
        tracing::info!(
            run,
            events,
            rejected = stats.messages.rejected.count,
            sent_from_worker = stats.messages.sent_from_worker.count,
            sent_from_lazy = stats.messages.sent_from_lazy.count,
            joint_work_time = stats.joint_work_time,
            "run completed"
        );
        stats
    }

    // ========================================================================
    // Event handlers
    // ========================================================================

    fn process_event(&mut self, event: Event) -> Result<(), SimulationError> {
        let now = event.time();
        match event.into_kind() {
            EventKind::SimulationStart => {
                self.handle_simulation_start(now);
                Ok(())
            }
            EventKind::ExternalArrival { target, message } => {
                self.handle_external_arrival(now, target, message)
            }
            EventKind::InternalArrival { target, message } => {
                self.handle_internal_arrival(now, target, message);
                Ok(())
            }
            EventKind::ProcessingStart { node } => self.handle_processing_start(now, node),
            EventKind::ProcessingEnd { node, message } => {
                self.handle_processing_end(now, node, message)
            }
            EventKind::Reject { message } => self.handle_reject(now, message),
            EventKind::Send { message } => self.handle_send(now, message),
        }
    }

    fn handle_simulation_start(&mut self, now: f64) {
        let first_arrivals = self.arrivals.bootstrap(now, &mut self.rng);
        for event in first_arrivals {
            self.schedule_event(event);
        }
    }

    fn handle_external_arrival(
        &mut self,
        now: f64,
        target: NodeKind,
        message: Message,
    ) -> Result<(), SimulationError> {
        if !target.has_external_arrivals() {
            return Err(SimulationError::UnexpectedEvent {
                event: "external_arrival",
                node: target,
            });
        }

        let node = self.network.node_mut(target);
        node.enqueue(message, now);
        node.receive_message();
        self.schedule_start_if_needed(now, target);

        if let Some(next) = self.arrivals.next_arrival(target, now, &mut self.rng) {
            self.schedule_event(next);
        }
        Ok(())
    }

    fn handle_internal_arrival(&mut self, now: f64, target: NodeKind, message: Message) {
        let node = self.network.node_mut(target);
        node.enqueue(message, now);
        // Master only ever receives internal traffic; it is not counted
        if target != NodeKind::Master {
            node.receive_message();
        }
        self.schedule_start_if_needed(now, target);
    }

    fn handle_processing_start(&mut self, now: f64, kind: NodeKind) -> Result<(), SimulationError> {
        let end = self
            .network
            .node_mut(kind)
            .begin_service(now, &mut self.rng, &self.config.network)?;

        if self.joint_work_start.is_none() && self.network.all_busy() {
            self.joint_work_start = Some(now);
        }

        self.schedule_event(end);
        Ok(())
    }

    fn handle_processing_end(
        &mut self,
        now: f64,
        kind: NodeKind,
        message: Message,
    ) -> Result<(), SimulationError> {
        let outcome = self.network.node_mut(kind).end_service(
            now,
            message,
            &mut self.rng,
            &self.config.network,
        )?;

        if let Some(start) = self.joint_work_start.take() {
            self.stats.add_joint_work_time(now - start);
        }

        self.schedule_event(outcome);
        self.schedule_start_if_needed(now, kind);
        Ok(())
    }

    fn handle_reject(&mut self, now: f64, mut message: Message) -> Result<(), SimulationError> {
        message.mark_departure(now, true)?;
        self.network.node_mut(NodeKind::Lazy).reject_message();
        self.stats.store_message(message)?;
        Ok(())
    }

    fn handle_send(&mut self, now: f64, mut message: Message) -> Result<(), SimulationError> {
        message.mark_departure(now, false)?;
        self.network.node_mut(NodeKind::Master).send_message();
        self.stats.store_message(message)?;
        Ok(())
    }

    /// Schedule a processing-start at `now` when the node is idle with work
    /// queued and no start already pending
    fn schedule_start_if_needed(&mut self, now: f64, kind: NodeKind) {
        if !self.network.node(kind).needs_start() {
            return;
        }
        if self.schedule_event(Event::new(now, kind.start_of_service())) {
            self.network.node_mut(kind).mark_start_pending();
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Clock, run index and per-node state
    pub fn current_snapshot(&self) -> NetworkSnapshot {
        self.network.snapshot(self.clock.now(), self.run_index)
    }

    /// Statistics of the most recently finished run
    pub fn current_run_statistics(&self) -> Option<&SimulationStatistics> {
        self.stats.history().last()
    }

    /// Mean over every finished run
    pub fn final_aggregate_statistics(&self) -> Option<SimulationStatistics> {
        self.stats.aggregate()
    }

    /// SHA-256 digest of each finished run's processed events, in run order
    pub fn run_digests(&self) -> &[String] {
        &self.digests
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    pub fn run_index(&self) -> usize {
        self.run_index
    }

    /// Events waiting in the queue
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }
}
