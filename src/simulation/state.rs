//! Single-writer state container
//!
//! The sequencer is the only writer. Readers either take snapshots from the
//! `watch` channel or follow the ordered event stream on the `broadcast`
//! channel.

use crate::models::{SamplePoint, TestOutcome};
use crate::simulation::phase::{PhaseObserver, PhaseReport};
use crate::types::{Phase, TestStatus};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Buffered events per subscriber before it starts lagging
const EVENT_CAPACITY: usize = 1024;

/// Everything the UI renders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeedTestState {
    /// 1-based index of the current run, 0 before the first one
    pub run: u32,
    pub status: TestStatus,
    pub download: f64,
    pub upload: f64,
    pub ping: f64,
    /// Charted samples (download and upload only), append-only within a run
    pub samples: Vec<SamplePoint>,
    pub outcome: Option<TestOutcome>,
}

impl SpeedTestState {
    /// Latest displayed value of a phase
    pub fn live_value(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Download => self.download,
            Phase::Upload => self.upload,
            Phase::Ping => self.ping,
        }
    }

    /// Value the gauge shows for the current status
    pub fn gauge_value(&self) -> f64 {
        match self.status {
            TestStatus::Complete => self.outcome.as_ref().map_or(0.0, |o| o.download),
            status => status.phase().map_or(0.0, |phase| self.live_value(phase)),
        }
    }

    fn set_live_value(&mut self, phase: Phase, value: f64) {
        match phase {
            Phase::Download => self.download = value,
            Phase::Upload => self.upload = value,
            Phase::Ping => self.ping = value,
        }
    }
}

/// Ordered notifications emitted by the sequencer
#[derive(Debug, Clone, PartialEq)]
pub enum SpeedTestEvent {
    /// State was cleared for a new run
    RunReset { run: u32 },
    PhaseStarted { phase: Phase, duration: Duration },
    Sample(SamplePoint),
    PhaseCompleted { phase: Phase, value: f64 },
    TestCompleted(TestOutcome),
}

/// Owner of the speed test state
pub struct StateStore {
    state: watch::Sender<SpeedTestState>,
    events: broadcast::Sender<SpeedTestEvent>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SpeedTestState::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { state, events }
    }

    /// Receiver that always observes the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<SpeedTestState> {
        self.state.subscribe()
    }

    /// Receiver for events emitted after this call
    pub fn events(&self) -> broadcast::Receiver<SpeedTestEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SpeedTestState {
        self.state.borrow().clone()
    }

    fn emit(&self, event: SpeedTestEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Clear displayed values, samples and outcome before a new run
    pub(crate) fn reset(&self, run: u32) {
        self.state.send_modify(|state| {
            *state = SpeedTestState {
                run,
                ..SpeedTestState::default()
            };
        });
        self.emit(SpeedTestEvent::RunReset { run });
    }

    pub(crate) fn begin_phase(&self, phase: Phase, duration: Duration) {
        self.state.send_modify(|state| state.status = phase.status());
        self.emit(SpeedTestEvent::PhaseStarted { phase, duration });
    }

    pub(crate) fn record_sample(&self, sample: SamplePoint) {
        self.state.send_modify(|state| {
            state.set_live_value(sample.phase, sample.value);
            if sample.phase.is_charted() {
                state.samples.push(sample);
            }
        });
        self.emit(SpeedTestEvent::Sample(sample));
    }

    pub(crate) fn finish_phase(&self, phase: Phase, value: f64) {
        self.emit(SpeedTestEvent::PhaseCompleted { phase, value });
    }

    pub(crate) fn complete(&self, outcome: TestOutcome) {
        self.state.send_modify(|state| {
            state.status = TestStatus::Complete;
            state.outcome = Some(outcome.clone());
        });
        self.emit(SpeedTestEvent::TestCompleted(outcome));
    }
}

/// Feeds runner callbacks into a `StateStore`
pub struct StoreObserver<'a> {
    store: &'a StateStore,
}

impl<'a> StoreObserver<'a> {
    pub fn new(store: &'a StateStore) -> Self {
        Self { store }
    }
}

impl PhaseObserver for StoreObserver<'_> {
    fn on_tick(&mut self, sample: SamplePoint) {
        self.store.record_sample(sample);
    }

    fn on_complete(&mut self, report: &PhaseReport) {
        self.store.finish_phase(report.phase, report.final_value);
    }
}
