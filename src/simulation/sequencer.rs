//! Speed test sequencer
//!
//! Drives `Idle → TestingDownload → TestingUpload → TestingPing → Complete`.
//! Each phase draws its ceiling when it starts and runs to completion before
//! the next one begins.

use crate::logging::SimulationLogger;
use crate::models::{Config, TestOutcome};
use crate::simulation::phase::{PhasePlan, PhaseRunner};
use crate::simulation::state::{SpeedTestEvent, SpeedTestState, StateStore, StoreObserver};
use crate::types::{Phase, TestStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Timing of a full sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceTiming {
    pub start_delay: Duration,
    pub tick_interval: Duration,
    pub download: Duration,
    pub upload: Duration,
    pub ping: Duration,
}

impl SequenceTiming {
    pub fn duration_of(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Download => self.download,
            Phase::Upload => self.upload,
            Phase::Ping => self.ping,
        }
    }
}

impl Default for SequenceTiming {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SequenceTiming {
    fn from(config: &Config) -> Self {
        Self {
            start_delay: config.start_delay(),
            tick_interval: config.tick_interval(),
            download: config.phase_duration(Phase::Download),
            upload: config.phase_duration(Phase::Upload),
            ping: config.phase_duration(Phase::Ping),
        }
    }
}

/// Ceilings collected while the phases run
#[derive(Debug, Default)]
struct Ceilings {
    download: f64,
    upload: f64,
    ping: f64,
}

impl Ceilings {
    fn set(&mut self, phase: Phase, value: f64) {
        match phase {
            Phase::Download => self.download = value,
            Phase::Upload => self.upload = value,
            Phase::Ping => self.ping = value,
        }
    }

    fn into_outcome(self) -> TestOutcome {
        TestOutcome::new(self.download, self.upload, self.ping)
    }
}

/// Simulated speed test: owns the timer, the random source and the state
pub struct SpeedTest<R = StdRng> {
    timing: SequenceTiming,
    runner: PhaseRunner<R>,
    store: StateStore,
    logger: SimulationLogger,
    runs: u32,
}

impl SpeedTest<StdRng> {
    /// Build from configuration, seeding from `config.seed` when set
    pub fn from_config(config: &Config) -> Self {
        Self::with_logger(config, SimulationLogger::new(config))
    }

    /// Same as `from_config` with a logger that carries session context
    pub fn with_logger(config: &Config, logger: SimulationLogger) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(SequenceTiming::from(config), rng, logger)
    }
}

impl<R: Rng + Send> SpeedTest<R> {
    pub fn new(timing: SequenceTiming, rng: R, logger: SimulationLogger) -> Self {
        Self {
            runner: PhaseRunner::new(timing.tick_interval, rng),
            timing,
            store: StateStore::new(),
            logger,
            runs: 0,
        }
    }

    pub fn timing(&self) -> &SequenceTiming {
        &self.timing
    }

    /// Number of runs started so far
    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn state(&self) -> SpeedTestState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SpeedTestState> {
        self.store.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<SpeedTestEvent> {
        self.store.events()
    }

    /// Run one full sequence.
    ///
    /// Resets the displayed values and the sample log first, waits for the
    /// start delay, then runs download, upload and ping back to back.
    pub async fn run(&mut self) -> TestOutcome {
        self.runs += 1;
        let run = self.runs;

        self.store.reset(run);
        self.logger.log_run_reset(run).await;

        if !self.timing.start_delay.is_zero() {
            tokio::time::sleep(self.timing.start_delay).await;
        }

        let mut ceilings = Ceilings::default();
        let mut status = TestStatus::Idle.advance();

        while let Some(phase) = status.phase() {
            let duration = self.timing.duration_of(phase);
            let ceiling = phase.draw_ceiling(self.runner.rng_mut());

            self.store.begin_phase(phase, duration);
            self.logger.log_phase_started(phase, duration, ceiling).await;

            let mut observer = StoreObserver::new(&self.store);
            let report = self
                .runner
                .run(PhasePlan { phase, duration, ceiling }, &mut observer)
                .await;

            self.logger.log_phase_completed(phase, report.ticks, report.elapsed).await;
            ceilings.set(phase, report.final_value);
            status = status.advance();
        }

        let outcome = ceilings.into_outcome();
        self.store.complete(outcome.clone());
        self.logger.log_outcome(run, &outcome).await;
        outcome
    }
}

impl<R: Rng + Send + 'static> SpeedTest<R> {
    /// Move the test onto a task that performs `runs` sequences.
    ///
    /// Aborting the handle abandons the active timer mid-phase.
    pub fn spawn(mut self, runs: u32) -> JoinHandle<(Self, Vec<TestOutcome>)> {
        tokio::spawn(async move {
            let mut outcomes = Vec::new();
            for _ in 0..runs {
                outcomes.push(self.run().await);
            }
            (self, outcomes)
        })
    }
}
