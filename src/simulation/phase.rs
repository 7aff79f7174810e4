//! Timer-driven phase runner
//!
//! A phase ticks on a fixed interval until its duration has elapsed. Each
//! tick emits a value interpolated towards the phase ceiling: a linear ramp
//! over the first 20% of the duration, then a plateau, both perturbed by up
//! to ±12.5% of the base value and floored at zero. Once the duration has
//! passed the timer is dropped and the exact ceiling is emitted as the last
//! sample.

use crate::models::SamplePoint;
use crate::types::Phase;
use rand::Rng;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Fraction of the duration spent ramping up
pub const RAMP_FRACTION: f64 = 0.2;

/// Peak-to-peak perturbation as a fraction of the base value (±12.5%)
pub const FLUCTUATION_SPAN: f64 = 0.25;

/// What a single phase should simulate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhasePlan {
    pub phase: Phase,
    pub duration: Duration,
    pub ceiling: f64,
}

/// Summary handed to `PhaseObserver::on_complete`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Exact ceiling, equal to the last emitted sample
    pub final_value: f64,
    /// Interpolated samples emitted before the final one
    pub ticks: u32,
    /// Elapsed time when the timer was cancelled
    pub elapsed: Duration,
}

/// Receives the samples of a running phase.
///
/// `on_tick` is called for every interpolated sample and once more with the
/// exact ceiling; `on_complete` follows exactly once.
pub trait PhaseObserver: Send {
    fn on_tick(&mut self, sample: SamplePoint);

    fn on_complete(&mut self, report: &PhaseReport);
}

/// Base value before perturbation
pub fn ramp_base(progress: f64, ceiling: f64) -> f64 {
    if progress < RAMP_FRACTION {
        (progress / RAMP_FRACTION) * ceiling
    } else {
        ceiling
    }
}

/// Interpolated value for `progress` in `[0, 1)`.
///
/// `noise` is a uniform draw from `[0, 1)`; 0.5 means no perturbation.
pub fn interpolate(progress: f64, ceiling: f64, noise: f64) -> f64 {
    let base = ramp_base(progress, ceiling);
    let fluctuation = (noise - 0.5) * (base * FLUCTUATION_SPAN);
    (base + fluctuation).max(0.0)
}

/// Runs phases one at a time on a tokio interval
pub struct PhaseRunner<R> {
    tick_interval: Duration,
    rng: R,
}

impl<R: Rng + Send> PhaseRunner<R> {
    pub fn new(tick_interval: Duration, rng: R) -> Self {
        Self { tick_interval, rng }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Random source shared with ceiling draws
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Simulate one phase to completion.
    ///
    /// Dropping the returned future cancels the timer; no further callbacks
    /// are made in that case.
    pub async fn run<O>(&mut self, plan: PhasePlan, observer: &mut O) -> PhaseReport
    where
        O: PhaseObserver + ?Sized,
    {
        let start = Instant::now();
        // First tick lands one period after start, like a browser interval.
        let mut interval = time::interval_at(start + self.tick_interval, self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let total = plan.duration.as_secs_f64();
        let mut ticks = 0u32;

        let elapsed = loop {
            interval.tick().await;
            let elapsed = start.elapsed();
            if elapsed >= plan.duration {
                break elapsed;
            }

            let progress = elapsed.as_secs_f64() / total;
            let value = interpolate(progress, plan.ceiling, self.rng.gen::<f64>());
            ticks += 1;
            observer.on_tick(SamplePoint::new(plan.phase, elapsed, value));
        };
        drop(interval);

        observer.on_tick(SamplePoint::new(plan.phase, plan.duration, plan.ceiling));

        let report = PhaseReport {
            phase: plan.phase,
            final_value: plan.ceiling,
            ticks,
            elapsed,
        };
        observer.on_complete(&report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Recorder {
        samples: Vec<SamplePoint>,
        completions: Vec<PhaseReport>,
    }

    impl PhaseObserver for Recorder {
        fn on_tick(&mut self, sample: SamplePoint) {
            assert!(self.completions.is_empty(), "tick after completion");
            self.samples.push(sample);
        }

        fn on_complete(&mut self, report: &PhaseReport) {
            self.completions.push(*report);
        }
    }

    fn runner(seed: u64) -> PhaseRunner<StdRng> {
        PhaseRunner::new(Duration::from_millis(150), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_ramp_base() {
        assert_eq!(ramp_base(0.0, 200.0), 0.0);
        assert_eq!(ramp_base(0.1, 200.0), 100.0);
        assert_eq!(ramp_base(0.2, 200.0), 200.0);
        assert_eq!(ramp_base(0.9, 200.0), 200.0);
    }

    #[test]
    fn test_interpolate_extremes() {
        // Midpoint noise leaves the base untouched
        assert_eq!(interpolate(0.5, 100.0, 0.5), 100.0);
        // Noise at the edges moves by 12.5%
        assert!((interpolate(0.5, 100.0, 0.0) - 87.5).abs() < 1e-9);
        assert!((interpolate(0.5, 100.0, 1.0) - 112.5).abs() < 1e-9);
        // Zero base never goes negative
        assert_eq!(interpolate(0.0, 100.0, 0.0), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_sample_is_exact_ceiling() {
        let mut runner = runner(1);
        let mut recorder = Recorder::default();
        let plan = PhasePlan {
            phase: Phase::Download,
            duration: Duration::from_millis(8000),
            ceiling: 100.0,
        };

        let report = runner.run(plan, &mut recorder).await;

        let last = recorder.samples.last().unwrap();
        assert_eq!(last.value, 100.0);
        assert_eq!(last.elapsed_secs, 8.0);
        assert!(recorder.samples.iter().any(|s| s.elapsed_secs >= 7.0));
        assert_eq!(report.final_value, 100.0);
        assert_eq!(recorder.completions.len(), 1);
        assert_eq!(recorder.completions[0], report);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_cadence() {
        let mut runner = runner(2);
        let mut recorder = Recorder::default();
        let plan = PhasePlan {
            phase: Phase::Upload,
            duration: Duration::from_millis(1500),
            ceiling: 40.0,
        };

        let report = runner.run(plan, &mut recorder).await;

        // Ticks at 150..=1350ms, the tick at 1500ms terminates
        assert_eq!(report.ticks, 9);
        assert_eq!(recorder.samples.len(), 10);
        assert_eq!(report.elapsed, Duration::from_millis(1500));

        let first = recorder.samples[0];
        assert!((first.elapsed_secs - 0.15).abs() < 1e-9);
        for pair in recorder.samples.windows(2) {
            assert!(pair[0].elapsed_secs < pair[1].elapsed_secs);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_values_respect_ramp_and_plateau_bounds() {
        let mut runner = runner(3);
        let mut recorder = Recorder::default();
        let duration = Duration::from_millis(8000);
        let ceiling = 320.0;
        runner
            .run(PhasePlan { phase: Phase::Download, duration, ceiling }, &mut recorder)
            .await;

        let (body, last) = recorder.samples.split_at(recorder.samples.len() - 1);
        assert_eq!(last[0].value, ceiling);

        let total = duration.as_secs_f64();
        for sample in body {
            let progress = sample.elapsed_secs / total;
            assert!(sample.value >= 0.0);
            if progress < RAMP_FRACTION {
                let linear = progress / RAMP_FRACTION * ceiling;
                assert!(sample.value <= linear * 1.125 + 1e-9);
            } else {
                assert!(sample.value >= ceiling * 0.875 - 1e-9);
                assert!(sample.value <= ceiling * 1.125 + 1e-9);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_shorter_than_tick_emits_only_ceiling() {
        let mut runner = runner(4);
        let mut recorder = Recorder::default();
        let plan = PhasePlan {
            phase: Phase::Ping,
            duration: Duration::from_millis(100),
            ceiling: 17.5,
        };

        let report = runner.run(plan, &mut recorder).await;

        assert_eq!(report.ticks, 0);
        assert_eq!(recorder.samples.len(), 1);
        assert_eq!(recorder.samples[0].value, 17.5);
        assert_eq!(recorder.completions.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_run_cancels_callbacks() {
        let mut runner = runner(5);
        let mut recorder = Recorder::default();
        let plan = PhasePlan {
            phase: Phase::Download,
            duration: Duration::from_millis(8000),
            ceiling: 100.0,
        };

        let result = time::timeout(Duration::from_millis(1000), runner.run(plan, &mut recorder)).await;

        assert!(result.is_err());
        assert!(recorder.completions.is_empty());
        assert!(recorder.samples.iter().all(|s| s.elapsed_secs < 1.0));
    }
}
