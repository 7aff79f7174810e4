//! Property and timing tests for the public simulation API

use pingpanic::models::{Config, SamplePoint};
use pingpanic::simulation::{interpolate, ramp_base, PhaseObserver, PhasePlan, PhaseReport, PhaseRunner};
use pingpanic::{Phase, SpeedTest, TestStatus};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

#[derive(Default)]
struct Recorder {
    samples: Vec<SamplePoint>,
    completions: Vec<PhaseReport>,
}

impl PhaseObserver for Recorder {
    fn on_tick(&mut self, sample: SamplePoint) {
        self.samples.push(sample);
    }

    fn on_complete(&mut self, report: &PhaseReport) {
        self.completions.push(*report);
    }
}

proptest! {
    #[test]
    fn interpolated_values_stay_within_fluctuation_band(
        progress in 0.0f64..1.0,
        ceiling in 0.0f64..1000.0,
        noise in 0.0f64..1.0,
    ) {
        let base = ramp_base(progress, ceiling);
        let value = interpolate(progress, ceiling, noise);
        prop_assert!(value >= 0.0);
        prop_assert!(value >= base * 0.875 - 1e-9);
        prop_assert!(value <= base * 1.125 + 1e-9);
    }

    #[test]
    fn plateau_base_is_the_ceiling(progress in 0.2f64..1.0, ceiling in 1.0f64..500.0) {
        prop_assert_eq!(ramp_base(progress, ceiling), ceiling);
    }

    #[test]
    fn ramp_base_grows_with_progress(a in 0.0f64..0.2, b in 0.0f64..0.2, ceiling in 1.0f64..500.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(ramp_base(lo, ceiling) <= ramp_base(hi, ceiling));
    }

    #[test]
    fn ceilings_fall_in_phase_ranges(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        for phase in Phase::ALL {
            let range = phase.ceiling_range();
            let ceiling = phase.draw_ceiling(&mut rng);
            prop_assert!(range.contains(&ceiling));
        }
    }
}

#[tokio::test(start_paused = true)]
async fn eight_second_download_ends_on_its_ceiling() {
    let mut runner = PhaseRunner::new(Duration::from_millis(150), StdRng::seed_from_u64(99));
    let mut recorder = Recorder::default();

    let report = runner
        .run(
            PhasePlan { phase: Phase::Download, duration: Duration::from_secs(8), ceiling: 100.0 },
            &mut recorder,
        )
        .await;

    let last = recorder.samples.last().unwrap();
    assert_eq!(last.value, 100.0);
    assert_eq!(last.elapsed_secs, 8.0);
    assert_eq!(last.chart_second(), 8);
    assert!(recorder.samples.iter().any(|s| s.elapsed_secs >= 7.0 && s.elapsed_secs < 8.0));

    assert_eq!(recorder.completions.len(), 1);
    assert_eq!(report.final_value, 100.0);
    // 8000 / 150 = 53.3, so 53 interpolated ticks before the final value
    assert_eq!(report.ticks, 53);
    assert_eq!(recorder.samples.len(), 54);

    for sample in &recorder.samples[..recorder.samples.len() - 1] {
        assert!(sample.value <= 112.5 + 1e-9);
    }
}

#[tokio::test(start_paused = true)]
async fn default_timing_completes_in_order() {
    let config = Config { seed: Some(3), ..Config::default() };
    let mut test = SpeedTest::from_config(&config);
    let mut state = test.subscribe();

    let watcher = tokio::spawn(async move {
        let mut seen = vec![state.borrow().status];
        while state.changed().await.is_ok() {
            let status = state.borrow().status;
            if seen.last() != Some(&status) {
                seen.push(status);
            }
            if status == TestStatus::Complete {
                break;
            }
        }
        seen
    });

    let started = tokio::time::Instant::now();
    let outcome = test.run().await;
    // Each phase ends on the first tick at or past its duration
    let elapsed = started.elapsed();
    assert!(elapsed >= config.total_run_duration());
    assert!(elapsed < config.total_run_duration() + config.tick_interval() * 3);

    let seen = watcher.await.unwrap();
    assert_eq!(
        seen,
        vec![
            TestStatus::Idle,
            TestStatus::TestingDownload,
            TestStatus::TestingUpload,
            TestStatus::TestingPing,
            TestStatus::Complete,
        ]
    );
    assert!(Phase::Download.ceiling_range().contains(&outcome.download));
    assert!(Phase::Upload.ceiling_range().contains(&outcome.upload));
    assert!(Phase::Ping.ceiling_range().contains(&outcome.ping));
    assert_eq!(test.state().gauge_value(), outcome.download);
}
