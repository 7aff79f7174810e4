//! Live gauge driven by the sequencer's event stream

use super::formatter::OutputFormatter;
use crate::error::Result;
use crate::simulation::{SpeedTestEvent, SpeedTestState};
use crate::types::TestStatus;
use std::io::Write;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::{RecvError, TryRecvError}};
use tokio::sync::watch;

/// Erase the current terminal line
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Follows `SpeedTestEvent`s and writes progress to `out`.
///
/// With `redraw` set the gauge line is rewritten on every sample. Without
/// it only the per-phase results are printed, which keeps piped output
/// readable.
pub struct LiveDisplay<W> {
    formatter: Box<dyn OutputFormatter>,
    out: W,
    redraw: bool,
    phase_duration: Duration,
}

impl<W: Write + Send> LiveDisplay<W> {
    pub fn new(formatter: Box<dyn OutputFormatter>, out: W, redraw: bool) -> Self {
        Self {
            formatter,
            out,
            redraw,
            phase_duration: Duration::ZERO,
        }
    }

    /// Consume events until run `runs` is complete or the stream closes.
    ///
    /// Completion is read from the `state` snapshot, so a lagging receiver
    /// that lost a `TestCompleted` event still stops.
    pub async fn follow(
        mut self,
        mut events: broadcast::Receiver<SpeedTestEvent>,
        state: watch::Receiver<SpeedTestState>,
        runs: u32,
    ) -> Result<W> {
        let finished = session_finished(state, runs);
        tokio::pin!(finished);

        loop {
            tokio::select! {
                biased;
                received = events.recv() => match received {
                    Ok(event) => self.handle(&event, runs)?,
                    // Dropped samples only cost a few gauge frames
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                _ = &mut finished => {
                    loop {
                        match events.try_recv() {
                            Ok(event) => self.handle(&event, runs)?,
                            Err(TryRecvError::Lagged(_)) => continue,
                            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                        }
                    }
                    break;
                }
            }
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn handle(&mut self, event: &SpeedTestEvent, runs: u32) -> Result<()> {
        match event {
            SpeedTestEvent::RunReset { run } => {
                if runs > 1 {
                    writeln!(self.out, "\nRun {} of {}", run, runs)?;
                }
            }
            SpeedTestEvent::PhaseStarted { phase, duration } => {
                self.phase_duration = *duration;
                if self.redraw {
                    let line = self.formatter.format_gauge(phase.status(), 0.0, 0.0)?;
                    write!(self.out, "{}{}", CLEAR_LINE, line)?;
                    self.out.flush()?;
                }
            }
            SpeedTestEvent::Sample(sample) => {
                if self.redraw {
                    let progress = if self.phase_duration.is_zero() {
                        1.0
                    } else {
                        sample.elapsed_secs / self.phase_duration.as_secs_f64()
                    };
                    let line = self
                        .formatter
                        .format_gauge(sample.phase.status(), sample.value, progress)?;
                    write!(self.out, "{}{}", CLEAR_LINE, line)?;
                    self.out.flush()?;
                }
            }
            SpeedTestEvent::PhaseCompleted { phase, value } => {
                if self.redraw {
                    write!(self.out, "{}", CLEAR_LINE)?;
                }
                writeln!(self.out, "{}", self.formatter.format_phase_result(*phase, *value)?)?;
            }
            SpeedTestEvent::TestCompleted(_) => {}
        }
        Ok(())
    }
}

/// Resolves once run `runs` has completed, or when the state owner is gone
async fn session_finished(mut state: watch::Receiver<SpeedTestState>, runs: u32) {
    loop {
        {
            let current = state.borrow_and_update();
            if current.run >= runs && current.status == TestStatus::Complete {
                return;
            }
        }
        if state.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SamplePoint, TestOutcome};
    use crate::output::OutputFormatterFactory;
    use crate::types::Phase;

    fn completed_state(run: u32) -> watch::Receiver<SpeedTestState> {
        let (_tx, rx) = watch::channel(SpeedTestState {
            run,
            status: TestStatus::Complete,
            ..SpeedTestState::default()
        });
        rx
    }

    fn display(redraw: bool) -> LiveDisplay<Vec<u8>> {
        LiveDisplay::new(OutputFormatterFactory::create_formatter(false, false), Vec::new(), redraw)
    }

    fn send_phase(tx: &broadcast::Sender<SpeedTestEvent>, phase: Phase, value: f64) {
        tx.send(SpeedTestEvent::PhaseStarted { phase, duration: Duration::from_secs(1) }).unwrap();
        tx.send(SpeedTestEvent::Sample(SamplePoint::new(phase, Duration::from_millis(500), value / 2.0)))
            .unwrap();
        tx.send(SpeedTestEvent::Sample(SamplePoint::new(phase, Duration::from_secs(1), value)))
            .unwrap();
        tx.send(SpeedTestEvent::PhaseCompleted { phase, value }).unwrap();
    }

    fn send_run(tx: &broadcast::Sender<SpeedTestEvent>, run: u32) {
        tx.send(SpeedTestEvent::RunReset { run }).unwrap();
        send_phase(tx, Phase::Download, 200.0);
        send_phase(tx, Phase::Upload, 50.0);
        send_phase(tx, Phase::Ping, 12.0);
        tx.send(SpeedTestEvent::TestCompleted(TestOutcome::new(200.0, 50.0, 12.0))).unwrap();
    }

    #[tokio::test]
    async fn test_piped_output_lists_phase_results() {
        let (tx, rx) = broadcast::channel(64);
        send_run(&tx, 1);

        let out = display(false).follow(rx, completed_state(1), 1).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Download"));
        assert!(lines[0].contains("200.00 Mbps"));
        assert!(lines[1].starts_with("Upload"));
        assert!(lines[2].starts_with("Ping"));
        assert!(lines[2].ends_with("12 ms"));
        assert!(!text.contains('\r'));
    }

    #[tokio::test]
    async fn test_redraw_rewrites_gauge_line() {
        let (tx, rx) = broadcast::channel(64);
        send_run(&tx, 1);

        let out = display(true).follow(rx, completed_state(1), 1).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("{}Download (Mbps)", CLEAR_LINE)));
        assert!(text.contains(&format!("{}Ping (ms)", CLEAR_LINE)));
        // Half-way sample fills half the bar
        assert!(text.contains(&format!("[{}{}]", "=".repeat(15), " ".repeat(15))));
    }

    #[tokio::test]
    async fn test_multiple_runs_are_labelled() {
        let (tx, rx) = broadcast::channel(128);
        send_run(&tx, 1);
        send_run(&tx, 2);

        let out = display(false).follow(rx, completed_state(2), 2).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Run 1 of 2"));
        assert!(text.contains("Run 2 of 2"));
        assert_eq!(text.matches("Download").count(), 2);
    }

    #[tokio::test]
    async fn test_closed_stream_ends_follow() {
        let (tx, rx) = broadcast::channel(8);
        let (_state_tx, state_rx) = watch::channel(SpeedTestState::default());
        tx.send(SpeedTestEvent::RunReset { run: 1 }).unwrap();
        drop(tx);

        let out = display(false).follow(rx, state_rx, 1).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_lagging_receiver_stops_when_session_completes() {
        // Too small to hold a run, so the first TestCompleted is overwritten
        let (tx, rx) = broadcast::channel(4);
        send_run(&tx, 1);
        send_run(&tx, 2);

        let follow = display(false).follow(rx, completed_state(2), 2);
        let out = tokio::time::timeout(Duration::from_secs(5), follow)
            .await
            .expect("display kept waiting after the last run")
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Ping"));
        assert!(!text.contains("Run 1 of 2"));
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_waits_for_final_run() {
        let (tx, rx) = broadcast::channel(128);
        let (state_tx, state_rx) = watch::channel(SpeedTestState::default());
        let task = tokio::spawn(display(false).follow(rx, state_rx, 2));

        send_run(&tx, 1);
        state_tx.send_modify(|s| {
            s.run = 1;
            s.status = TestStatus::Complete;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!task.is_finished());

        send_run(&tx, 2);
        state_tx.send_modify(|s| s.run = 2);
        let text = String::from_utf8(task.await.unwrap().unwrap()).unwrap();
        assert!(text.contains("Run 2 of 2"));
        drop(tx);
    }
}
