//! Simulated speed test engine
//!
//! - `phase`: the timer-driven runner for a single phase
//! - `state`: the single-writer state container and its event stream
//! - `sequencer`: the state machine chaining download, upload and ping

pub mod phase;
pub mod sequencer;
pub mod state;

pub use phase::{interpolate, ramp_base, PhaseObserver, PhasePlan, PhaseReport, PhaseRunner};
pub use sequencer::{SequenceTiming, SpeedTest};
pub use state::{SpeedTestEvent, SpeedTestState, StateStore, StoreObserver};
