//! Domain Layer - Core types for the signal engine
//!
//! Pure value types with no I/O:
//! - `observation`: timestamped quotes and the single/pairs quote types
//! - `signal`: the discrete recommendation and its sub-state

pub mod observation;
pub mod signal;

pub use observation::{Mode, Observation, PairPrice, Quote, SinglePrice};
pub use signal::{Signal, SignalState, SignalType};
