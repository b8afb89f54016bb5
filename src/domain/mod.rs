//! Domain types for Polytally
//!
//! - Outcome: classification of a run's discriminant code
//! - RunResult: the result tuple printed by one run of the operation
//! - Tally: counters accumulated over a batch of runs

pub mod outcome;
pub mod result;
pub mod tally;

pub use outcome::Outcome;
pub use result::{DEFAULT_DISCRIMINANT_INDEX, RunResult};
pub use tally::Tally;
