//! Polytally - repeated simulator runs with outcome tallies
//!
//! Drives an external polynomial-search operation a requested number of
//! times, one scoped simulator session per run, and counts how often the
//! recovered coefficients match, hit the zero-polynomial case, or mismatch.

pub mod console;
pub mod domain;
pub mod error;
pub mod runner;
pub mod simulator;

pub use error::{PolytallyError, Result};
