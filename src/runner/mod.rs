//! Runner module - drives the simulator over a batch of runs.
//!
//! - RunLoop for executing a batch with one scoped session per run
//! - RunReport for the tallied outcome of a batch

mod run_loop;

pub use run_loop::{RunLoop, RunLoopConfig, RunReport};
