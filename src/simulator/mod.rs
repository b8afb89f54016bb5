//! Simulator module - the injected capability the run loop drives.
//!
//! A `Simulator` hands out one `Session` per run. The session is the scoped
//! simulation resource: it is released when dropped, and the run loop drops
//! it before acquiring the next one.
//!
//! Backends:
//! - ProcessSimulator: spawns the external host command for every run
//! - ReplaySimulator: hands out result lines recorded in a file

mod process;
mod replay;

pub use process::{ProcessConfig, ProcessSession, ProcessSimulator};
pub use replay::{ReplaySession, ReplaySimulator};

use async_trait::async_trait;

use crate::domain::RunResult;
use crate::error::Result;

/// Source of simulation sessions.
#[async_trait]
pub trait Simulator: Send + Sync {
    /// Session type handed out per run
    type Session: Session;

    /// Acquire a fresh session for the given 1-based run number.
    async fn acquire(&self, run: u64) -> Result<Self::Session>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// One acquired simulation context.
#[async_trait]
pub trait Session: Send {
    /// Invoke the polynomial search operation and return its result tuple.
    async fn find_polynomial(&mut self) -> Result<RunResult>;
}
