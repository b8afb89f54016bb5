//! Replay simulator.
//!
//! Hands out result lines captured from earlier runs, one per session, so a
//! recorded batch can be re-tallied without the host toolchain.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use log::{debug, info};

use super::{Session, Simulator};
use crate::domain::RunResult;
use crate::error::{PolytallyError, Result};

/// Simulator backed by a file of recorded result lines
pub struct ReplaySimulator {
    source: Option<PathBuf>,
    lines: Vec<String>,
    cursor: AtomicUsize,
}

impl ReplaySimulator {
    /// Load recorded results from `path`. Blank lines and `#` comments are skipped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| PolytallyError::Simulator(format!("failed to read {}: {}", path.display(), e)))?;

        let mut sim = Self::from_lines(content.lines());
        sim.source = Some(path.to_path_buf());
        info!("Loaded {} recorded results from {}", sim.lines.len(), path.display());
        Ok(sim)
    }

    /// Build from in-memory lines, with the same filtering as `open`.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();

        Self {
            source: None,
            lines,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of recorded results still available
    pub fn remaining(&self) -> usize {
        self.lines.len().saturating_sub(self.cursor.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl Simulator for ReplaySimulator {
    type Session = ReplaySession;

    async fn acquire(&self, run: u64) -> Result<ReplaySession> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let line = self.lines.get(index).cloned().ok_or_else(|| {
            let source = self
                .source
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "replay".to_string());
            PolytallyError::Simulator(format!(
                "{} has only {} recorded results, run {} requested",
                source,
                self.lines.len(),
                run
            ))
        })?;

        debug!("Acquired replay session for run {}", run);
        Ok(ReplaySession { run, line })
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// One recorded result waiting to be read
#[derive(Debug)]
pub struct ReplaySession {
    run: u64,
    line: String,
}

#[async_trait]
impl Session for ReplaySession {
    async fn find_polynomial(&mut self) -> Result<RunResult> {
        RunResult::parse(&self.line)
    }
}

impl Drop for ReplaySession {
    fn drop(&mut self) {
        debug!("Released replay session for run {}", self.run);
    }
}
