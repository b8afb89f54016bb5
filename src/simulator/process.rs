//! Process-backed simulator.
//!
//! Each session is one invocation of the configured host command. The
//! command is expected to print the result tuple as its last line of output.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::process::{Child, Command};

use super::{Session, Simulator};
use crate::domain::RunResult;
use crate::error::{PolytallyError, Result};

/// Environment variable carrying the 1-based run number to the host command
pub const RUN_ENV_VAR: &str = "POLYTALLY_RUN";

/// Configuration for the host command
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Shell command that runs the operation once
    pub command: String,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// Working directory for the command
    pub working_dir: Option<PathBuf>,
    /// Per-run timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            env: Vec::new(),
            working_dir: None,
            timeout_ms: 300_000,
        }
    }
}

impl ProcessConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    /// Add an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the working directory
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the timeout in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }
}

/// Simulator that runs the host command once per session
pub struct ProcessSimulator {
    config: ProcessConfig,
}

impl ProcessSimulator {
    pub fn new(config: ProcessConfig) -> Result<Self> {
        if config.command.trim().is_empty() {
            return Err(PolytallyError::Config("simulator command is empty".to_string()));
        }
        Ok(Self { config })
    }

    /// Get the command
    pub fn command(&self) -> &str {
        &self.config.command
    }
}

#[async_trait]
impl Simulator for ProcessSimulator {
    type Session = ProcessSession;

    async fn acquire(&self, run: u64) -> Result<ProcessSession> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.config.command);
        cmd.env(RUN_ENV_VAR, run.to_string());

        for (key, value) in &self.config.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| PolytallyError::Simulator(format!("failed to start '{}': {}", self.config.command, e)))?;

        debug!("Acquired process session for run {} (pid {:?})", run, child.id());

        Ok(ProcessSession {
            run,
            child: Some(child),
            timeout: Duration::from_millis(self.config.timeout_ms),
        })
    }

    fn name(&self) -> &str {
        "process"
    }
}

/// A running host process. Dropping the session kills it if still alive.
#[derive(Debug)]
pub struct ProcessSession {
    run: u64,
    child: Option<Child>,
    timeout: Duration,
}

#[async_trait]
impl Session for ProcessSession {
    async fn find_polynomial(&mut self) -> Result<RunResult> {
        let child = self
            .child
            .take()
            .ok_or_else(|| PolytallyError::Operation(format!("session for run {} already used", self.run)))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(PolytallyError::Operation(format!(
                    "run {} timed out after {}ms",
                    self.run,
                    self.timeout.as_millis()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PolytallyError::Operation(format!(
                "run {} exited with code {:?}: {}",
                self.run,
                output.status.code(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| PolytallyError::Operation(format!("run {} produced no output", self.run)))?;

        RunResult::parse(line)
    }
}

impl Drop for ProcessSession {
    fn drop(&mut self) {
        if self.child.is_some() {
            warn!("Releasing unused process session for run {}", self.run);
        } else {
            debug!("Released process session for run {}", self.run);
        }
    }
}
