//! Run loop implementation - drives the simulator for a batch of runs.
//!
//! Each iteration acquires a fresh session, invokes the operation once,
//! prints the result tuple and tallies its discriminant. The session is
//! dropped before the next iteration begins.

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_DISCRIMINANT_INDEX, Tally};
use crate::error::Result;
use crate::simulator::{Session, Simulator};

/// Configuration for the RunLoop.
#[derive(Debug, Clone)]
pub struct RunLoopConfig {
    /// Field position of the discriminant within each result tuple
    pub discriminant_index: usize,
}

impl Default for RunLoopConfig {
    fn default() -> Self {
        Self {
            discriminant_index: DEFAULT_DISCRIMINANT_INDEX,
        }
    }
}

/// Summary of a finished batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    /// Runs requested
    pub requested: u64,
    /// Runs that produced a result
    pub completed: u64,
    pub tally: Tally,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// RunLoop executes a batch of simulator runs and tallies the outcomes.
pub struct RunLoop<S>
where
    S: Simulator,
{
    /// Source of per-run sessions
    simulator: Arc<S>,
    /// Configuration
    config: RunLoopConfig,
}

impl<S> RunLoop<S>
where
    S: Simulator,
{
    /// Create a new RunLoop with default configuration.
    pub fn new(simulator: Arc<S>) -> Self {
        Self {
            simulator,
            config: RunLoopConfig::default(),
        }
    }

    /// Create a new RunLoop with custom configuration.
    pub fn with_config(simulator: Arc<S>, config: RunLoopConfig) -> Self {
        Self { simulator, config }
    }

    /// Run the operation `runs` times, writing each result tuple to `out`.
    ///
    /// Any acquisition, operation or parse failure aborts the batch.
    pub async fn run<W: Write>(&self, runs: u64, out: &mut W) -> Result<RunReport> {
        let started_at = Utc::now();
        let mut tally = Tally::new();

        info!("Starting {} runs with {} simulator", runs, self.simulator.name());

        for run in 1..=runs {
            let mut session = self.simulator.acquire(run).await?;
            let result = session.find_polynomial().await?;
            drop(session);

            writeln!(out, "{}", result)?;

            let code = result.discriminant(self.config.discriminant_index)?;
            match tally.record(code) {
                Some(outcome) => debug!("Run {}/{}: {}", run, runs, outcome),
                None => warn!("Run {}/{}: discriminant {} is not a known outcome, not tallied", run, runs, code),
            }
        }

        out.flush()?;

        info!(
            "Finished {} runs: match={} zero={} mismatch={} unclassified={}",
            runs, tally.match_count, tally.zero_case_count, tally.mismatch_count, tally.unclassified
        );

        Ok(RunReport {
            requested: runs,
            completed: tally.total(),
            tally,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RunResult;
    use crate::error::PolytallyError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tuple_with(discriminant: i64) -> RunResult {
        let mut fields: Vec<String> = (0..13).map(|i| format!("c{}", i)).collect();
        fields.push(discriminant.to_string());
        RunResult::new(fields)
    }

    /// Mock simulator that returns scripted discriminants and tracks live sessions.
    struct ScriptedSimulator {
        codes: Vec<i64>,
        acquired: AtomicUsize,
        live: Arc<AtomicUsize>,
        max_live: Arc<AtomicUsize>,
    }

    impl ScriptedSimulator {
        fn new(codes: Vec<i64>) -> Self {
            Self {
                codes,
                acquired: AtomicUsize::new(0),
                live: Arc::new(AtomicUsize::new(0)),
                max_live: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn constant(code: i64, runs: usize) -> Self {
            Self::new(vec![code; runs])
        }
    }

    struct ScriptedSession {
        code: i64,
        live: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Simulator for ScriptedSimulator {
        type Session = ScriptedSession;

        async fn acquire(&self, run: u64) -> Result<ScriptedSession> {
            let index = self.acquired.fetch_add(1, Ordering::SeqCst);
            let code = *self
                .codes
                .get(index)
                .ok_or_else(|| PolytallyError::Simulator(format!("no script for run {}", run)))?;
            let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_live.fetch_max(live, Ordering::SeqCst);
            Ok(ScriptedSession {
                code,
                live: self.live.clone(),
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[async_trait]
    impl Session for ScriptedSession {
        async fn find_polynomial(&mut self) -> Result<RunResult> {
            Ok(tuple_with(self.code))
        }
    }

    impl Drop for ScriptedSession {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Simulator whose sessions always fail.
    struct FailingSimulator;

    struct FailingSession;

    #[async_trait]
    impl Simulator for FailingSimulator {
        type Session = FailingSession;

        async fn acquire(&self, _run: u64) -> Result<FailingSession> {
            Ok(FailingSession)
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[async_trait]
    impl Session for FailingSession {
        async fn find_polynomial(&mut self) -> Result<RunResult> {
            Err(PolytallyError::Operation("simulator crashed".to_string()))
        }
    }

    #[test]
    fn test_run_loop_config_default() {
        let config = RunLoopConfig::default();
        assert_eq!(config.discriminant_index, 13);
    }

    #[tokio::test]
    async fn test_zero_runs_never_acquires() {
        let sim = Arc::new(ScriptedSimulator::new(vec![]));
        let runner = RunLoop::new(sim.clone());
        let mut out: Vec<u8> = Vec::new();

        let report = runner.run(0, &mut out).await.unwrap();

        assert_eq!(report.tally, Tally::new());
        assert_eq!(report.completed, 0);
        assert_eq!(sim.acquired.load(Ordering::SeqCst), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_all_matches() {
        let runner = RunLoop::new(Arc::new(ScriptedSimulator::constant(1, 5)));
        let report = runner.run(5, &mut Vec::<u8>::new()).await.unwrap();
        assert_eq!(report.tally.match_count, 5);
        assert_eq!(report.tally.zero_case_count, 0);
        assert_eq!(report.tally.mismatch_count, 0);
    }

    #[tokio::test]
    async fn test_all_zero_cases() {
        let runner = RunLoop::new(Arc::new(ScriptedSimulator::constant(0, 4)));
        let report = runner.run(4, &mut Vec::<u8>::new()).await.unwrap();
        assert_eq!(report.tally.zero_case_count, 4);
        assert_eq!(report.tally.match_count, 0);
        assert_eq!(report.tally.mismatch_count, 0);
    }

    #[tokio::test]
    async fn test_all_mismatches() {
        let runner = RunLoop::new(Arc::new(ScriptedSimulator::constant(2, 3)));
        let report = runner.run(3, &mut Vec::<u8>::new()).await.unwrap();
        assert_eq!(report.tally.mismatch_count, 3);
        assert_eq!(report.tally.match_count, 0);
        assert_eq!(report.tally.zero_case_count, 0);
    }

    #[tokio::test]
    async fn test_mixed_sequence() {
        let runner = RunLoop::new(Arc::new(ScriptedSimulator::new(vec![1, 0, 2, 1])));
        let report = runner.run(4, &mut Vec::<u8>::new()).await.unwrap();
        assert_eq!(report.tally.match_count, 2);
        assert_eq!(report.tally.zero_case_count, 1);
        assert_eq!(report.tally.mismatch_count, 1);
        assert_eq!(report.tally.classified(), 4);
    }

    #[tokio::test]
    async fn test_out_of_range_discriminant_dropped() {
        let runner = RunLoop::new(Arc::new(ScriptedSimulator::new(vec![1, 7, -1, 2])));
        let report = runner.run(4, &mut Vec::<u8>::new()).await.unwrap();
        assert_eq!(report.tally.classified(), 2);
        assert!(report.tally.classified() <= report.requested);
        assert_eq!(report.tally.unclassified, 2);
        assert_eq!(report.completed, 4);
    }

    #[tokio::test]
    async fn test_sessions_never_overlap() {
        let sim = Arc::new(ScriptedSimulator::constant(1, 6));
        let runner = RunLoop::new(sim.clone());
        runner.run(6, &mut Vec::<u8>::new()).await.unwrap();

        assert_eq!(sim.acquired.load(Ordering::SeqCst), 6);
        assert_eq!(sim.max_live.load(Ordering::SeqCst), 1);
        assert_eq!(sim.live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_prints_each_result_tuple() {
        let runner = RunLoop::new(Arc::new(ScriptedSimulator::new(vec![1, 0])));
        let mut out: Vec<u8> = Vec::new();
        runner.run(2, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("(c0, c1"));
        assert!(lines[0].ends_with(", 1)"));
        assert!(lines[1].ends_with(", 0)"));
    }

    #[tokio::test]
    async fn test_custom_discriminant_index() {
        let config = RunLoopConfig { discriminant_index: 0 };
        let runner = RunLoop::with_config(Arc::new(ScriptedSimulator::constant(2, 1)), config);
        // Field 0 is "c0", which is not an integer
        let err = runner.run(1, &mut Vec::<u8>::new()).await.unwrap_err();
        assert!(matches!(err, PolytallyError::MalformedResult(_)));
    }

    #[tokio::test]
    async fn test_acquire_failure_is_fatal() {
        let runner = RunLoop::new(Arc::new(ScriptedSimulator::new(vec![1])));
        let err = runner.run(2, &mut Vec::<u8>::new()).await.unwrap_err();
        assert!(matches!(err, PolytallyError::Simulator(_)));
    }

    #[tokio::test]
    async fn test_operation_failure_is_fatal() {
        let runner = RunLoop::new(Arc::new(FailingSimulator));
        let err = runner.run(1, &mut Vec::<u8>::new()).await.unwrap_err();
        assert!(err.to_string().contains("simulator crashed"));
    }

    #[tokio::test]
    async fn test_report_timestamps_ordered() {
        let runner = RunLoop::new(Arc::new(ScriptedSimulator::constant(1, 2)));
        let report = runner.run(2, &mut Vec::<u8>::new()).await.unwrap();
        assert!(report.started_at <= report.finished_at);
        assert_eq!(report.requested, 2);
    }
}
