//! Console interaction: run-count prompt, tally report, exit pause.

use std::io::{BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::warn;

use crate::domain::Tally;
use crate::error::{PolytallyError, Result};
use crate::runner::{RunLoop, RunReport};
use crate::simulator::Simulator;

pub const RUN_COUNT_PROMPT: &str = "Enter the number of time(s) to run the simulator.";
pub const EXIT_PROMPT: &str = "Press any key to shut the screen.";

/// Parse a run count. Surrounding whitespace is ignored.
///
/// Any integer is accepted; a negative count means zero runs.
pub fn parse_run_count(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PolytallyError::InvalidRunCount("no input given".to_string()));
    }

    let count = trimmed
        .parse::<i64>()
        .map_err(|_| PolytallyError::InvalidRunCount(format!("'{}' is not an integer", trimmed)))?;

    if count < 0 {
        warn!("Run count {} is negative, running zero times", count);
        return Ok(0);
    }
    Ok(count as u64)
}

/// Print the prompt and read one line holding the run count.
pub fn prompt_run_count<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<u64> {
    writeln!(out, "{}", RUN_COUNT_PROMPT)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(PolytallyError::InvalidRunCount("input closed before a count was entered".to_string()));
    }
    parse_run_count(&line)
}

/// Write the three tallies, one per line: match, zero-case, mismatch.
pub fn write_tallies<W: Write>(out: &mut W, tally: &Tally) -> Result<()> {
    writeln!(out, "{}", tally.match_count)?;
    writeln!(out, "{}", tally.zero_case_count)?;
    writeln!(out, "{}", tally.mismatch_count)?;
    Ok(())
}

/// Write the full report as pretty JSON.
pub fn write_report_json<W: Write>(out: &mut W, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

/// How the batch summary is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Result tuples then the three tallies, all on stdout
    Plain,
    /// Only the JSON report on stdout; result tuples go to `diag`
    Json,
}

/// Run a batch and write its summary.
///
/// In `Json` mode `out` receives nothing but the report, so it stays parseable.
pub async fn run_and_report<S, W, E>(
    runner: &RunLoop<S>,
    runs: u64,
    format: OutputFormat,
    out: &mut W,
    diag: &mut E,
) -> Result<RunReport>
where
    S: Simulator,
    W: Write,
    E: Write,
{
    let report = match format {
        OutputFormat::Plain => {
            let report = runner.run(runs, out).await?;
            write_tallies(out, &report.tally)?;
            report
        }
        OutputFormat::Json => {
            let report = runner.run(runs, diag).await?;
            write_report_json(out, &report)?;
            report
        }
    };
    out.flush()?;
    Ok(report)
}

/// Print the exit prompt and block until a key is pressed.
///
/// Returns immediately after the prompt when stdin is not a terminal.
pub fn wait_for_key<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{}", EXIT_PROMPT)?;
    out.flush()?;

    if !std::io::stdin().is_terminal() {
        return Ok(());
    }

    enable_raw_mode()?;
    let result = read_key_press();
    disable_raw_mode()?;
    result
}

fn read_key_press() -> Result<()> {
    loop {
        if let Event::Key(key) = event::read()? {
            // Only handle key press events, not release
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}
