//! Outcome tally accumulated across runs.

use serde::{Deserialize, Serialize};

use super::outcome::Outcome;

/// Counters for the three classified outcomes.
///
/// Each run increments at most one of `match_count`, `zero_case_count` or
/// `mismatch_count`. Runs whose discriminant falls outside the known codes
/// only bump `unclassified`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    pub match_count: u64,
    pub zero_case_count: u64,
    pub mismatch_count: u64,
    pub unclassified: u64,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one run by its raw discriminant. Returns the classified outcome, if any.
    pub fn record(&mut self, discriminant: i64) -> Option<Outcome> {
        let outcome = Outcome::from_discriminant(discriminant);
        match outcome {
            Some(outcome) => self.record_outcome(outcome),
            None => self.unclassified += 1,
        }
        outcome
    }

    pub fn record_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Match => self.match_count += 1,
            Outcome::ZeroCase => self.zero_case_count += 1,
            Outcome::Mismatch => self.mismatch_count += 1,
        }
    }

    /// Count for a single outcome
    pub fn count(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Match => self.match_count,
            Outcome::ZeroCase => self.zero_case_count,
            Outcome::Mismatch => self.mismatch_count,
        }
    }

    /// Sum of the three classified counters
    pub fn classified(&self) -> u64 {
        self.match_count + self.zero_case_count + self.mismatch_count
    }

    /// Every recorded run, classified or not
    pub fn total(&self) -> u64 {
        self.classified() + self.unclassified
    }
}
