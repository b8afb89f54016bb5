//! Run outcome classification.
//!
//! The external operation reports a discriminant code alongside the
//! recovered coefficients. Only three codes are meaningful.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified outcome of a single simulator run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// a(x) was the zero polynomial (discriminant 0)
    ZeroCase,
    /// Recovered coefficients match s(x) (discriminant 1)
    Match,
    /// Recovered coefficients differ from s(x) (discriminant 2)
    Mismatch,
}

impl Outcome {
    /// Classify a discriminant code. Codes outside {0, 1, 2} yield `None`.
    pub fn from_discriminant(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::ZeroCase),
            1 => Some(Self::Match),
            2 => Some(Self::Mismatch),
            _ => None,
        }
    }

    /// The discriminant code this outcome is reported as
    pub fn discriminant(&self) -> i64 {
        match self {
            Self::ZeroCase => 0,
            Self::Match => 1,
            Self::Mismatch => 2,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCase => write!(f, "zero-case"),
            Self::Match => write!(f, "match"),
            Self::Mismatch => write!(f, "mismatch"),
        }
    }
}
