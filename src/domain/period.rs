//! Fiscal period keys (`2016Q1`, `2020Q4`, ...).
//!
//! Period keys are stored as plain strings on each `Record`; the growth matcher
//! parses them into `(year, label)` so the prior-year key is rebuilt rather than
//! produced by slicing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A parsed period key: a four-digit year followed by a sub-year label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: u16,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// The key does not start with four ASCII digits.
    MissingYear(String),
}

impl fmt::Display for PeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodError::MissingYear(key) => {
                write!(f, "Period key '{key}' does not start with a 4-digit year")
            }
        }
    }
}

impl std::error::Error for PeriodError {}

impl Period {
    pub fn parse(key: &str) -> Result<Self, PeriodError> {
        let key = key.trim();
        let (year, label) = match (key.get(..4), key.get(4..)) {
            (Some(year), Some(label)) if year.bytes().all(|b| b.is_ascii_digit()) => (year, label),
            _ => return Err(PeriodError::MissingYear(key.to_string())),
        };
        let year = year
            .parse::<u16>()
            .map_err(|_| PeriodError::MissingYear(key.to_string()))?;
        Ok(Self {
            year,
            label: label.to_string(),
        })
    }

    /// Same sub-period one year earlier; `None` for year 0000.
    pub fn previous_year(&self) -> Option<Self> {
        Some(Self {
            year: self.year.checked_sub(1)?,
            label: self.label.clone(),
        })
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{}", self.year, self.label)
    }
}
