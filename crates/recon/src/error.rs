use std::fmt;

use crate::codes::VaccineGroupId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Forecaster group name with no registry counterpart.
    UnknownGroupName(String),
    /// Registry group id with no forecaster name (e.g. 8, "Other").
    UnknownGroupId(VaccineGroupId),
    /// A date that is not in 8-digit `YYYYMMDD` form.
    DateFormat(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGroupName(name) => write!(f, "unknown vaccine group name: '{name}'"),
            Self::UnknownGroupId(id) => write!(f, "unknown vaccine group id: {id}"),
            Self::DateFormat(value) => write!(f, "expected YYYYMMDD date, got '{value}'"),
        }
    }
}

impl std::error::Error for ReconError {}
