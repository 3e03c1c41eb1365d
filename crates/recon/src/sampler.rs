//! Cohort selection bounds. The random draw itself runs in the store.

use chrono::{Months, NaiveDate};

use crate::date;

/// Patients must be younger than this (19 years).
pub const MAX_AGE_MONTHS: u32 = 228;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSpec {
    /// Upper bound on the cohort size; fewer are returned if fewer qualify.
    pub count: usize,
    /// Eligible patients were born strictly after this `YYYYMMDD` date.
    pub born_after: String,
}

impl SampleSpec {
    pub fn new(count: usize, today: NaiveDate) -> Self {
        Self {
            count,
            born_after: birth_date_cutoff(today),
        }
    }
}

/// `today - 228 months`. Dates that fall off the end of a month clamp to
/// the last day (29 Feb -> 28 Feb).
pub fn birth_date_cutoff(today: NaiveDate) -> String {
    let cutoff = today
        .checked_sub_months(Months::new(MAX_AGE_MONTHS))
        .unwrap_or(NaiveDate::MIN);
    date::compact(cutoff)
}
