//! Registry dates are 8-digit `YYYYMMDD` strings. Their lexicographic order
//! is their chronological order, and the comparisons below rely on it.

use chrono::NaiveDate;

use crate::error::ReconError;

pub const COMPACT_FORMAT: &str = "%Y%m%d";

pub fn compact(date: NaiveDate) -> String {
    date.format(COMPACT_FORMAT).to_string()
}

pub fn parse_compact(value: &str) -> Result<NaiveDate, ReconError> {
    if !is_compact(value) {
        return Err(ReconError::DateFormat(value.to_string()));
    }
    NaiveDate::parse_from_str(value, COMPACT_FORMAT)
        .map_err(|_| ReconError::DateFormat(value.to_string()))
}

pub fn is_compact(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Strictly before `today`. An empty or malformed date is never "before".
pub fn is_before(date: &str, today: &str) -> bool {
    is_compact(date) && date < today
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_round_trip() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(compact(d), "20200101");
        assert_eq!(parse_compact("20200101").unwrap(), d);
    }

    #[test]
    fn rejects_dashed_dates() {
        assert!(parse_compact("2020-01-01").is_err());
        assert!(parse_compact("20201301").is_err());
    }

    #[test]
    fn empty_date_is_never_before_today() {
        assert!(!is_before("", "20261017"));
        assert!(is_before("20261016", "20261017"));
        assert!(!is_before("20261017", "20261017"));
    }
}
