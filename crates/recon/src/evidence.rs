use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::model::{Finding, FindingKind};

/// Run-level counters. Findings themselves are only ever printed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconSummary {
    pub patients_sampled: usize,
    pub patients_compared: usize,
    pub patients_without_doses: usize,
    pub patients_failed: usize,
    pub evaluation_differences: usize,
    pub evaluations_missing: usize,
    pub recommendation_mismatches: usize,
    pub overdue_mismatches: usize,
    pub recommendations_missing: usize,
}

impl ReconSummary {
    pub fn record(&mut self, finding: &Finding) {
        match finding.kind() {
            FindingKind::EvaluationDifference => self.evaluation_differences += 1,
            FindingKind::EvaluationMissing => self.evaluations_missing += 1,
            FindingKind::RecommendationMismatch => self.recommendation_mismatches += 1,
            FindingKind::RecommendationOverdueMismatch => self.overdue_mismatches += 1,
            FindingKind::RecommendationMissing => self.recommendations_missing += 1,
        }
    }

    pub fn total_findings(&self) -> usize {
        self.evaluation_differences
            + self.evaluations_missing
            + self.recommendation_mismatches
            + self.overdue_mismatches
            + self.recommendations_missing
    }
}

impl fmt::Display for ReconSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sampled, {} compared, {} without doses, {} failed; {} finding(s): \
             {} evaluation difference(s), {} evaluation(s) missing, \
             {} recommendation mismatch(es), {} overdue mismatch(es), \
             {} recommendation(s) missing",
            self.patients_sampled,
            self.patients_compared,
            self.patients_without_doses,
            self.patients_failed,
            self.total_findings(),
            self.evaluation_differences,
            self.evaluations_missing,
            self.recommendation_mismatches,
            self.overdue_mismatches,
            self.recommendations_missing,
        )
    }
}

/// Count findings per kind.
pub fn count_by_kind(findings: &[Finding]) -> HashMap<FindingKind, usize> {
    let mut counts = HashMap::new();
    for finding in findings {
        *counts.entry(finding.kind()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::VaccineGroupId;
    use crate::model::{EvaluationKey, PatientId};

    fn missing_eval() -> Finding {
        Finding::EvaluationMissing {
            group: "MMR Vaccine Group",
            key: EvaluationKey::new("20200101", "03", VaccineGroupId(5)),
            patient: PatientId(1),
        }
    }

    fn missing_rec() -> Finding {
        Finding::RecommendationMissing {
            group: "Polio Vaccine Group",
            patient: PatientId(1),
            group_id: VaccineGroupId(4),
            index: vec![],
        }
    }

    #[test]
    fn summary_counts() {
        let mut summary = ReconSummary::default();
        for f in [missing_eval(), missing_eval(), missing_rec()] {
            summary.record(&f);
        }
        assert_eq!(summary.evaluations_missing, 2);
        assert_eq!(summary.recommendations_missing, 1);
        assert_eq!(summary.total_findings(), 3);
    }

    #[test]
    fn counts_by_kind() {
        let counts = count_by_kind(&[missing_eval(), missing_rec(), missing_rec()]);
        assert_eq!(counts[&FindingKind::EvaluationMissing], 1);
        assert_eq!(counts[&FindingKind::RecommendationMissing], 2);
    }

    #[test]
    fn summary_line_is_single_line() {
        let mut summary = ReconSummary {
            patients_sampled: 3,
            patients_compared: 2,
            patients_without_doses: 1,
            ..Default::default()
        };
        summary.record(&missing_rec());
        let line = summary.to_string();
        assert!(!line.contains('\n'));
        assert!(line.starts_with("3 sampled, 2 compared, 1 without doses, 0 failed; 1 finding(s)"));
        assert!(line.ends_with("1 recommendation(s) missing"));
    }
}
