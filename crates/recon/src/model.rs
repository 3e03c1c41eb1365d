use std::fmt;

use serde::Serialize;

use crate::codes::VaccineGroupId;

// ---------------------------------------------------------------------------
// Patients and doses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PatientId(pub i64);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// Registry sex column: `M` is male, anything else (including NULL) is female.
    pub fn from_registry(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("M") => Self::Male,
            _ => Self::Female,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: PatientId,
    pub sex: Sex,
    /// `YYYYMMDD`
    pub dob: String,
}

/// One administered dose, as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseRecord {
    pub date_of_admin: String,
    /// Forecaster vaccine code (CVX).
    pub product: String,
}

// ---------------------------------------------------------------------------
// Forecaster side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecasterEvaluation {
    pub product: String,
    pub date_of_admin: String,
    pub group: String,
    pub code: String,
    pub interpretation: String,
}

impl ForecasterEvaluation {
    /// `CODE^INTERP`, the form used in diagnostic output.
    pub fn value(&self) -> String {
        format!("{}^{}", self.code, self.interpretation)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecasterRecommendation {
    pub group: String,
    pub concept: String,
    pub interpretation: String,
    pub due_date: String,
    pub past_due_date: String,
}

impl ForecasterRecommendation {
    /// `CONCEPT^INTERP^DUE^PASTDUE`, the form used in diagnostic output.
    pub fn tuple(&self) -> String {
        format!(
            "{}^{}^{}^{}",
            self.concept, self.interpretation, self.due_date, self.past_due_date
        )
    }
}

/// Everything the forecaster returned for one patient.
#[derive(Debug, Clone, Default)]
pub struct ForecastResult {
    pub evaluations: Vec<ForecasterEvaluation>,
    pub recommendations: Vec<ForecasterRecommendation>,
}

// ---------------------------------------------------------------------------
// Registry side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEvaluation {
    pub product: String,
    pub date_of_admin: String,
    pub group: VaccineGroupId,
    pub code: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRecommendation {
    pub group: VaccineGroupId,
    pub code: i32,
    /// Next-scheduled due date; empty when the registry has none.
    pub due_date: String,
    /// Empty when the registry has none.
    pub overdue_date: String,
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Composite evaluation key. Rendered as `date|product|group` in output only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvaluationKey {
    pub date_of_admin: String,
    pub product: String,
    pub group: VaccineGroupId,
}

impl EvaluationKey {
    pub fn new(date_of_admin: &str, product: &str, group: VaccineGroupId) -> Self {
        Self {
            date_of_admin: date_of_admin.to_string(),
            product: product.to_string(),
            group,
        }
    }
}

impl fmt::Display for EvaluationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.date_of_admin, self.product, self.group)
    }
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    EvaluationDifference,
    EvaluationMissing,
    RecommendationMismatch,
    RecommendationOverdueMismatch,
    RecommendationMissing,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EvaluationDifference => write!(f, "evaluation_difference"),
            Self::EvaluationMissing => write!(f, "evaluation_missing"),
            Self::RecommendationMismatch => write!(f, "recommendation_mismatch"),
            Self::RecommendationOverdueMismatch => write!(f, "recommendation_overdue_mismatch"),
            Self::RecommendationMissing => write!(f, "recommendation_missing"),
        }
    }
}

/// One diagnostic discrepancy. `Display` renders the output line(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    EvaluationDifference {
        group: &'static str,
        key: EvaluationKey,
        patient: PatientId,
        registry: String,
        forecaster: String,
    },
    EvaluationMissing {
        group: &'static str,
        key: EvaluationKey,
        patient: PatientId,
    },
    RecommendationMismatch {
        group: &'static str,
        patient: PatientId,
        registry: RegistryRecommendation,
        forecaster: String,
    },
    RecommendationOverdueMismatch {
        group: &'static str,
        patient: PatientId,
        registry: RegistryRecommendation,
        forecaster: String,
    },
    RecommendationMissing {
        group: &'static str,
        patient: PatientId,
        group_id: VaccineGroupId,
        /// The whole forecaster recommendation index, in group-id order.
        index: Vec<(VaccineGroupId, String)>,
    },
}

impl Finding {
    pub fn kind(&self) -> FindingKind {
        match self {
            Self::EvaluationDifference { .. } => FindingKind::EvaluationDifference,
            Self::EvaluationMissing { .. } => FindingKind::EvaluationMissing,
            Self::RecommendationMismatch { .. } => FindingKind::RecommendationMismatch,
            Self::RecommendationOverdueMismatch { .. } => {
                FindingKind::RecommendationOverdueMismatch
            }
            Self::RecommendationMissing { .. } => FindingKind::RecommendationMissing,
        }
    }

    pub fn patient(&self) -> PatientId {
        match self {
            Self::EvaluationDifference { patient, .. }
            | Self::EvaluationMissing { patient, .. }
            | Self::RecommendationMismatch { patient, .. }
            | Self::RecommendationOverdueMismatch { patient, .. }
            | Self::RecommendationMissing { patient, .. } => *patient,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EvaluationDifference { group, key, patient, registry, forecaster } => write!(
                f,
                "evaluation difference: {group} _{key}_ _{patient}_ : {registry} = {forecaster}"
            ),
            Self::EvaluationMissing { group, key, patient } => {
                write!(f, "evaluation missing: {group} _{patient}_: {key}")
            }
            Self::RecommendationMismatch { group, patient, registry, forecaster } => write!(
                f,
                "recommendation mismatch: {group} _{patient}_ : {} {} {} = {forecaster}",
                registry.code, registry.due_date, registry.overdue_date
            ),
            Self::RecommendationOverdueMismatch { group, patient, registry, forecaster } => write!(
                f,
                "recommendation overdue date mismatch: {group} _{patient}_ : {} {} {} = {forecaster}",
                registry.code, registry.due_date, registry.overdue_date
            ),
            Self::RecommendationMissing { group, patient, group_id, index } => {
                writeln!(f, "recommendation missing: {group} _{patient}_ {group_id}")?;
                write!(f, "{{")?;
                for (i, (id, tuple)) in index.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{id}: {tuple}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_normalization() {
        assert_eq!(Sex::from_registry(Some("M")), Sex::Male);
        assert_eq!(Sex::from_registry(Some("F")), Sex::Female);
        assert_eq!(Sex::from_registry(Some("U")), Sex::Female);
        assert_eq!(Sex::from_registry(None), Sex::Female);
    }

    #[test]
    fn evaluation_key_renders_with_pipes() {
        let key = EvaluationKey::new("20200101", "03", VaccineGroupId(5));
        assert_eq!(key.to_string(), "20200101|03|5");
    }

    #[test]
    fn tuple_keys_do_not_collide_on_delimiter() {
        let a = EvaluationKey::new("2020|01", "03", VaccineGroupId(5));
        let b = EvaluationKey::new("2020", "01|03", VaccineGroupId(5));
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn missing_recommendation_dumps_index_on_second_line() {
        let finding = Finding::RecommendationMissing {
            group: "Polio Vaccine Group",
            patient: PatientId(7),
            group_id: VaccineGroupId(4),
            index: vec![
                (VaccineGroupId(1), "NOT_RECOMMENDED^COMPLETE^^".into()),
                (VaccineGroupId(5), "RECOMMENDED^DUE_NOW^20200101^20200201".into()),
            ],
        };
        let text = finding.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "recommendation missing: Polio Vaccine Group _7_ 4");
        assert_eq!(
            lines[1],
            "{1: NOT_RECOMMENDED^COMPLETE^^, 5: RECOMMENDED^DUE_NOW^20200101^20200201}"
        );
    }
}
