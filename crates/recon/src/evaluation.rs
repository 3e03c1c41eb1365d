use std::collections::HashMap;

use crate::codes::{evaluation_code, normalize_registry_group, ReferenceTables};
use crate::model::{EvaluationKey, Finding, ForecasterEvaluation, PatientId, RegistryEvaluation};

// ---------------------------------------------------------------------------
// Equivalence rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretationMatch {
    Empty,
    Exact(&'static str),
    Prefix(&'static str),
}

impl InterpretationMatch {
    fn matches(&self, interpretation: &str) -> bool {
        match self {
            Self::Empty => interpretation.is_empty(),
            Self::Exact(expected) => interpretation == *expected,
            Self::Prefix(prefix) => interpretation.starts_with(prefix),
        }
    }
}

/// A known-acceptable pairing of a registry code with a forecaster value.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationRule {
    pub label: &'static str,
    pub registry_code: i32,
    pub forecaster_code: &'static str,
    pub interpretation: InterpretationMatch,
}

impl EvaluationRule {
    pub fn accepts(&self, registry_code: i32, forecaster: &ForecasterEvaluation) -> bool {
        self.registry_code == registry_code
            && forecaster.code == self.forecaster_code
            && self.interpretation.matches(&forecaster.interpretation)
    }
}

/// Evaluated in order; the first accepting rule wins.
pub const EVALUATION_RULES: &[EvaluationRule] = &[
    EvaluationRule {
        label: "valid",
        registry_code: evaluation_code::VALID,
        forecaster_code: "VALID",
        interpretation: InterpretationMatch::Empty,
    },
    EvaluationRule {
        label: "not valid below minimum",
        registry_code: evaluation_code::NOT_VALID,
        forecaster_code: "INVALID",
        interpretation: InterpretationMatch::Prefix("BELOW"),
    },
    EvaluationRule {
        label: "invalid below minimum",
        registry_code: evaluation_code::INVALID,
        forecaster_code: "INVALID",
        interpretation: InterpretationMatch::Prefix("BELOW"),
    },
    EvaluationRule {
        label: "extra dose",
        registry_code: evaluation_code::EXTRA_DOSE,
        forecaster_code: "ACCEPTED",
        interpretation: InterpretationMatch::Exact("EXTRA_DOSE"),
    },
];

pub fn matching_rule(
    registry_code: i32,
    forecaster: &ForecasterEvaluation,
) -> Option<&'static EvaluationRule> {
    EVALUATION_RULES
        .iter()
        .find(|rule| rule.accepts(registry_code, forecaster))
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Index forecaster evaluations by (date, product, group). Entries whose
/// group is unknown or excluded are dropped; on duplicate keys the last
/// entry wins.
pub fn index_evaluations<'a>(
    tables: &ReferenceTables,
    evaluations: &'a [ForecasterEvaluation],
) -> HashMap<EvaluationKey, &'a ForecasterEvaluation> {
    let mut index = HashMap::with_capacity(evaluations.len());
    for evaluation in evaluations {
        let Some(group) = tables.groups.comparable_group(&evaluation.group) else {
            continue;
        };
        let key = EvaluationKey::new(&evaluation.date_of_admin, &evaluation.product, group);
        index.insert(key, evaluation);
    }
    index
}

/// Compare every registry evaluation against the forecaster's, in registry order.
pub fn reconcile_evaluations(
    tables: &ReferenceTables,
    patient: PatientId,
    forecaster: &[ForecasterEvaluation],
    registry: &[RegistryEvaluation],
) -> Vec<Finding> {
    let index = index_evaluations(tables, forecaster);
    let mut findings = Vec::new();

    for stored in registry {
        let Some(group) = normalize_registry_group(stored.group) else {
            continue;
        };
        let group_name = match tables.groups.name_for_group_id(group) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("patient {patient}: skipping registry evaluation: {e}");
                continue;
            }
        };
        let key = EvaluationKey::new(&stored.date_of_admin, &stored.product, group);

        match index.get(&key) {
            None => findings.push(Finding::EvaluationMissing {
                group: group_name,
                key,
                patient,
            }),
            Some(evaluation) => {
                if let Some(rule) = matching_rule(stored.code, evaluation) {
                    log::trace!("patient {patient}: {key} equivalent ({})", rule.label);
                    continue;
                }
                findings.push(Finding::EvaluationDifference {
                    group: group_name,
                    patient,
                    registry: tables.evaluation_codes.describe(stored.code),
                    forecaster: evaluation.value(),
                    key,
                });
            }
        }
    }

    findings
}
