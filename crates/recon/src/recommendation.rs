use std::collections::BTreeMap;

use crate::codes::{
    normalize_registry_group, recommendation_code, ReferenceTables, VaccineGroupId, INFLUENZA,
    PNEUMOCOCCAL, ZOSTER_GROUP_NAME,
};
use crate::date;
use crate::model::{Finding, ForecasterRecommendation, PatientId, RegistryRecommendation};

// ---------------------------------------------------------------------------
// Equivalence rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateMatch {
    Any,
    Empty,
    /// Forecaster due date equals the registry's next-scheduled date.
    EqualsRegistry,
    /// Registry and forecaster due dates are both strictly before today.
    BothElapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PastDueMatch {
    Any,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMatch {
    Equivalent,
    /// Accept only if the overdue dates agree (waived for [`OVERDUE_WAIVED_GROUPS`]).
    VerifyOverdue,
}

/// Influenza due dates move with the season; its overdue date is never compared.
pub const OVERDUE_WAIVED_GROUPS: &[VaccineGroupId] = &[INFLUENZA];

#[derive(Debug, Clone, Copy)]
pub struct RecommendationRule {
    pub label: &'static str,
    /// `None` applies to every group.
    pub group: Option<VaccineGroupId>,
    pub registry_code: i32,
    pub concept: &'static str,
    pub interpretations: &'static [&'static str],
    pub due: DueDateMatch,
    pub past_due: PastDueMatch,
    pub on_match: OnMatch,
}

impl RecommendationRule {
    pub fn applies(
        &self,
        group: VaccineGroupId,
        registry: &RegistryRecommendation,
        forecaster: &ForecasterRecommendation,
        today: &str,
    ) -> bool {
        if self.group.is_some_and(|g| g != group) || self.registry_code != registry.code {
            return false;
        }
        if forecaster.concept != self.concept
            || !self.interpretations.contains(&forecaster.interpretation.as_str())
        {
            return false;
        }
        let due_ok = match self.due {
            DueDateMatch::Any => true,
            DueDateMatch::Empty => forecaster.due_date.is_empty(),
            DueDateMatch::EqualsRegistry => forecaster.due_date == registry.due_date,
            DueDateMatch::BothElapsed => {
                date::is_before(&registry.due_date, today)
                    && date::is_before(&forecaster.due_date, today)
            }
        };
        let past_due_ok = match self.past_due {
            PastDueMatch::Any => true,
            PastDueMatch::Empty => forecaster.past_due_date.is_empty(),
        };
        due_ok && past_due_ok
    }
}

/// Evaluated in order; the first applicable rule decides.
pub const RECOMMENDATION_RULES: &[RecommendationRule] = &[
    RecommendationRule {
        label: "complete",
        group: None,
        registry_code: recommendation_code::COMPLETE,
        concept: "NOT_RECOMMENDED",
        interpretations: &["COMPLETE", "COMPLETE_HIGH_RISK"],
        due: DueDateMatch::Empty,
        past_due: PastDueMatch::Empty,
        on_match: OnMatch::Equivalent,
    },
    RecommendationRule {
        label: "due now",
        group: None,
        registry_code: recommendation_code::DUE,
        concept: "RECOMMENDED",
        interpretations: &["DUE_NOW"],
        due: DueDateMatch::EqualsRegistry,
        past_due: PastDueMatch::Any,
        on_match: OnMatch::VerifyOverdue,
    },
    RecommendationRule {
        label: "due now, both due dates elapsed",
        group: None,
        registry_code: recommendation_code::DUE,
        concept: "RECOMMENDED",
        interpretations: &["DUE_NOW"],
        due: DueDateMatch::BothElapsed,
        past_due: PastDueMatch::Any,
        on_match: OnMatch::VerifyOverdue,
    },
    RecommendationRule {
        label: "due in future",
        group: None,
        registry_code: recommendation_code::DUE,
        concept: "FUTURE_RECOMMENDED",
        interpretations: &["DUE_IN_FUTURE"],
        due: DueDateMatch::EqualsRegistry,
        past_due: PastDueMatch::Any,
        on_match: OnMatch::Equivalent,
    },
    RecommendationRule {
        label: "too old",
        group: None,
        registry_code: recommendation_code::TOO_OLD,
        concept: "NOT_RECOMMENDED",
        interpretations: &["TOO_OLD"],
        due: DueDateMatch::Empty,
        past_due: PastDueMatch::Empty,
        on_match: OnMatch::Equivalent,
    },
    RecommendationRule {
        label: "pneumococcal high risk schedule",
        group: Some(PNEUMOCOCCAL),
        registry_code: recommendation_code::COMPLETE,
        concept: "CONDITIONAL",
        interpretations: &["HIGH_RISK"],
        due: DueDateMatch::Empty,
        past_due: PastDueMatch::Empty,
        on_match: OnMatch::Equivalent,
    },
    RecommendationRule {
        label: "influenza due now, any date",
        group: Some(INFLUENZA),
        registry_code: recommendation_code::DUE,
        concept: "RECOMMENDED",
        interpretations: &["DUE_NOW"],
        due: DueDateMatch::Any,
        past_due: PastDueMatch::Any,
        on_match: OnMatch::Equivalent,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Equivalent(&'static str),
    OverdueMismatch(&'static str),
    Mismatch,
}

pub fn classify(
    group: VaccineGroupId,
    registry: &RegistryRecommendation,
    forecaster: &ForecasterRecommendation,
    today: &str,
) -> Outcome {
    let Some(rule) = RECOMMENDATION_RULES
        .iter()
        .find(|rule| rule.applies(group, registry, forecaster, today))
    else {
        return Outcome::Mismatch;
    };

    match rule.on_match {
        OnMatch::Equivalent => Outcome::Equivalent(rule.label),
        OnMatch::VerifyOverdue => {
            if OVERDUE_WAIVED_GROUPS.contains(&group)
                || forecaster.past_due_date == registry.overdue_date
            {
                Outcome::Equivalent(rule.label)
            } else {
                Outcome::OverdueMismatch(rule.label)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Index forecaster recommendations by group. Zoster, unknown and excluded
/// groups are dropped; on duplicate groups the last entry wins.
pub fn index_recommendations<'a>(
    tables: &ReferenceTables,
    recommendations: &'a [ForecasterRecommendation],
) -> BTreeMap<VaccineGroupId, &'a ForecasterRecommendation> {
    let mut index = BTreeMap::new();
    for recommendation in recommendations {
        if recommendation.group == ZOSTER_GROUP_NAME {
            continue;
        }
        if let Some(group) = tables.groups.comparable_group(&recommendation.group) {
            index.insert(group, recommendation);
        }
    }
    index
}

/// `today` is `YYYYMMDD`.
pub fn reconcile_recommendations(
    tables: &ReferenceTables,
    patient: PatientId,
    forecaster: &[ForecasterRecommendation],
    registry: &[RegistryRecommendation],
    today: &str,
) -> Vec<Finding> {
    let index = index_recommendations(tables, forecaster);
    let mut findings = Vec::new();

    for stored in registry {
        let Some(group) = normalize_registry_group(stored.group) else {
            continue;
        };
        let group_name = match tables.groups.name_for_group_id(group) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("patient {patient}: skipping registry recommendation: {e}");
                continue;
            }
        };

        let Some(recommendation) = index.get(&group) else {
            findings.push(Finding::RecommendationMissing {
                group: group_name,
                patient,
                group_id: group,
                index: index.iter().map(|(id, r)| (*id, r.tuple())).collect(),
            });
            continue;
        };

        // The forecaster tuple is judged against the aliased group.
        let registry = RegistryRecommendation {
            group,
            ..stored.clone()
        };
        match classify(group, &registry, recommendation, today) {
            Outcome::Equivalent(label) => {
                log::trace!("patient {patient}: group {group} equivalent ({label})");
            }
            Outcome::OverdueMismatch(_) => findings.push(Finding::RecommendationOverdueMismatch {
                group: group_name,
                patient,
                registry,
                forecaster: recommendation.tuple(),
            }),
            Outcome::Mismatch => findings.push(Finding::RecommendationMismatch {
                group: group_name,
                patient,
                registry,
                forecaster: recommendation.tuple(),
            }),
        }
    }

    findings
}
