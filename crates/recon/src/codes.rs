use std::collections::HashMap;

use serde::Serialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Vaccine groups
// ---------------------------------------------------------------------------

/// Registry vaccine group identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VaccineGroupId(pub u8);

impl std::fmt::Display for VaccineGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const DTP: VaccineGroupId = VaccineGroupId(2);
pub const OTHER: VaccineGroupId = VaccineGroupId(8);
pub const PNEUMOCOCCAL: VaccineGroupId = VaccineGroupId(9);
pub const INFLUENZA: VaccineGroupId = VaccineGroupId(11);
/// Registry-side alias of DTP.
pub const DTP_ALIAS: VaccineGroupId = VaccineGroupId(13);
pub const H1N1: VaccineGroupId = VaccineGroupId(16);

/// Forecaster group that is never compared.
pub const ZOSTER_GROUP_NAME: &str = "Zoster Vaccine Group";

/// Groups never reconciled on either side.
pub const EXCLUDED_GROUPS: [VaccineGroupId; 2] = [OTHER, H1N1];

const VACCINE_GROUPS: &[(&str, u8)] = &[
    ("Hep B Vaccine Group", 1),
    ("DTP Vaccine Group", 2),
    ("Hib Vaccine Group", 3),
    ("Polio Vaccine Group", 4),
    ("MMR Vaccine Group", 5),
    ("Varicella Vaccine Group", 6),
    ("Pneumococcal Vaccine Group", 9),
    ("Hep A Vaccine Group", 10),
    ("Influenza Vaccine Group", 11),
    ("Meningococcal Vaccine Group", 12),
    ("Rotavirus Vaccine Group", 14),
    ("HPV Vaccine Group", 15),
    ("H1N1 Influenza Vaccine Group", 16),
    ("Meningococcal B Vaccine Group", 17),
];

/// Bidirectional forecaster-name <-> registry-id table.
///
/// Registry group 8 ("Other") has no forecaster name and is deliberately
/// absent, so `name_for_group_id(OTHER)` always fails.
#[derive(Debug, Clone)]
pub struct VaccineGroupMap {
    by_name: HashMap<&'static str, VaccineGroupId>,
    by_id: HashMap<VaccineGroupId, &'static str>,
}

impl VaccineGroupMap {
    pub fn standard() -> Self {
        let mut by_name = HashMap::with_capacity(VACCINE_GROUPS.len());
        let mut by_id = HashMap::with_capacity(VACCINE_GROUPS.len());
        for &(name, id) in VACCINE_GROUPS {
            by_name.insert(name, VaccineGroupId(id));
            by_id.insert(VaccineGroupId(id), name);
        }
        Self { by_name, by_id }
    }

    pub fn group_id_for_name(&self, name: &str) -> Result<VaccineGroupId, ReconError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ReconError::UnknownGroupName(name.to_string()))
    }

    pub fn name_for_group_id(&self, id: VaccineGroupId) -> Result<&'static str, ReconError> {
        self.by_id
            .get(&id)
            .copied()
            .ok_or(ReconError::UnknownGroupId(id))
    }

    /// Group id for a forecaster entry that takes part in reconciliation.
    /// Unknown names and excluded groups yield `None`.
    pub fn comparable_group(&self, name: &str) -> Option<VaccineGroupId> {
        self.group_id_for_name(name)
            .ok()
            .filter(|id| !EXCLUDED_GROUPS.contains(id))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for VaccineGroupMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// Registry group as used for comparison: 8 and 16 drop out, 13 folds into 2.
pub fn normalize_registry_group(id: VaccineGroupId) -> Option<VaccineGroupId> {
    if EXCLUDED_GROUPS.contains(&id) {
        None
    } else if id == DTP_ALIAS {
        Some(DTP)
    } else {
        Some(id)
    }
}

// ---------------------------------------------------------------------------
// Registry codes
// ---------------------------------------------------------------------------

pub mod evaluation_code {
    pub const VALID: i32 = 0;
    pub const INVALID: i32 = 1;
    pub const NOT_VALID: i32 = 3;
    pub const EXTRA_DOSE: i32 = 9;
}

pub mod recommendation_code {
    /// Due now or due in the future; the forecaster distinguishes the two.
    pub const DUE: i32 = 0;
    pub const COMPLETE: i32 = 1;
    pub const TOO_OLD: i32 = 2;
}

/// Registry evaluation code -> description, loaded once from the store.
#[derive(Debug, Clone, Default)]
pub struct EvaluationCodeDescriptions {
    descriptions: HashMap<i32, String>,
}

impl EvaluationCodeDescriptions {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i32, String)>) -> Self {
        Self {
            descriptions: pairs.into_iter().collect(),
        }
    }

    pub fn describe(&self, code: i32) -> String {
        match self.descriptions.get(&code) {
            Some(desc) => desc.clone(),
            None => format!("evaluation code {code}"),
        }
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }
}

/// Immutable lookup context shared by both reconcilers.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub groups: VaccineGroupMap,
    pub evaluation_codes: EvaluationCodeDescriptions,
}

impl ReferenceTables {
    pub fn new(evaluation_codes: EvaluationCodeDescriptions) -> Self {
        Self {
            groups: VaccineGroupMap::standard(),
            evaluation_codes,
        }
    }
}
