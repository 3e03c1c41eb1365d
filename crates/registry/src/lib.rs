//! Registry read contract and its SQLite implementation.
//!
//! Read-only: nothing in this crate writes to the registry.

mod sqlite;

use std::fmt;

use icecompare_recon::{
    DoseRecord, Patient, PatientId, RegistryEvaluation, RegistryRecommendation, SampleSpec,
};

pub use sqlite::{SqliteRegistry, SCHEMA};

#[derive(Debug)]
pub enum RegistryError {
    /// Database could not be opened.
    Open(String),
    /// A query failed.
    Query { what: &'static str, message: String },
    /// A stored value is out of range for its field.
    Value { what: &'static str, message: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(msg) => write!(f, "cannot open registry: {msg}"),
            Self::Query { what, message } => write!(f, "registry query '{what}' failed: {message}"),
            Self::Value { what, message } => write!(f, "registry query '{what}': bad value: {message}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// The five reads a comparison run needs.
pub trait RegistryStore {
    /// All (evaluation code, description) pairs.
    fn evaluation_codes(&self) -> Result<Vec<(i32, String)>, RegistryError>;

    /// Up to `spec.count` patients born after `spec.born_after`, drawn at random.
    fn sample_patients(&self, spec: &SampleSpec) -> Result<Vec<Patient>, RegistryError>;

    /// Dose history, administration date ascending.
    fn doses(&self, patient: PatientId) -> Result<Vec<DoseRecord>, RegistryError>;

    /// Stored evaluations without groups 8/16, group 13 reported as 2.
    fn evaluations(&self, patient: PatientId) -> Result<Vec<RegistryEvaluation>, RegistryError>;

    /// Stored recommendations without groups 8/16, group 13 reported as 2.
    fn recommendations(
        &self,
        patient: PatientId,
    ) -> Result<Vec<RegistryRecommendation>, RegistryError>;
}
