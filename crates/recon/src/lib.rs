//! `icecompare-recon`: registry vs. forecaster reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded registry records and a parsed
//! forecaster result, returns findings. No database or network dependencies.

pub mod codes;
pub mod date;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod evidence;
pub mod model;
pub mod recommendation;
pub mod request;
pub mod sampler;

pub use codes::{EvaluationCodeDescriptions, ReferenceTables, VaccineGroupId, VaccineGroupMap};
pub use engine::{reconcile_patient, RegistryRecords};
pub use error::ReconError;
pub use evidence::ReconSummary;
pub use model::{
    DoseRecord, Finding, FindingKind, ForecastResult, ForecasterEvaluation,
    ForecasterRecommendation, Patient, PatientId, RegistryEvaluation, RegistryRecommendation, Sex,
};
pub use request::{build_request, ForecastRequest};
pub use sampler::SampleSpec;
