use crate::codes::ReferenceTables;
use crate::evaluation::reconcile_evaluations;
use crate::model::{Finding, ForecastResult, PatientId, RegistryEvaluation, RegistryRecommendation};
use crate::recommendation::reconcile_recommendations;

/// What the registry holds for one patient.
#[derive(Debug, Clone, Default)]
pub struct RegistryRecords {
    pub evaluations: Vec<RegistryEvaluation>,
    pub recommendations: Vec<RegistryRecommendation>,
}

/// Reconcile one patient: evaluation findings first, then recommendations.
/// `today` is `YYYYMMDD`.
pub fn reconcile_patient(
    tables: &ReferenceTables,
    patient: PatientId,
    forecast: &ForecastResult,
    registry: &RegistryRecords,
    today: &str,
) -> Vec<Finding> {
    let mut findings =
        reconcile_evaluations(tables, patient, &forecast.evaluations, &registry.evaluations);
    findings.extend(reconcile_recommendations(
        tables,
        patient,
        &forecast.recommendations,
        &registry.recommendations,
        today,
    ));
    findings
}
