//! The comparison run: sample, forecast, reconcile, report.

use std::fmt;
use std::io::{self, Write};

use chrono::NaiveDate;

use icecompare_forecaster::{Forecaster, ForecasterError};
use icecompare_recon::date;
use icecompare_recon::{
    build_request, reconcile_patient, EvaluationCodeDescriptions, Finding, Patient,
    ReconSummary, ReferenceTables, RegistryRecords, SampleSpec,
};
use icecompare_registry::{RegistryError, RegistryStore};

/// Failures that end the run.
#[derive(Debug)]
pub enum CompareError {
    /// Startup reads (evaluation codes, cohort draw) failed.
    Registry(RegistryError),
    /// Findings could not be written.
    Output(io::Error),
}

impl fmt::Display for CompareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "{e}"),
            Self::Output(e) => write!(f, "cannot write findings: {e}"),
        }
    }
}

impl std::error::Error for CompareError {}

impl From<RegistryError> for CompareError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<io::Error> for CompareError {
    fn from(e: io::Error) -> Self {
        Self::Output(e)
    }
}

/// A failure confined to one patient; the run carries on.
#[derive(Debug)]
enum PatientError {
    Registry(RegistryError),
    Forecaster(ForecasterError),
}

impl fmt::Display for PatientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "{e}"),
            Self::Forecaster(e) => write!(f, "forecaster: {e}"),
        }
    }
}

enum PatientOutcome {
    NoDoses,
    Compared(Vec<Finding>),
}

/// Load the registry's evaluation code table into the shared lookup context.
pub fn load_reference_tables<S: RegistryStore>(store: &S) -> Result<ReferenceTables, RegistryError> {
    let codes = EvaluationCodeDescriptions::from_pairs(store.evaluation_codes()?);
    log::debug!("loaded {} evaluation code description(s)", codes.len());
    Ok(ReferenceTables::new(codes))
}

/// Compare up to `sample_count` patients, writing each finding to `out`.
///
/// Patients are handled strictly one after another. A forecaster or registry
/// failure for one patient is logged and counted; only startup reads and
/// output failures abort the run.
pub fn run_comparison<S, F, W>(
    store: &S,
    forecaster: &F,
    tables: &ReferenceTables,
    sample_count: usize,
    today: NaiveDate,
    out: &mut W,
) -> Result<ReconSummary, CompareError>
where
    S: RegistryStore,
    F: Forecaster,
    W: Write,
{
    let spec = SampleSpec::new(sample_count, today);
    let patients = store.sample_patients(&spec)?;
    log::info!(
        "sampled {} patient(s) born after {}",
        patients.len(),
        spec.born_after
    );

    let today_compact = date::compact(today);
    let mut summary = ReconSummary {
        patients_sampled: patients.len(),
        ..Default::default()
    };

    for patient in &patients {
        match compare_patient(store, forecaster, tables, patient, today, &today_compact) {
            Ok(PatientOutcome::NoDoses) => {
                log::debug!("patient {}: no doses, skipped", patient.id);
                summary.patients_without_doses += 1;
            }
            Ok(PatientOutcome::Compared(findings)) => {
                summary.patients_compared += 1;
                for finding in &findings {
                    writeln!(out, "{finding}")?;
                    summary.record(finding);
                }
            }
            Err(e) => {
                log::warn!("patient {}: {e}", patient.id);
                summary.patients_failed += 1;
            }
        }
    }

    out.flush()?;
    Ok(summary)
}

fn compare_patient<S: RegistryStore, F: Forecaster>(
    store: &S,
    forecaster: &F,
    tables: &ReferenceTables,
    patient: &Patient,
    today: NaiveDate,
    today_compact: &str,
) -> Result<PatientOutcome, PatientError> {
    let doses = store.doses(patient.id).map_err(PatientError::Registry)?;
    let request = match build_request(patient, &doses, today) {
        Some(request) => request,
        None => return Ok(PatientOutcome::NoDoses),
    };

    let forecast = forecaster
        .invoke(&request, today)
        .map_err(PatientError::Forecaster)?;

    let registry = RegistryRecords {
        evaluations: store.evaluations(patient.id).map_err(PatientError::Registry)?,
        recommendations: store
            .recommendations(patient.id)
            .map_err(PatientError::Registry)?,
    };

    Ok(PatientOutcome::Compared(reconcile_patient(
        tables,
        patient.id,
        &forecast,
        &registry,
        today_compact,
    )))
}
