//! Forecaster client. The only code that talks to ICE.
//!
//! Blocking, one request per patient. No retries: a failed call is
//! reported to the caller, which decides whether to carry on.

mod client;
mod wire;

use chrono::NaiveDate;
use icecompare_recon::{ForecastRequest, ForecastResult};

pub use client::{ForecasterError, IceClient};
pub use wire::{ForecastEnvelope, ForecastResponse, WireEvaluation, WireForecast};

/// Anything that can turn a dose history into evaluations + recommendations.
pub trait Forecaster {
    fn invoke(
        &self,
        request: &ForecastRequest,
        eval_date: NaiveDate,
    ) -> Result<ForecastResult, ForecasterError>;
}
