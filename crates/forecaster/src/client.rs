//! ICE HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Timeouts are
//! whatever reqwest's blocking client applies by default.

use chrono::NaiveDate;

use icecompare_recon::{ForecastRequest, ForecastResult};

use crate::wire::{ForecastEnvelope, ForecastResponse};
use crate::Forecaster;

/// Upper bound on how much of an error body is kept for diagnostics.
const MAX_ERROR_BODY: usize = 2_000;

/// Error type for forecaster calls.
#[derive(Debug)]
pub enum ForecasterError {
    /// Client construction or transport failure
    Network(String),
    /// Non-success HTTP status
    Http(u16, String),
    /// Response body was not the expected JSON
    Parse(String),
}

impl std::fmt::Display for ForecasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecasterError::Network(msg) => write!(f, "Network error: {}", msg),
            ForecasterError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ForecasterError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ForecasterError {}

/// ICE decision support client (blocking).
#[derive(Clone)]
pub struct IceClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl IceClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ForecasterError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("ice-compare/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ForecasterError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, envelope: &ForecastEnvelope<'_>) -> Result<String, ForecasterError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(envelope)
            .send()
            .map_err(|e| ForecasterError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| ForecasterError::Network(e.to_string()))?;

        if !status.is_success() {
            let mut detail = body;
            if detail.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !detail.is_char_boundary(cut) {
                    cut -= 1;
                }
                detail.truncate(cut);
            }
            return Err(ForecasterError::Http(status.as_u16(), detail));
        }

        Ok(body)
    }
}

impl Forecaster for IceClient {
    fn invoke(
        &self,
        request: &ForecastRequest,
        eval_date: NaiveDate,
    ) -> Result<ForecastResult, ForecasterError> {
        let envelope = ForecastEnvelope {
            eval_date: eval_date.format("%Y-%m-%d").to_string(),
            patients: [request],
        };

        log::debug!(
            "patient {}: sending {} dose(s) to {}",
            request.id,
            request.izs.len(),
            self.endpoint
        );
        let body = self.post(&envelope)?;
        log::debug!("patient {}: forecaster response: {}", request.id, body);

        let response: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| ForecasterError::Parse(e.to_string()))?;
        Ok(response.into())
    }
}
