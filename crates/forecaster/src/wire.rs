//! JSON shapes exchanged with the forecaster endpoint.

use serde::{Deserialize, Deserializer, Serialize};

use icecompare_recon::{
    ForecastRequest, ForecastResult, ForecasterEvaluation, ForecasterRecommendation,
};

/// Request body: the evaluation date (`YYYY-MM-DD`) plus the patient payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEnvelope<'a> {
    pub eval_date: String,
    pub patients: [&'a ForecastRequest; 1],
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub evaluations: Vec<WireEvaluation>,
    #[serde(default)]
    pub forecasts: Vec<WireForecast>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvaluation {
    /// `CVX` or `CVX:description`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vaccine: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date_of_admin: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub group: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub eval_code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub eval_interp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireForecast {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub group: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub concept: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interp: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub due_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub past_due_date: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Product code without the `:description` suffix.
fn product_code(vaccine: &str) -> &str {
    vaccine.split(':').next().unwrap_or(vaccine).trim()
}

impl From<WireEvaluation> for ForecasterEvaluation {
    fn from(w: WireEvaluation) -> Self {
        Self {
            product: product_code(&w.vaccine).to_string(),
            date_of_admin: w.date_of_admin,
            group: w.group,
            code: w.eval_code,
            interpretation: w.eval_interp,
        }
    }
}

impl From<WireForecast> for ForecasterRecommendation {
    fn from(w: WireForecast) -> Self {
        Self {
            group: w.group,
            concept: w.concept,
            interpretation: w.interp,
            due_date: w.due_date,
            past_due_date: w.past_due_date,
        }
    }
}

impl From<ForecastResponse> for ForecastResult {
    fn from(r: ForecastResponse) -> Self {
        Self {
            evaluations: r.evaluations.into_iter().map(Into::into).collect(),
            recommendations: r.forecasts.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use icecompare_recon::{build_request, DoseRecord, Patient, PatientId, Sex};

    #[test]
    fn strips_vaccine_description() {
        assert_eq!(product_code("03:MMR"), "03");
        assert_eq!(product_code("20"), "20");
        assert_eq!(product_code(""), "");
    }

    #[test]
    fn envelope_shape() {
        let patient = Patient {
            id: PatientId(12),
            sex: Sex::Female,
            dob: "20190315".into(),
        };
        let doses = [DoseRecord {
            date_of_admin: "20200315".into(),
            product: "03".into(),
        }];
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let request = build_request(&patient, &doses, today).unwrap();
        let envelope = ForecastEnvelope {
            eval_date: today.format("%Y-%m-%d").to_string(),
            patients: [&request],
        };

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["evalDate"], "2026-10-17");
        assert_eq!(json["patients"][0]["evalDate"], "20261017");
        assert_eq!(json["patients"][0]["gender"], "F");
        assert_eq!(json["patients"][0]["izs"][0]["vaccine"], "03");
    }

    #[test]
    fn response_tolerates_nulls_and_missing_fields() {
        let body = serde_json::json!({
            "evaluations": [
                { "vaccine": "03:MMR", "dateOfAdmin": "20200315", "group": "MMR Vaccine Group",
                  "evalCode": "VALID", "evalInterp": null }
            ],
            "forecasts": [
                { "group": "MMR Vaccine Group", "concept": "NOT_RECOMMENDED", "interp": "COMPLETE" }
            ]
        });
        let response: ForecastResponse = serde_json::from_value(body).unwrap();
        let result = ForecastResult::from(response);

        assert_eq!(result.evaluations[0].product, "03");
        assert_eq!(result.evaluations[0].interpretation, "");
        assert_eq!(result.recommendations[0].due_date, "");
        assert_eq!(result.recommendations[0].tuple(), "NOT_RECOMMENDED^COMPLETE^^");
    }

    #[test]
    fn empty_response_is_empty_result() {
        let response: ForecastResponse = serde_json::from_str("{}").unwrap();
        let result = ForecastResult::from(response);
        assert!(result.evaluations.is_empty());
        assert!(result.recommendations.is_empty());
    }
}
