use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::date;
use crate::model::{DoseRecord, Patient, PatientId, Sex};

/// Real names never leave the registry.
pub const PLACEHOLDER_FIRST_NAME: &str = "First";
pub const PLACEHOLDER_LAST_NAME: &str = "Last";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DoseStatus {
    /// Dose was given (as opposed to refused or not administered).
    #[serde(rename = "I")]
    Administered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseEntry {
    pub id: Uuid,
    pub date_of_admin: String,
    pub vaccine: String,
    pub status: DoseStatus,
}

/// Forecaster input for one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub id: PatientId,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub gender: Sex,
    pub dob: String,
    pub eval_date: String,
    pub izs: Vec<DoseEntry>,
}

/// Build the forecaster payload, keeping dose order as given.
///
/// Returns `None` for an empty history: there is nothing to forecast and
/// the forecaster must not be called.
pub fn build_request(
    patient: &Patient,
    doses: &[DoseRecord],
    eval_date: NaiveDate,
) -> Option<ForecastRequest> {
    if doses.is_empty() {
        return None;
    }

    let izs = doses
        .iter()
        .map(|dose| DoseEntry {
            id: Uuid::new_v4(),
            date_of_admin: dose.date_of_admin.clone(),
            vaccine: dose.product.clone(),
            status: DoseStatus::Administered,
        })
        .collect();

    Some(ForecastRequest {
        id: patient.id,
        first_name: PLACEHOLDER_FIRST_NAME,
        last_name: PLACEHOLDER_LAST_NAME,
        gender: patient.sex,
        dob: patient.dob.clone(),
        eval_date: date::compact(eval_date),
        izs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn patient() -> Patient {
        Patient {
            id: PatientId(1001),
            sex: Sex::Male,
            dob: "20190315".into(),
        }
    }

    fn dose(date: &str, product: &str) -> DoseRecord {
        DoseRecord {
            date_of_admin: date.into(),
            product: product.into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[test]
    fn empty_history_builds_nothing() {
        assert!(build_request(&patient(), &[], today()).is_none());
    }

    #[test]
    fn preserves_dose_order_and_marks_administered() {
        let doses = vec![
            dose("20190515", "20"),
            dose("20190715", "20"),
            dose("20200315", "03"),
        ];
        let req = build_request(&patient(), &doses, today()).unwrap();

        assert_eq!(req.izs.len(), 3);
        let dates: Vec<&str> = req.izs.iter().map(|d| d.date_of_admin.as_str()).collect();
        assert_eq!(dates, ["20190515", "20190715", "20200315"]);
        assert_eq!(req.izs[2].vaccine, "03");
        assert!(req.izs.iter().all(|d| d.status == DoseStatus::Administered));
        assert_eq!(req.eval_date, "20261017");
    }

    #[test]
    fn dose_ids_are_unique() {
        let doses = vec![dose("20190515", "20"); 20];
        let req = build_request(&patient(), &doses, today()).unwrap();
        let ids: HashSet<Uuid> = req.izs.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn placeholder_names_in_payload() {
        let req = build_request(&patient(), &[dose("20190515", "20")], today()).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["firstName"], "First");
        assert_eq!(json["lastName"], "Last");
        assert_eq!(json["gender"], "M");
        assert_eq!(json["id"], 1001);
        assert_eq!(json["izs"][0]["status"], "I");
        assert_eq!(json["izs"][0]["dateOfAdmin"], "20190515");
    }
}
