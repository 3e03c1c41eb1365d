// Registry access over SQLite

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags};

use icecompare_recon::{
    DoseRecord, Patient, PatientId, RegistryEvaluation, RegistryRecommendation, SampleSpec, Sex,
    VaccineGroupId,
};

use crate::{RegistryError, RegistryStore};

/// Tables the registry reads. Dates are `YYYYMMDD` text.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS algorithm_evaluation_code (
    evaluation_code INTEGER PRIMARY KEY,
    code_desc TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS child (
    child_id INTEGER PRIMARY KEY,
    sex TEXT,
    birth_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS immunization (
    child_id INTEGER NOT NULL,
    date_of_admin TEXT NOT NULL,
    cpt_code TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS evaluation (
    child_id INTEGER NOT NULL,
    cpt_code TEXT NOT NULL,
    date_of_admin TEXT NOT NULL,
    vaccine_category_group_id INTEGER NOT NULL,
    evaluation_code INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS recommendation (
    child_id INTEGER NOT NULL,
    vaccine_category_group_id INTEGER NOT NULL,
    recommendation_code INTEGER NOT NULL,
    ns_due_date TEXT,            -- NULL = no next-scheduled date
    overdue_date TEXT            -- NULL = no overdue date
);
"#;

const EVALUATION_CODES_SQL: &str =
    "SELECT evaluation_code, code_desc FROM algorithm_evaluation_code";

const SAMPLE_SQL: &str = "
    SELECT child_id, sex, birth_date
    FROM child
    WHERE birth_date > ?1
    ORDER BY RANDOM()
    LIMIT ?2";

const DOSES_SQL: &str = "
    SELECT date_of_admin, cpt_code
    FROM immunization
    WHERE child_id = ?1
    ORDER BY date_of_admin";

// 8 = other, 16 = H1N1; 13 is stored separately but compared as DTP (2)
const EVALUATIONS_SQL: &str = "
    SELECT cpt_code,
           date_of_admin,
           CASE vaccine_category_group_id WHEN 13 THEN 2 ELSE vaccine_category_group_id END,
           evaluation_code
    FROM evaluation
    WHERE vaccine_category_group_id NOT IN (8, 16)
      AND child_id = ?1";

const RECOMMENDATIONS_SQL: &str = "
    SELECT CASE vaccine_category_group_id WHEN 13 THEN 2 ELSE vaccine_category_group_id END,
           recommendation_code,
           ns_due_date,
           overdue_date
    FROM recommendation
    WHERE vaccine_category_group_id NOT IN (8, 16)
      AND child_id = ?1";

pub struct SqliteRegistry {
    conn: Connection,
}

impl SqliteRegistry {
    /// Open an existing registry database read-only.
    pub fn open_read_only(path: &Path) -> Result<Self, RegistryError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| RegistryError::Open(format!("{}: {e}", path.display())))?;
        log::debug!("opened registry {}", path.display());
        Ok(Self { conn })
    }

    /// Wrap an already-open connection (fixtures, in-memory databases).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

fn query_err(what: &'static str) -> impl Fn(rusqlite::Error) -> RegistryError {
    move |e| RegistryError::Query {
        what,
        message: e.to_string(),
    }
}

fn group_id(what: &'static str, raw: i64) -> Result<VaccineGroupId, RegistryError> {
    u8::try_from(raw)
        .map(VaccineGroupId)
        .map_err(|_| RegistryError::Value {
            what,
            message: format!("vaccine group id {raw} out of range"),
        })
}

impl RegistryStore for SqliteRegistry {
    fn evaluation_codes(&self) -> Result<Vec<(i32, String)>, RegistryError> {
        let what = "evaluation codes";
        let mut stmt = self.conn.prepare(EVALUATION_CODES_SQL).map_err(query_err(what))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i32>(0)?, row.get::<_, String>(1)?)))
            .map_err(query_err(what))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_err(what))
    }

    fn sample_patients(&self, spec: &SampleSpec) -> Result<Vec<Patient>, RegistryError> {
        let what = "sample patients";
        let limit = i64::try_from(spec.count).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(SAMPLE_SQL).map_err(query_err(what))?;
        let rows = stmt
            .query_map(params![spec.born_after, limit], |row| {
                Ok(Patient {
                    id: PatientId(row.get(0)?),
                    sex: Sex::from_registry(row.get::<_, Option<String>>(1)?.as_deref()),
                    dob: row.get(2)?,
                })
            })
            .map_err(query_err(what))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_err(what))
    }

    fn doses(&self, patient: PatientId) -> Result<Vec<DoseRecord>, RegistryError> {
        let what = "doses";
        let mut stmt = self.conn.prepare(DOSES_SQL).map_err(query_err(what))?;
        let rows = stmt
            .query_map(params![patient.0], |row| {
                Ok(DoseRecord {
                    date_of_admin: row.get(0)?,
                    product: row.get(1)?,
                })
            })
            .map_err(query_err(what))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_err(what))
    }

    fn evaluations(&self, patient: PatientId) -> Result<Vec<RegistryEvaluation>, RegistryError> {
        let what = "evaluations";
        let mut stmt = self.conn.prepare(EVALUATIONS_SQL).map_err(query_err(what))?;
        let rows = stmt
            .query_map(params![patient.0], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i32>(3)?,
                ))
            })
            .map_err(query_err(what))?;

        let mut evaluations = Vec::new();
        for row in rows {
            let (product, date_of_admin, group, code) = row.map_err(query_err(what))?;
            evaluations.push(RegistryEvaluation {
                product,
                date_of_admin,
                group: group_id(what, group)?,
                code,
            });
        }
        Ok(evaluations)
    }

    fn recommendations(
        &self,
        patient: PatientId,
    ) -> Result<Vec<RegistryRecommendation>, RegistryError> {
        let what = "recommendations";
        let mut stmt = self.conn.prepare(RECOMMENDATIONS_SQL).map_err(query_err(what))?;
        let rows = stmt
            .query_map(params![patient.0], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })
            .map_err(query_err(what))?;

        let mut recommendations = Vec::new();
        for row in rows {
            let (group, code, due_date, overdue_date) = row.map_err(query_err(what))?;
            recommendations.push(RegistryRecommendation {
                group: group_id(what, group)?,
                code,
                due_date: due_date.unwrap_or_default(),
                overdue_date: overdue_date.unwrap_or_default(),
            });
        }
        Ok(recommendations)
    }
}
