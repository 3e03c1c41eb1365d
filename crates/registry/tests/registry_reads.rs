use std::collections::HashSet;

use chrono::NaiveDate;
use rusqlite::Connection;
use tempfile::TempDir;

use icecompare_recon::{PatientId, SampleSpec, Sex, VaccineGroupId};
use icecompare_registry::{RegistryStore, SqliteRegistry, SCHEMA};

const FIXTURE: &str = r#"
INSERT INTO algorithm_evaluation_code VALUES (0, 'Valid');
INSERT INTO algorithm_evaluation_code VALUES (1, 'Invalid');
INSERT INTO algorithm_evaluation_code VALUES (9, 'Extra dose');

INSERT INTO child VALUES (1, 'M', '20190315');
INSERT INTO child VALUES (2, 'F', '20100101');
INSERT INTO child VALUES (3, 'U', '20220720');
INSERT INTO child VALUES (4, NULL, '20230102');
INSERT INTO child VALUES (5, 'M', '19990101');

INSERT INTO immunization VALUES (1, '20200315', '03');
INSERT INTO immunization VALUES (1, '20190515', '20');
INSERT INTO immunization VALUES (1, '20190715', '20');

INSERT INTO evaluation VALUES (1, '20', '20190515', 2, 0);
INSERT INTO evaluation VALUES (1, '20', '20190715', 13, 0);
INSERT INTO evaluation VALUES (1, '03', '20200315', 5, 0);
INSERT INTO evaluation VALUES (1, '88', '20200315', 8, 0);
INSERT INTO evaluation VALUES (1, '128', '20200315', 16, 0);

INSERT INTO recommendation VALUES (1, 5, 1, NULL, NULL);
INSERT INTO recommendation VALUES (1, 13, 0, '20261101', '20261201');
INSERT INTO recommendation VALUES (1, 8, 0, '20261101', NULL);
INSERT INTO recommendation VALUES (1, 16, 0, '20261101', NULL);
"#;

/// Build a registry file on disk and open it the way the binary does.
fn registry() -> (TempDir, SqliteRegistry) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(FIXTURE).unwrap();
    }
    let registry = SqliteRegistry::open_read_only(&path).unwrap();
    (dir, registry)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

#[test]
fn loads_evaluation_code_descriptions() {
    let (_dir, registry) = registry();
    let mut codes = registry.evaluation_codes().unwrap();
    codes.sort();
    assert_eq!(
        codes,
        vec![
            (0, "Valid".to_string()),
            (1, "Invalid".to_string()),
            (9, "Extra dose".to_string()),
        ]
    );
}

#[test]
fn sample_excludes_patients_nineteen_or_older() {
    let (_dir, registry) = registry();
    let patients = registry.sample_patients(&SampleSpec::new(100, today())).unwrap();
    let ids: HashSet<i64> = patients.iter().map(|p| p.id.0).collect();
    assert_eq!(ids, HashSet::from([1, 2, 3, 4]));
}

#[test]
fn sample_is_bounded_by_count() {
    let (_dir, registry) = registry();
    let patients = registry.sample_patients(&SampleSpec::new(2, today())).unwrap();
    assert_eq!(patients.len(), 2);
    let none = registry.sample_patients(&SampleSpec::new(0, today())).unwrap();
    assert!(none.is_empty());
}

#[test]
fn sex_is_normalized_to_m_or_f() {
    let (_dir, registry) = registry();
    let patients = registry.sample_patients(&SampleSpec::new(100, today())).unwrap();
    for p in &patients {
        let expected = if p.id.0 == 1 { Sex::Male } else { Sex::Female };
        assert_eq!(p.sex, expected, "patient {}", p.id);
    }
}

#[test]
fn doses_are_ordered_by_administration_date() {
    let (_dir, registry) = registry();
    let doses = registry.doses(PatientId(1)).unwrap();
    let dates: Vec<&str> = doses.iter().map(|d| d.date_of_admin.as_str()).collect();
    assert_eq!(dates, ["20190515", "20190715", "20200315"]);
    assert!(registry.doses(PatientId(2)).unwrap().is_empty());
}

#[test]
fn evaluations_exclude_other_and_h1n1_and_fold_13_into_2() {
    let (_dir, registry) = registry();
    let evaluations = registry.evaluations(PatientId(1)).unwrap();
    assert_eq!(evaluations.len(), 3);
    let groups: HashSet<VaccineGroupId> = evaluations.iter().map(|e| e.group).collect();
    assert_eq!(groups, HashSet::from([VaccineGroupId(2), VaccineGroupId(5)]));
}

#[test]
fn recommendations_map_null_dates_to_empty() {
    let (_dir, registry) = registry();
    let mut recs = registry.recommendations(PatientId(1)).unwrap();
    recs.sort_by_key(|r| r.group);
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].group, VaccineGroupId(2));
    assert_eq!(recs[0].due_date, "20261101");
    assert_eq!(recs[0].overdue_date, "20261201");
    assert_eq!(recs[1].group, VaccineGroupId(5));
    assert_eq!(recs[1].due_date, "");
    assert_eq!(recs[1].overdue_date, "");
}
