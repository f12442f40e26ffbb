use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{parse_id, parse_timestamp, TrackingStore, TIMESTAMP_FORMAT};
use crate::db::DatabaseError;
use crate::models::*;

/// `TrackingStore` over a borrowed SQLite connection.
pub struct SqliteTrackingStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteTrackingStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl TrackingStore for SqliteTrackingStore<'_> {
    fn find_record(
        &self,
        patient_id: &str,
        disease_name: &str,
        symptom_name: &str,
    ) -> Result<Option<TrackingRecord>, DatabaseError> {
        find_tracking_record(self.conn, patient_id, disease_name, symptom_name)
    }

    fn create_record(&self, record: &NewTrackingRecord) -> Result<TrackingRecord, DatabaseError> {
        insert_tracking_record(self.conn, record)
    }

    fn append_daily_log(
        &self,
        record: &TrackingRecord,
        log: &DailyLog,
    ) -> Result<TrackingRecord, DatabaseError> {
        insert_daily_log(self.conn, &record.id, log)?;
        get_tracking_record(self.conn, &record.id)
    }

    fn set_cured(
        &self,
        record: &TrackingRecord,
        is_cured: bool,
    ) -> Result<TrackingRecord, DatabaseError> {
        update_cured(self.conn, &record.id, is_cured)?;
        get_tracking_record(self.conn, &record.id)
    }

    fn list_records(&self, patient_id: &str) -> Result<Vec<TrackingRecord>, DatabaseError> {
        list_tracking_records(self.conn, Some(patient_id))
    }

    fn list_all_records(&self) -> Result<Vec<TrackingRecord>, DatabaseError> {
        list_tracking_records(self.conn, None)
    }
}

// ═══════════════════════════════════════════
// Repository functions
// ═══════════════════════════════════════════

/// Creates the record for a key, or returns the one already there.
/// Concurrent first submissions for the same key converge on a single row.
pub fn insert_tracking_record(
    conn: &Connection,
    record: &NewTrackingRecord,
) -> Result<TrackingRecord, DatabaseError> {
    let id = Uuid::new_v4();
    let now = Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string();

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO tracking_records (id, patient_id, disease_name, symptom_name,
         estimated_recovery_days, is_cured, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![
            id.to_string(),
            record.patient_id,
            record.disease_name,
            record.symptom_name,
            record.estimated_recovery_days,
            now,
        ],
    )?;
    if inserted == 1 {
        return get_tracking_record(conn, &id);
    }

    tracing::debug!(
        patient = %record.patient_id,
        symptom = %record.symptom_name,
        "Tracking record already exists"
    );
    find_tracking_record(
        conn,
        &record.patient_id,
        &record.disease_name,
        &record.symptom_name,
    )?
    .ok_or_else(|| DatabaseError::ConstraintViolation(format!(
        "tracking record for {}/{} was ignored but not found",
        record.disease_name, record.symptom_name
    )))
}

pub fn get_tracking_record(conn: &Connection, id: &Uuid) -> Result<TrackingRecord, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, disease_name, symptom_name, estimated_recovery_days,
             is_cured, created_at
             FROM tracking_records WHERE id = ?1",
            params![id.to_string()],
            read_record_row,
        )
        .optional()?
        .ok_or_else(|| DatabaseError::NotFound {
            entity_type: "TrackingRecord".into(),
            id: id.to_string(),
        })?;
    record_from_row(conn, row)
}

pub fn find_tracking_record(
    conn: &Connection,
    patient_id: &str,
    disease_name: &str,
    symptom_name: &str,
) -> Result<Option<TrackingRecord>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, disease_name, symptom_name, estimated_recovery_days,
             is_cured, created_at
             FROM tracking_records
             WHERE patient_id = ?1 AND disease_name = ?2 AND symptom_name = ?3",
            params![patient_id, disease_name, symptom_name],
            read_record_row,
        )
        .optional()?;
    row.map(|r| record_from_row(conn, r)).transpose()
}

/// Records in creation order, optionally restricted to one patient.
pub fn list_tracking_records(
    conn: &Connection,
    patient_id: Option<&str>,
) -> Result<Vec<TrackingRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, disease_name, symptom_name, estimated_recovery_days,
         is_cured, created_at
         FROM tracking_records
         WHERE ?1 IS NULL OR patient_id = ?1
         ORDER BY created_at ASC, rowid ASC",
    )?;
    let rows = stmt.query_map(params![patient_id], read_record_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(record_from_row(conn, row?)?);
    }
    Ok(records)
}

pub fn insert_daily_log(
    conn: &Connection,
    record_id: &Uuid,
    log: &DailyLog,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO daily_logs (record_id, log_date, score, severity)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            record_id.to_string(),
            log.date.to_string(),
            log.score,
            log.severity.as_str(),
        ],
    )?;
    Ok(())
}

pub fn update_cured(conn: &Connection, record_id: &Uuid, is_cured: bool) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE tracking_records SET is_cured = ?1 WHERE id = ?2",
        params![is_cured as i32, record_id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "TrackingRecord".into(),
            id: record_id.to_string(),
        });
    }
    Ok(())
}

/// Logs for one record in append order.
fn load_daily_logs(conn: &Connection, record_id: &str) -> Result<Vec<DailyLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT log_date, score, severity FROM daily_logs
         WHERE record_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![record_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, u8>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut logs = Vec::new();
    for row in rows {
        let (date, score, severity) = row?;
        logs.push(DailyLog {
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| DatabaseError::ConstraintViolation(format!("bad log date {date}: {e}")))?,
            score,
            severity: Severity::from_str(&severity)?,
        });
    }
    Ok(logs)
}

type RecordRow = (String, String, String, String, u32, i32, String);

fn read_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, String>(3)?,
        row.get::<_, u32>(4)?,
        row.get::<_, i32>(5)?,
        row.get::<_, String>(6)?,
    ))
}

fn record_from_row(conn: &Connection, row: RecordRow) -> Result<TrackingRecord, DatabaseError> {
    let (id, patient_id, disease_name, symptom_name, recovery_days, is_cured, created_at) = row;
    let daily_logs = load_daily_logs(conn, &id)?;
    Ok(TrackingRecord {
        id: parse_id(&id)?,
        patient_id,
        disease_name,
        symptom_name,
        estimated_recovery_days: recovery_days,
        is_cured: is_cured != 0,
        daily_logs,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn new_record(patient: &str, disease: &str, symptom: &str) -> NewTrackingRecord {
        NewTrackingRecord {
            patient_id: patient.into(),
            disease_name: disease.into(),
            symptom_name: symptom.into(),
            estimated_recovery_days: 21,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn create_then_find_by_key() {
        let conn = test_db();
        let store = SqliteTrackingStore::new(&conn);
        let created = store
            .create_record(&new_record("a@x.com", "Pneumonia", "cough"))
            .unwrap();

        let found = store
            .find_record("a@x.com", "Pneumonia", "cough")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.estimated_recovery_days, 21);
        assert!(!found.is_cured);
        assert!(found.daily_logs.is_empty());
    }

    #[test]
    fn find_missing_returns_none() {
        let conn = test_db();
        let store = SqliteTrackingStore::new(&conn);
        assert!(store.find_record("a@x.com", "Pneumonia", "cough").unwrap().is_none());
    }

    #[test]
    fn create_twice_returns_existing_record() {
        let conn = test_db();
        let store = SqliteTrackingStore::new(&conn);
        let rec = new_record("a@x.com", "Pneumonia", "cough");
        let first = store.create_record(&rec).unwrap();
        let first = store.append_daily_log(&first, &DailyLog::scored(day(1), 5)).unwrap();

        let second = store.create_record(&rec).unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.daily_logs.len(), 1);
        assert_eq!(store.list_all_records().unwrap().len(), 1);
    }

    #[test]
    fn key_still_unique_in_schema() {
        let conn = test_db();
        let store = SqliteTrackingStore::new(&conn);
        let rec = store.create_record(&new_record("a@x.com", "Pneumonia", "cough")).unwrap();
        let dup = conn.execute(
            "INSERT INTO tracking_records (id, patient_id, disease_name, symptom_name,
             estimated_recovery_days, is_cured, created_at)
             VALUES (?1, 'a@x.com', 'Pneumonia', 'cough', 21, 0, '2025-04-01 00:00:00')",
            params![Uuid::new_v4().to_string()],
        );
        assert!(dup.is_err());
        assert_eq!(store.find_record("a@x.com", "Pneumonia", "cough").unwrap().unwrap().id, rec.id);
    }

    #[test]
    fn logs_append_in_order() {
        let conn = test_db();
        let store = SqliteTrackingStore::new(&conn);
        let rec = store
            .create_record(&new_record("a@x.com", "Pneumonia", "cough"))
            .unwrap();

        let rec = store.append_daily_log(&rec, &DailyLog::scored(day(3), 9)).unwrap();
        let rec = store.append_daily_log(&rec, &DailyLog::scored(day(1), 2)).unwrap();

        assert_eq!(rec.daily_logs.len(), 2);
        assert_eq!(rec.daily_logs[0].date, day(3));
        assert_eq!(rec.daily_logs[0].severity, Severity::High);
        assert_eq!(rec.daily_logs[1].severity, Severity::Low);
        assert_eq!(rec.latest_log().unwrap().date, day(3));
    }

    #[test]
    fn set_cured_toggles_flag() {
        let conn = test_db();
        let store = SqliteTrackingStore::new(&conn);
        let rec = store
            .create_record(&new_record("a@x.com", "Pneumonia", "cough"))
            .unwrap();

        let rec = store.set_cured(&rec, true).unwrap();
        assert!(rec.is_cured);
        let rec = store.set_cured(&rec, false).unwrap();
        assert!(!rec.is_cured);
    }

    #[test]
    fn update_cured_unknown_id_not_found() {
        let conn = test_db();
        let err = update_cured(&conn, &Uuid::new_v4(), true).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn list_scopes_by_patient() {
        let conn = test_db();
        let store = SqliteTrackingStore::new(&conn);
        store.create_record(&new_record("a@x.com", "Pneumonia", "cough")).unwrap();
        store.create_record(&new_record("a@x.com", "Pneumonia", "fever")).unwrap();
        store.create_record(&new_record("b@x.com", "Diabetes", "fatigue")).unwrap();

        let mine = store.list_records("a@x.com").unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].symptom_name, "cough");
        assert_eq!(mine[1].symptom_name, "fever");

        assert_eq!(store.list_all_records().unwrap().len(), 3);
        assert!(store.list_records("nobody@x.com").unwrap().is_empty());
    }

    #[test]
    fn score_outside_range_rejected_by_schema() {
        let conn = test_db();
        let store = SqliteTrackingStore::new(&conn);
        let rec = store
            .create_record(&new_record("a@x.com", "Pneumonia", "cough"))
            .unwrap();
        let bogus = DailyLog {
            date: day(1),
            score: 11,
            severity: Severity::High,
        };
        assert!(insert_daily_log(&conn, &rec.id, &bogus).is_err());
    }
}
