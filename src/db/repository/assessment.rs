use chrono::Local;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{parse_id, parse_timestamp, TIMESTAMP_FORMAT};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_assessment(conn: &Connection, assessment: &SavedAssessment) -> Result<(), DatabaseError> {
    let symptoms = serde_json::to_string(&assessment.symptoms)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    let steps = serde_json::to_string(&assessment.follow_up_steps)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

    conn.execute(
        "INSERT INTO risk_assessments (id, patient_id, predicted_disease, symptoms,
         follow_up_steps, recovery_days, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            assessment.id.to_string(),
            assessment.patient_id,
            assessment.predicted_disease,
            symptoms,
            steps,
            assessment.recovery_days,
            assessment.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Builds a row for `insert_assessment` stamped with the current local time.
pub fn new_assessment_row(
    patient_id: &str,
    predicted_disease: &str,
    symptoms: Vec<String>,
    follow_up_steps: Vec<String>,
    recovery_days: u32,
) -> SavedAssessment {
    SavedAssessment {
        id: Uuid::new_v4(),
        patient_id: patient_id.to_string(),
        predicted_disease: predicted_disease.to_string(),
        symptoms,
        follow_up_steps,
        recovery_days,
        created_at: Local::now().naive_local(),
    }
}

pub fn assessment_exists(
    conn: &Connection,
    patient_id: &str,
    predicted_disease: &str,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM risk_assessments WHERE patient_id = ?1 AND predicted_disease = ?2",
        params![patient_id, predicted_disease],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Newest first.
pub fn list_assessments(conn: &Connection, patient_id: &str) -> Result<Vec<SavedAssessment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, predicted_disease, symptoms, follow_up_steps,
         recovery_days, created_at
         FROM risk_assessments WHERE patient_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![patient_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, u32>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut assessments = Vec::new();
    for row in rows {
        let (id, patient_id, predicted_disease, symptoms, steps, recovery_days, created_at) = row?;
        assessments.push(SavedAssessment {
            id: parse_id(&id)?,
            patient_id,
            predicted_disease,
            symptoms: serde_json::from_str(&symptoms)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            follow_up_steps: serde_json::from_str(&steps)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            recovery_days,
            created_at: parse_timestamp(&created_at)?,
        });
    }
    Ok(assessments)
}
