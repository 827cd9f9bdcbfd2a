use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::{
  database::{Connection, ErrorExt, Result},
  types::id::{
    marker::{DispensingMarker, PatientMarker, UserMarker},
    Id,
  },
};

/// One medication withdrawal handed to a patient. Append-only: rows
/// are never updated or deleted, and `delivered_at` is assigned by the
/// database at insertion so clients cannot spoof the timeline.
#[derive(Debug, FromRow, Serialize, PartialEq, Eq)]
pub struct Dispensing {
  pub id: Id<DispensingMarker>,
  pub patient_id: Id<PatientMarker>,
  pub medication: String,
  pub quantity: i32,
  #[serde(rename = "type")]
  pub kind: String,
  pub delivered_at: NaiveDateTime,
  pub delivered_by: Option<Id<UserMarker>>,
}

/// A history row with the delivering user's display name resolved,
/// the shape the per-patient history endpoint serves.
#[derive(Debug, FromRow, Serialize, PartialEq, Eq)]
pub struct HistoryEntry {
  pub id: Id<DispensingMarker>,
  pub medication: String,
  pub quantity: i32,
  #[serde(rename = "type")]
  pub kind: String,
  pub delivered_at: NaiveDateTime,
  pub delivered_by: Option<String>,
}

impl Dispensing {
  /// Dispensing history for one patient, newest first. Ties on the
  /// timestamp fall back to id descending so replays stay stable.
  #[tracing::instrument(skip(patient_id), name = "db.query.dispensings.history")]
  pub async fn history(
    conn: &mut Connection,
    patient_id: Id<PatientMarker>,
  ) -> Result<Vec<HistoryEntry>> {
    sqlx::query_as::<_, HistoryEntry>(
      r#"SELECT d.id, d.medication, d.quantity, d.kind, d.delivered_at,
        u.name AS delivered_by
      FROM "dispensings" d
      LEFT JOIN "users" u ON u.id = d.delivered_by
      WHERE d.patient_id = $1
      ORDER BY d.delivered_at DESC, d.id DESC"#,
    )
    .bind(patient_id)
    .fetch_all(conn)
    .await
    .into_db_error()
  }
}

/// Ledger append that already went through form validation: the
/// quantity is a positive integer and the text fields are non-empty.
#[derive(Debug)]
pub struct InsertDispensing<'a> {
  pub patient_id: Id<PatientMarker>,
  pub medication: &'a str,
  pub quantity: i32,
  pub kind: &'a str,
  pub delivered_by: Option<Id<UserMarker>>,
}

impl InsertDispensing<'_> {
  #[tracing::instrument(skip_all, name = "db.query.dispensings.insert")]
  pub async fn create(&self, conn: &mut Connection) -> Result<Dispensing> {
    sqlx::query_as::<_, Dispensing>(
      r#"INSERT INTO "dispensings" (patient_id, medication, quantity, kind, delivered_by)
      VALUES ($1, $2, $3, $4, $5)
      RETURNING *"#,
    )
    .bind(self.patient_id)
    .bind(self.medication)
    .bind(self.quantity)
    .bind(self.kind)
    .bind(self.delivered_by)
    .fetch_one(conn)
    .await
    .into_db_error()
  }
}
