use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder};

use crate::{
  database::{Connection, ErrorExt, Result},
  types::{
    cpf,
    id::{
      marker::{PatientMarker, UserMarker},
      Id,
    },
    Cpf,
  },
};

/// A registered patient. Immutable once registered; the CPF column
/// carries a `UNIQUE` constraint so concurrent duplicate registrations
/// lose cleanly at the database.
#[derive(Debug, FromRow, Serialize, PartialEq, Eq)]
pub struct Patient {
  pub id: Id<PatientMarker>,
  pub created_at: NaiveDateTime,
  pub name: String,
  pub cpf: Cpf,
  pub is_hospital: bool,
  pub sector: Option<String>,
  pub created_by: Option<Id<UserMarker>>,
}

/// One row of the patient list: the patient joined with how many
/// dispensing records point at it. Patients without any dispensing
/// appear with a count of zero.
#[derive(Debug, FromRow, Serialize, PartialEq, Eq)]
pub struct PatientSummary {
  pub id: Id<PatientMarker>,
  pub created_at: NaiveDateTime,
  pub name: String,
  pub cpf: Cpf,
  pub is_hospital: bool,
  pub sector: Option<String>,
  pub created_by: Option<Id<UserMarker>>,
  pub dispensing_count: i64,
}

/// Optional substring filters for the patient list. The CPF filter is
/// matched against the normalized digit string, so a formatted value
/// like `529.982` finds `529982...`.
#[derive(Debug, Default, Deserialize)]
pub struct PatientFilters {
  pub name: Option<String>,
  pub cpf: Option<String>,
  pub sector: Option<String>,
}

impl Patient {
  #[tracing::instrument(skip(id), fields(id = "<hidden>"))]
  pub async fn by_id(conn: &mut Connection, id: Id<PatientMarker>) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "patients" WHERE id = $1"#)
      .bind(id)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

  #[tracing::instrument(skip(cpf), fields(cpf = "<hidden>"))]
  pub async fn by_cpf(conn: &mut Connection, cpf: &Cpf) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "patients" WHERE cpf = $1"#)
      .bind(cpf)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

  /// Lists patients with their dispensing counts, optionally narrowed
  /// by the given substring filters.
  ///
  /// Canonical order: name ascending, ties broken by id ascending so
  /// the output is deterministic.
  #[tracing::instrument(skip_all, name = "db.query.patients.filter")]
  pub async fn filter(
    conn: &mut Connection,
    filters: &PatientFilters,
  ) -> Result<Vec<PatientSummary>> {
    let mut query = QueryBuilder::<sqlx::Postgres>::new(
      r#"SELECT p.id, p.created_at, p.name, p.cpf, p.is_hospital, p.sector, p.created_by,
        COUNT(d.id) AS dispensing_count
      FROM "patients" p
      LEFT JOIN "dispensings" d ON d.patient_id = p.id
      WHERE TRUE"#,
    );

    if let Some(name) = filters.name.as_deref() {
      query.push(" AND p.name LIKE ");
      query.push_bind(format!("%{name}%"));
    }

    if let Some(raw) = filters.cpf.as_deref() {
      query.push(" AND p.cpf LIKE ");
      query.push_bind(format!("%{}%", cpf::normalize(raw)));
    }

    if let Some(sector) = filters.sector.as_deref() {
      query.push(" AND p.sector LIKE ");
      query.push_bind(format!("%{sector}%"));
    }

    query.push(" GROUP BY p.id ORDER BY p.name ASC, p.id ASC");

    query
      .build_query_as::<PatientSummary>()
      .fetch_all(conn)
      .await
      .into_db_error()
  }
}

/// Registration data that already went through form validation:
/// the CPF is normalized and checksum-valid, and `sector` is `Some`
/// exactly when `is_hospital` is set.
#[derive(Debug)]
pub struct InsertPatient<'a> {
  pub name: &'a str,
  pub cpf: Cpf,
  pub is_hospital: bool,
  pub sector: Option<&'a str>,
  pub created_by: Option<Id<UserMarker>>,
}

impl InsertPatient<'_> {
  #[tracing::instrument(skip_all, name = "db.query.patients.insert")]
  pub async fn create(&self, conn: &mut Connection) -> Result<Patient> {
    sqlx::query_as::<_, Patient>(
      r#"INSERT INTO "patients" (name, cpf, is_hospital, sector, created_by)
      VALUES ($1, $2, $3, $4, $5)
      RETURNING *"#,
    )
    .bind(self.name)
    .bind(&self.cpf)
    .bind(self.is_hospital)
    .bind(self.sector)
    .bind(self.created_by)
    .fetch_one(conn)
    .await
    .into_db_error()
  }
}
