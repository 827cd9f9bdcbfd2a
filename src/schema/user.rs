use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::{
  database::{Connection, ErrorExt, Result},
  types::id::{marker::UserMarker, Id},
};

/// An account mirrored from the external identity provider on first
/// sign-in. The provider verifies credentials; this table only records
/// who acted. Rows are never deleted.
#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct User {
  pub id: Id<UserMarker>,
  pub created_at: NaiveDateTime,
  pub name: String,
  pub email: String,
}

impl User {
  #[tracing::instrument(skip(id), fields(id = "<hidden>"))]
  pub async fn by_id(conn: &mut Connection, id: Id<UserMarker>) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE id = $1"#)
      .bind(id)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

}

/// Login upsert keyed by e-mail: the first sign-in creates the row,
/// later sign-ins refresh the display name when the provider reports
/// a new one. Idempotent by construction.
#[derive(Debug)]
pub struct UpsertUser<'a> {
  pub name: &'a str,
  pub email: &'a str,
}

impl UpsertUser<'_> {
  #[tracing::instrument(skip_all, name = "db.query.users.upsert")]
  pub async fn create(&self, conn: &mut Connection) -> Result<User> {
    sqlx::query_as::<_, User>(
      r#"INSERT INTO "users" (name, email)
      VALUES ($1, $2)
      ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
      RETURNING *"#,
    )
    .bind(self.name)
    .bind(self.email)
    .fetch_one(conn)
    .await
    .into_db_error()
  }
}
