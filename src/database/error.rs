use error_stack::Report;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Database related errors
#[derive(Debug, Error)]
pub enum Error {
  /// An error caused by an invalid Postgres connection
  /// url for either the primary or the replica pool.
  #[error("invalid connection url")]
  InvalidUrl,
  /// An error caused by an [`sqlx`] error.
  #[error("received a pool error: {0}")]
  Internal(sqlx::Error),
  /// A row insert lost against a `UNIQUE` constraint. The patient
  /// CPF column relies on this as the source of truth for duplicate
  /// detection; the application-level pre-check is a fast path only.
  #[error("unique constraint violation")]
  UniqueViolation,
  /// A row insert referenced a parent row that does not exist
  /// (e.g. a dispensing against a deleted-in-flight patient).
  #[error("foreign key constraint violation")]
  ForeignKeyViolation,
  /// The pool is connected to a database in read-only mode
  /// (a replica, or a primary under maintenance) and was asked
  /// to perform a write.
  #[error("database is currently in read mode")]
  Readonly,
  /// Either the primary or replica database pools do not
  /// have reliable connection to transact to the database.
  #[error("unhealthy database pool")]
  UnhealthyPool,
}

/// Converts from a generic [sqlx] result into a [database compatible error](Error).
pub trait ErrorExt<T> {
  fn into_db_error(self) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, sqlx::Error> {
  fn into_db_error(self) -> Result<T> {
    self.map_err(|e| match &e {
      sqlx::Error::Database(err) if err.message().ends_with("read-only transaction") => {
        Report::new(e).change_context(Error::Readonly)
      }
      sqlx::Error::Database(err) if matches!(err.kind(), ErrorKind::UniqueViolation) => {
        Report::new(e).change_context(Error::UniqueViolation)
      }
      sqlx::Error::Database(err) if matches!(err.kind(), ErrorKind::ForeignKeyViolation) => {
        Report::new(e).change_context(Error::ForeignKeyViolation)
      }
      _ => Report::new(Error::Internal(e)),
    })
  }
}

/// Lazily typed [`std::result::Result`] but the error generic
/// is filled up with [a database error](Error).
pub type Result<T> = error_stack::Result<T, Error>;

/// Shorthand checks against `error_stack::Report<Error>` so callers do
/// not have to spell out the `downcast_ref` dance on every branch.
pub trait ErrorExt2 {
  fn is_unhealthy(&self) -> bool;
  fn is_readonly(&self) -> bool;
  fn is_unique_violation(&self) -> bool;
  fn is_foreign_key_violation(&self) -> bool;
}

impl ErrorExt2 for error_stack::Report<Error> {
  fn is_unhealthy(&self) -> bool {
    self
      .downcast_ref::<Error>()
      .map(|v| matches!(v, Error::UnhealthyPool))
      .unwrap_or_default()
  }

  fn is_readonly(&self) -> bool {
    self
      .downcast_ref::<Error>()
      .map(|v| matches!(v, Error::Readonly))
      .unwrap_or_default()
  }

  fn is_unique_violation(&self) -> bool {
    self
      .downcast_ref::<Error>()
      .map(|v| matches!(v, Error::UniqueViolation))
      .unwrap_or_default()
  }

  fn is_foreign_key_violation(&self) -> bool {
    self
      .downcast_ref::<Error>()
      .map(|v| matches!(v, Error::ForeignKeyViolation))
      .unwrap_or_default()
  }
}
