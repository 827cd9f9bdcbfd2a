use error_stack::ResultExt;
use sqlx::migrate::Migrator;
use thiserror::Error;
use tokio::time::Instant;
use tracing::info;

use super::Connection;

/// Schema migrations embedded from the `migrations/` directory
/// at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Error)]
#[error("Failed to perform database migrations")]
pub struct MigrationError;

#[tracing::instrument(skip_all, name = "db.migrations.run_pending")]
pub async fn run_pending(conn: &mut Connection) -> error_stack::Result<(), MigrationError> {
  let now = Instant::now();
  info!("Performing database migrations... (this may take a while)");

  MIGRATOR
    .run(&mut *conn)
    .await
    .change_context(MigrationError)?;

  let elapsed = now.elapsed();
  info!("Successfully performed database migrations! took {elapsed:.2?}");

  Ok(())
}
