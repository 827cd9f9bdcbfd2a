use actix_web::{
  web::{self, Path},
  HttpResponse,
};
use thiserror::Error as ThisError;

use crate::{
  http::Error,
  schema::{Dispensing, Patient},
  types::id::{marker::PatientMarker, Id},
  types::Error as ErrorType,
  App,
};

#[derive(Debug, ThisError)]
#[error("Attempt to read the history of an unknown patient")]
struct UnknownPatient;

/// Per-patient dispensing history, newest first.
#[tracing::instrument(skip_all)]
pub async fn history(
  app: web::Data<App>,
  path: Path<Id<PatientMarker>>,
) -> Result<HttpResponse, Error> {
  let patient_id = path.into_inner();

  let mut conn = app.db_read().await?;
  if Patient::by_id(&mut conn, patient_id).await?.is_none() {
    return Err(Error::from_context(ErrorType::NotFound, UnknownPatient));
  }

  let entries = Dispensing::history(&mut conn, patient_id).await?;
  Ok(HttpResponse::Ok().json(entries))
}
