use actix_web::{
  web::{self, Json, Path},
  HttpResponse,
};
use thiserror::Error as ThisError;

use crate::{
  http::{Actor, Error},
  schema::{InsertDispensing, Patient},
  types::form::patients::dispense,
  types::id::{marker::PatientMarker, Id},
  types::validation::Validate,
  types::Error as ErrorType,
  App,
};

#[derive(Debug, ThisError)]
#[error("Attempt to dispense medication to an unknown patient")]
struct UnknownPatient;

/// Appends one withdrawal to a patient's ledger. The row's timestamp
/// is assigned by the database, not taken from the request.
#[tracing::instrument(skip_all)]
pub async fn dispense(
  app: web::Data<App>,
  actor: Actor,
  path: Path<Id<PatientMarker>>,
  form: Json<dispense::Request>,
) -> Result<HttpResponse, Error> {
  form.validate()?;
  let patient_id = path.into_inner();

  let mut conn = app.db_write().await?;
  if Patient::by_id(&mut conn, patient_id).await?.is_none() {
    return Err(Error::from_context(ErrorType::NotFound, UnknownPatient));
  }

  let dispensing = InsertDispensing {
    patient_id,
    medication: form.medication.trim(),
    quantity: form.quantity,
    kind: form.kind.trim(),
    delivered_by: form.delivered_by.or_else(|| actor.user_id()),
  }
  .create(&mut conn)
  .await?;

  Ok(HttpResponse::Created().json(dispensing))
}
