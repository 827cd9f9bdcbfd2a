use actix_web::{
  web::{self, Json},
  HttpResponse,
};
use thiserror::Error as ThisError;

use crate::{
  http::{Actor, Error},
  schema::{InsertPatient, Patient},
  types::form::patients::register,
  types::validation::Validate,
  types::{Cpf, Error as ErrorType},
  App,
};

#[derive(Debug, ThisError)]
#[error("Attempt to register a patient with an already registered CPF")]
struct DuplicateCpf;

/// Registers a patient. The CPF is normalized and checksum-validated
/// before anything touches the database; the duplicate lookup here is
/// a fast path, the column's unique constraint settles races.
#[tracing::instrument(skip_all)]
pub async fn register(
  app: web::Data<App>,
  actor: Actor,
  form: Json<register::Request>,
) -> Result<HttpResponse, Error> {
  form.validate()?;

  // validate() already proved the checksum; parse only re-normalizes
  let cpf = Cpf::parse(&form.cpf)
    .map_err(|e| Error::from_context(ErrorType::Internal, e))?;

  let mut conn = app.db_write().await?;
  if Patient::by_cpf(&mut conn, &cpf).await?.is_some() {
    return Err(Error::from_context(ErrorType::Conflict, DuplicateCpf));
  }

  let patient = InsertPatient {
    name: form.name.trim(),
    cpf,
    is_hospital: form.is_hospital,
    sector: form.stored_sector(),
    created_by: form.created_by.or_else(|| actor.user_id()),
  }
  .create(&mut conn)
  .await?;

  Ok(HttpResponse::Created().json(patient))
}
