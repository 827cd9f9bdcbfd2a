use actix_web::{
  web::{self, Query},
  HttpResponse,
};

use crate::{http::Error, schema::Patient, schema::PatientFilters, App};

/// Lists patients with their dispensing counts. Filters narrow by
/// substring; an absent filter matches everything.
#[tracing::instrument(skip_all)]
pub async fn list(
  app: web::Data<App>,
  filters: Query<PatientFilters>,
) -> Result<HttpResponse, Error> {
  let mut conn = app.db_read().await?;
  let patients = Patient::filter(&mut conn, &filters).await?;
  Ok(HttpResponse::Ok().json(patients))
}
