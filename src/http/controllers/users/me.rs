use actix_web::HttpResponse;
use serde::Serialize;

use crate::{
  http::{Actor, Error},
  types::id::{marker::UserMarker, Id},
  util::Sensitive,
};

#[derive(Debug, Serialize)]
pub struct GetResponse {
  pub id: Id<UserMarker>,
  pub name: String,
  pub email: Sensitive<String>,
}

/// Who the presented session token belongs to; 401 without one.
#[tracing::instrument(skip_all)]
pub async fn me(actor: Actor) -> Result<HttpResponse, Error> {
  let user = actor.get_user()?;
  Ok(HttpResponse::Ok().json(GetResponse {
    id: user.id,
    name: user.name,
    email: user.email.into(),
  }))
}
