use actix_web::{
  web::{self, Json},
  HttpResponse,
};

use crate::{
  http::{Error, Jwt},
  schema::UpsertUser,
  types::form::users::login,
  types::validation::Validate,
  App,
};

/// Records the identity asserted by the external sign-in widget and
/// hands back a session token. Re-logins are idempotent; a changed
/// display name is picked up on the way.
#[tracing::instrument(skip_all)]
pub async fn login(
  app: web::Data<App>,
  form: Json<login::Request>,
) -> Result<HttpResponse, Error> {
  form.validate()?;

  let mut conn = app.db_write().await?;
  let user = UpsertUser {
    name: form.name.trim(),
    email: &form.email,
  }
  .create(&mut conn)
  .await?;
  drop(conn);

  let token = Jwt::encode(user.id, &app.config)?;
  Ok(HttpResponse::Ok().json(login::Response {
    id: user.id,
    name: user.name,
    email: user.email.into(),
    token: token.into(),
  }))
}
