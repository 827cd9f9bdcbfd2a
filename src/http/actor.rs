use actix_web::{http::header, web, FromRequest};
use futures::future::{ready, LocalBoxFuture};
use thiserror::Error;

use crate::{
  schema::User,
  types::id::{marker::UserMarker, Id},
  App,
};

use super::{Error, Jwt};

/// Who is performing the request. Anything short of a verifiable
/// session token (missing header, bad signature, expired, user row
/// gone) degrades to [`Actor::Anonymous`]; operations that need a
/// user reject it with an unauthorized error at the call site.
#[derive(Debug)]
pub enum Actor {
  Anonymous,
  User(User),
}

impl Actor {
  pub fn get_user(self) -> Result<User, Error> {
    #[derive(Debug, Error)]
    #[error("Attempt to access user-only route")]
    struct Unauthorized;
    match self {
      Self::User(n) => Ok(n),
      Self::Anonymous => Err(Error::from_context(
        crate::types::Error::Unauthorized,
        Unauthorized,
      )),
    }
  }

  /// The acting user's id, if any. Used to default the `created_by`
  /// and `delivered_by` references.
  #[must_use]
  pub fn user_id(&self) -> Option<Id<UserMarker>> {
    match self {
      Self::User(user) => Some(user.id),
      Self::Anonymous => None,
    }
  }
}

impl FromRequest for Actor {
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(
    req: &actix_web::HttpRequest,
    _payload: &mut actix_web::dev::Payload,
  ) -> Self::Future {
    let token = req
      .headers()
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token {
      let Some(app) = req.app_data::<web::Data<App>>() else {
        #[derive(Debug, Error)]
        #[error("The web app has no available configuration")]
        struct NoConfig;
        return Box::pin(ready(Err(Error::from_context(
          crate::types::Error::Internal,
          NoConfig,
        ))));
      };

      let app = app.clone();
      let jwt = Jwt::decode(token, &app.config);
      Box::pin(async move {
        let Some(jwt) = jwt else {
          return Ok(Actor::Anonymous);
        };

        let mut conn = app.db_read_prefer_primary().await?;
        if let Some(user) = User::by_id(&mut conn, jwt.sub).await? {
          Ok(Actor::User(user))
        } else {
          Ok(Actor::Anonymous)
        }
      })
    } else {
      Box::pin(ready(Ok(Actor::Anonymous)))
    }
  }
}
