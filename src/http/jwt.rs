use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  config,
  http::{Error, IntoHttpError},
  types::id::{marker::UserMarker, Id},
  types::Error as ErrorType,
};

/// Session token claims. The token is the whole session: the server
/// keeps no session table, so "logout" is the client discarding it.
#[derive(Debug, Deserialize, Serialize)]
pub struct Jwt {
  pub iss: String,
  pub iat: i64,
  pub exp: i64,
  pub sub: Id<UserMarker>,
}

impl Jwt {
  pub const ISSUER: &'static str = "retirada";

  /// Long enough to cover a pharmacy shift with margin.
  const TTL_SECS: i64 = 60 * 60 * 12;

  #[tracing::instrument(skip_all)]
  pub fn encode(user_id: Id<UserMarker>, config: &config::Server) -> Result<String, Error> {
    #[derive(Debug, Error)]
    #[error("Failed to sign session token")]
    struct EncodeJwtError;

    let now = Utc::now().timestamp();
    let claims = Self {
      iss: Self::ISSUER.to_string(),
      iat: now,
      exp: now + Self::TTL_SECS,
      sub: user_id,
    };

    jsonwebtoken::encode(
      &Header::new(Algorithm::HS512),
      &claims,
      &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| error_stack::Report::new(e).change_context(EncodeJwtError))
    .into_http_error(ErrorType::Internal)
  }

  /// Decodes and verifies a token. Returns `None` for anything not
  /// worth distinguishing to the caller: bad signature, wrong issuer,
  /// expired session, malformed claims.
  #[tracing::instrument(skip_all)]
  pub fn decode(token: &str, config: &config::Server) -> Option<Self> {
    let mut validation = Validation::new(Algorithm::HS512);
    validation.set_issuer(&[Self::ISSUER]);

    jsonwebtoken::decode::<Self>(
      token,
      &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
      &validation,
    )
    .map(|data| data.claims)
    .ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config;

  fn test_config(secret: &str) -> config::Server {
    config::Server {
      ip: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
      port: 3000,
      workers: std::num::NonZeroUsize::new(1).unwrap(),
      jwt_secret: secret.into(),
      db: config::Database {
        primary: config::DbPoolConfig {
          readonly: false,
          min_idle: None,
          pool_size: std::num::NonZeroU32::new(1).unwrap(),
          url: "postgres://localhost/retirada".into(),
        },
        replica: None,
        enforce_tls: false,
        timeout_secs: std::num::NonZeroU64::new(5).unwrap(),
      },
    }
  }

  #[test]
  fn test_roundtrip() {
    let config = test_config("correct horse battery staple");
    let user_id = Id::new(7);

    let token = Jwt::encode(user_id, &config).unwrap();
    let claims = Jwt::decode(&token, &config).unwrap();
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.iss, Jwt::ISSUER);
  }

  #[test]
  fn test_rejects_wrong_secret_and_garbage() {
    let config = test_config("correct horse battery staple");
    let other = test_config("a completely different secret");

    let token = Jwt::encode(Id::new(7), &config).unwrap();
    assert!(Jwt::decode(&token, &other).is_none());
    assert!(Jwt::decode("not-a-token", &config).is_none());
  }
}
