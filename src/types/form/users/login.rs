use serde::{Deserialize, Serialize};

use crate::{
  types::{
    id::{marker::UserMarker, Id},
    validation::{Validate, ValidateError},
  },
  util::{validation, Sensitive},
};

/// Identity assertion relayed from the external sign-in widget. The
/// provider already verified the credentials; the server only records
/// who signed in and hands back a session token.
#[derive(Debug, Deserialize, Serialize)]
pub struct Request {
  pub name: String,
  pub email: Sensitive<String>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut error = ValidateError::field_builder();

    if !validation::is_valid_text(&self.name) {
      error.insert_msg("name", "Name is required");
    }

    if !validation::is_valid_email(&self.email) {
      error.insert_msg("email", "E-mail address is not valid");
    }

    error.finish()
  }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
  pub id: Id<UserMarker>,
  pub name: String,
  pub email: Sensitive<String>,
  pub token: Sensitive<String>,
}
