use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::validation::ValidateError;

/// The error kinds this API reports to its callers.
///
/// The request layer maps each kind to a transport status code; the
/// serialized form carries a `type` tag plus, for form failures, the
/// per-field messages.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Error {
  /// Duplicate CPF at patient registration.
  Conflict,
  Internal,
  InvalidFormBody(ValidateError),
  NotFound,
  ReadonlyMode,
  Unauthorized,
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Error::Conflict => f.write_str("A patient is already registered with this CPF"),
      Error::Internal => f.write_str("Failed to perform request"),
      Error::InvalidFormBody(..) => f.write_str("User performed request with invalid body"),
      Error::NotFound => f.write_str("Requested resource was not found"),
      Error::ReadonlyMode => f.write_str("Attempt to write into a read-only database"),
      Error::Unauthorized => f.write_str("An active session is required"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_test::Token;

  #[track_caller]
  fn assert_unit_variant(value: Error, variant: &'static str) {
    serde_test::assert_tokens(
      &value,
      &[
        Token::Struct {
          name: "Error",
          len: 1,
        },
        Token::Str("type"),
        Token::Str(variant),
        Token::StructEnd,
      ],
    );
  }

  #[test]
  fn test_serde_impl() {
    assert_unit_variant(Error::Conflict, "conflict");
    assert_unit_variant(Error::Internal, "internal");
    assert_unit_variant(Error::NotFound, "not_found");
    assert_unit_variant(Error::ReadonlyMode, "readonly_mode");
    assert_unit_variant(Error::Unauthorized, "unauthorized");
  }

  #[test]
  fn test_form_errors_carry_their_fields() {
    let mut error = ValidateError::field_builder();
    error.insert_msg("cpf", "CPF is invalid");

    let json = serde_json::to_value(Error::InvalidFormBody(error.build())).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "type": "invalid_form_body",
        "cpf": ["CPF is invalid"],
      })
    );
  }
}
