use serde::Deserialize;

use crate::{
  types::{
    id::{marker::UserMarker, Id},
    validation::{Validate, ValidateError},
  },
  util::validation,
};

/// Dispensing event form. The patient comes from the request path;
/// the timestamp is never accepted from the client.
#[derive(Debug, Deserialize)]
pub struct Request {
  pub medication: String,
  pub quantity: i32,
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default)]
  pub delivered_by: Option<Id<UserMarker>>,
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut error = ValidateError::field_builder();

    if !validation::is_valid_text(&self.medication) {
      error.insert_msg("medication", "Medication is required");
    }

    if self.quantity <= 0 {
      error.insert_msg("quantity", "Quantity must be a positive integer");
    }

    if !validation::is_valid_text(&self.kind) {
      error.insert_msg("type", "Dispensing type is required");
    }

    error.finish()
  }
}
