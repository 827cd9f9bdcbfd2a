use serde::Deserialize;

use crate::{
  types::{
    cpf,
    id::{marker::UserMarker, Id},
    validation::{Validate, ValidateError},
  },
  util::validation,
};

/// Patient registration form.
///
/// `sector` must accompany `is_hospital`; for outpatients any sector
/// value is discarded before the insert so the stored row keeps the
/// sector-iff-hospital rule.
#[derive(Debug, Deserialize)]
pub struct Request {
  pub name: String,
  pub cpf: String,
  #[serde(default)]
  pub is_hospital: bool,
  #[serde(default)]
  pub sector: Option<String>,
  #[serde(default)]
  pub created_by: Option<Id<UserMarker>>,
}

impl Request {
  /// Sector as it should be persisted: trimmed, and only present
  /// for hospital-affiliated patients.
  #[must_use]
  pub fn stored_sector(&self) -> Option<&str> {
    if !self.is_hospital {
      return None;
    }
    self
      .sector
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
  }
}

impl Validate for Request {
  fn validate(&self) -> Result<(), ValidateError> {
    let mut error = ValidateError::field_builder();

    if !validation::is_valid_text(&self.name) {
      error.insert_msg("name", "Name is required");
    }

    if self.cpf.trim().is_empty() {
      error.insert_msg("cpf", "CPF is required");
    } else if !cpf::is_valid(&self.cpf) {
      error.insert_msg("cpf", "CPF is invalid. Check the digits and try again");
    }

    if self.is_hospital && self.stored_sector().is_none() {
      error.insert_msg("sector", "Sector is required for hospital patients");
    }

    error.finish()
  }
}
