use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Form types implement this before their data is allowed to
/// touch the database.
pub trait Validate {
  fn validate(&self) -> Result<(), ValidateError>;
}

/// A tree of validation failures.
///
/// Leaves are lists of human-readable messages; branches map field
/// names to the failures below them. Serialized as-is into the
/// `invalid_form_body` wire error so a client can point at the exact
/// field to correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidateError {
  Messages(Vec<Cow<'static, str>>),
  Fields(BTreeMap<Cow<'static, str>, ValidateError>),
}

impl ValidateError {
  #[must_use]
  pub fn field_builder() -> FieldBuilder {
    FieldBuilder {
      fields: BTreeMap::new(),
    }
  }

  #[must_use]
  pub fn msg_builder() -> MsgBuilder {
    MsgBuilder {
      messages: Vec::new(),
    }
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    match self {
      Self::Messages(messages) => messages.is_empty(),
      Self::Fields(fields) => fields.is_empty(),
    }
  }
}

#[derive(Debug)]
pub struct FieldBuilder {
  fields: BTreeMap<Cow<'static, str>, ValidateError>,
}

impl FieldBuilder {
  pub fn insert(&mut self, field: impl Into<Cow<'static, str>>, error: ValidateError) {
    self.fields.insert(field.into(), error);
  }

  pub fn insert_msg(
    &mut self,
    field: impl Into<Cow<'static, str>>,
    message: impl Into<Cow<'static, str>>,
  ) {
    let mut contents = ValidateError::msg_builder();
    contents.insert(message);
    self.insert(field, contents.build());
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  #[must_use]
  pub fn build(self) -> ValidateError {
    ValidateError::Fields(self.fields)
  }

  /// Finishes the builder as a validation result: `Ok` when no
  /// field collected a failure.
  pub fn finish(self) -> Result<(), ValidateError> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(self.build())
    }
  }
}

#[derive(Debug)]
pub struct MsgBuilder {
  messages: Vec<Cow<'static, str>>,
}

impl MsgBuilder {
  pub fn insert(&mut self, message: impl Into<Cow<'static, str>>) {
    self.messages.push(message.into());
  }

  #[must_use]
  pub fn build(self) -> ValidateError {
    ValidateError::Messages(self.messages)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_finish_is_ok_when_nothing_collected() {
    assert_eq!(ValidateError::field_builder().finish(), Ok(()));
  }

  #[test]
  fn test_builders_nest_fields_and_messages() {
    let mut error = ValidateError::field_builder();
    error.insert_msg("name", "Name is required");

    let mut contents = ValidateError::msg_builder();
    contents.insert("Quantity must be a positive integer");
    error.insert("quantity", contents.build());

    let built = error.build();
    assert!(!built.is_empty());

    let json = serde_json::to_value(&built).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "name": ["Name is required"],
        "quantity": ["Quantity must be a positive integer"],
      })
    );
  }
}
