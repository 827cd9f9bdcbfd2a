use serde::de::{Error as DeError, Unexpected};
use std::fmt::{Debug, Display};
use thiserror::Error;

/// Strips every character that is not a decimal ASCII digit,
/// preserving the digit order.
#[must_use]
pub fn normalize(input: &str) -> String {
  input.chars().filter(char::is_ascii_digit).collect()
}

/// Checks whether the given string holds a well-formed CPF, the Brazilian
/// individual taxpayer identifier.
///
/// Formatting separators are ignored, so `"529.982.247-25"` and
/// `"52998224725"` give the same answer. A CPF is rejected when its
/// normalized form is not exactly 11 digits long, when all 11 digits are
/// identical (sequences like `00000000000` pass the checksum but are not
/// issued), or when either of the two trailing check digits does not match
/// the modulo-11 checksum over the preceding digits.
#[must_use]
pub fn is_valid(input: &str) -> bool {
  let normalized = normalize(input);
  if normalized.len() != 11 {
    return false;
  }

  let digits: Vec<u8> = normalized.bytes().map(|b| b - b'0').collect();
  if digits.iter().all(|d| *d == digits[0]) {
    return false;
  }

  check_digit(&digits, 9) == digits[9] && check_digit(&digits, 10) == digits[10]
}

/// Computes the modulo-11 check digit over the first `len` digits.
///
/// Digit at index `i` is weighted by `len + 1 - i`, which gives the
/// 10..2 weight run for the first check digit (`len == 9`) and 11..2
/// for the second (`len == 10`). A remainder of 10 or 11 maps to 0.
fn check_digit(digits: &[u8], len: usize) -> u8 {
  let sum: u32 = digits
    .iter()
    .take(len)
    .enumerate()
    .map(|(i, d)| u32::from(*d) * (len as u32 + 1 - i as u32))
    .sum();

  let remainder = (sum * 10) % 11;
  if remainder >= 10 {
    0
  } else {
    remainder as u8
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("CPF did not pass the checksum validation")]
pub struct InvalidCpf;

/// A CPF that went through [`normalize`] and passed [`is_valid`].
///
/// This is the only form the rest of the crate accepts; registrations and
/// lookups never see raw user input.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
  pub fn parse(input: &str) -> Result<Self, InvalidCpf> {
    if is_valid(input) {
      Ok(Self(normalize(input)))
    } else {
      Err(InvalidCpf)
    }
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    &self.0
  }

  #[must_use]
  pub fn into_string(self) -> String {
    self.0
  }
}

impl Debug for Cpf {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    // identifiers are personal data, keep them out of logs
    f.write_str("Cpf(<hidden>)")
  }
}

impl Display for Cpf {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Display::fmt(&self.0, f)
  }
}

impl std::str::FromStr for Cpf {
  type Err = InvalidCpf;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl serde::Serialize for Cpf {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.0)
  }
}

impl<'de> serde::Deserialize<'de> for Cpf {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let raw = String::deserialize(deserializer)?;
    Cpf::parse(&raw)
      .map_err(|_| DeError::invalid_value(Unexpected::Str("<hidden>"), &"a checksum-valid CPF"))
  }
}

impl sqlx::Type<sqlx::Postgres> for Cpf {
  fn type_info() -> <sqlx::Postgres as sqlx::Database>::TypeInfo {
    <String as sqlx::Type<sqlx::Postgres>>::type_info()
  }

  fn compatible(ty: &<sqlx::Postgres as sqlx::Database>::TypeInfo) -> bool {
    <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
  }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Cpf {
  fn encode_by_ref(
    &self,
    buf: &mut <sqlx::Postgres as sqlx::database::HasArguments<'q>>::ArgumentBuffer,
  ) -> sqlx::encode::IsNull {
    <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0.as_str(), buf)
  }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Cpf {
  fn decode(
    value: <sqlx::Postgres as sqlx::database::HasValueRef<'r>>::ValueRef,
  ) -> Result<Self, sqlx::error::BoxDynError> {
    let value = <String as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
    Ok(Cpf::parse(&value)?)
  }
}
