use once_cell::sync::Lazy;
use serde::de::{Error as DeError, Unexpected};
use std::{
  fmt::{Debug, Display},
  hash::Hash,
  marker::PhantomData,
  num::NonZeroI64,
};
use thiserror::Error;

use self::marker::Marker;

pub mod marker;

/// A database row identifier tagged with the table it belongs to.
///
/// The store hands out `BIGSERIAL` values, so the inner value is a
/// positive [`NonZeroI64`]; the marker only exists at the type level
/// to keep patient and user ids from being mixed up.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Id<T: Marker> {
  value: NonZeroI64,
  phantom: PhantomData<T>,
}

impl<T: Marker> Id<T> {
  /// # Panics
  ///
  /// It will panic if the value is not positive.
  #[must_use]
  #[track_caller]
  pub const fn new(n: i64) -> Self {
    if let Some(id) = Self::new_checked(n) {
      id
    } else {
      panic!("value is not positive")
    }
  }

  /// Creates an ID from a [`NonZeroI64`] value.
  #[must_use]
  pub const fn from_nonzero(n: NonZeroI64) -> Self {
    Self {
      value: n,
      phantom: PhantomData,
    }
  }

  #[must_use]
  pub const fn new_checked(n: i64) -> Option<Self> {
    if n < 0 {
      return None;
    }
    if let Some(n) = NonZeroI64::new(n) {
      Some(Self::from_nonzero(n))
    } else {
      None
    }
  }

  #[must_use]
  pub const fn get(self) -> i64 {
    self.value.get()
  }

  #[must_use]
  pub const fn into_nonzero(self) -> NonZeroI64 {
    self.value
  }
}

impl<T: Marker> Debug for Id<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use heck::ToSnakeCase;
    static MARKER_MODULE: Lazy<String> = Lazy::new(|| {
      format!(
        "{}::types::id::marker::",
        env!("CARGO_PKG_NAME").to_snake_case()
      )
    });

    // This is to assume that all ID markers are defined in `marker` module
    let type_name = std::any::type_name::<T>();
    let type_name = if type_name.starts_with(&*MARKER_MODULE) {
      type_name.split("::").last().unwrap_or(type_name)
    } else {
      type_name
    };
    write!(f, "Id::<{type_name}>({})", self.value.get())
  }
}

impl<T: Marker> Display for Id<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Display::fmt(&self.value.get(), f)
  }
}

impl<T: Marker> Hash for Id<T> {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    state.write_i64(self.value.get());
  }
}

impl<'de, T: Marker> serde::Deserialize<'de> for Id<T> {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    struct Visitor<T: Marker>(PhantomData<T>);

    impl<'de, T: Marker> serde::de::Visitor<'de> for Visitor<T> {
      type Value = Id<T>;

      fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a positive row id")
      }

      fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
      where
        E: DeError,
      {
        let value = i64::try_from(v)
          .map_err(|_| DeError::invalid_value(Unexpected::Unsigned(v), &"positive i64"))?;

        self.visit_i64(value)
      }

      fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
      where
        E: DeError,
      {
        Id::<T>::new_checked(v)
          .ok_or_else(|| DeError::invalid_value(Unexpected::Signed(v), &"positive i64"))
      }

      fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
      where
        E: DeError,
      {
        let value = v.parse().map_err(|_| {
          let unexpected = Unexpected::Str(v);
          DeError::invalid_value(unexpected, &"positive i64 string")
        })?;

        self.visit_i64(value)
      }
    }

    deserializer.deserialize_any(Visitor(PhantomData))
  }
}

impl<T: Marker> serde::Serialize for Id<T> {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    let value = self.value.get().to_string();
    serializer.collect_str(&value)
  }
}

impl<'q, T: Marker> sqlx::Encode<'q, sqlx::Postgres> for Id<T> {
  fn encode_by_ref(
    &self,
    buf: &mut <sqlx::Postgres as sqlx::database::HasArguments<'q>>::ArgumentBuffer,
  ) -> sqlx::encode::IsNull {
    <i64 as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.value.get(), buf)
  }
}

impl<'r, T: Marker> sqlx::Decode<'r, sqlx::Postgres> for Id<T> {
  fn decode(
    value: <sqlx::Postgres as sqlx::database::HasValueRef<'r>>::ValueRef,
  ) -> Result<Self, sqlx::error::BoxDynError> {
    #[derive(Debug, Error)]
    #[error("all IDs must be positive")]
    struct NonPositiveIdError;

    let value = <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
    if let Some(id) = Id::new_checked(value) {
      Ok(id)
    } else {
      Err(Box::new(NonPositiveIdError))
    }
  }
}

impl<T: Marker> sqlx::Type<sqlx::Postgres> for Id<T> {
  fn type_info() -> <sqlx::Postgres as sqlx::Database>::TypeInfo {
    <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
  }

  fn compatible(ty: &<sqlx::Postgres as sqlx::Database>::TypeInfo) -> bool {
    <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
  }
}

#[cfg(test)]
mod tests {
  use super::marker::PatientMarker;
  use super::*;

  #[test]
  fn test_rejects_non_positive_values() {
    assert!(Id::<PatientMarker>::new_checked(0).is_none());
    assert!(Id::<PatientMarker>::new_checked(-3).is_none());
    assert!(Id::<PatientMarker>::new_checked(7).is_some());
  }

  #[test]
  fn test_serializes_as_string() {
    let id = Id::<PatientMarker>::new(42);
    assert_eq!(serde_json::to_string(&id).unwrap(), r#""42""#);
  }

  #[test]
  fn test_deserializes_from_string_and_number() {
    let from_str: Id<PatientMarker> = serde_json::from_str(r#""42""#).unwrap();
    let from_num: Id<PatientMarker> = serde_json::from_str("42").unwrap();
    assert_eq!(from_str, from_num);

    assert!(serde_json::from_str::<Id<PatientMarker>>("0").is_err());
    assert!(serde_json::from_str::<Id<PatientMarker>>("-1").is_err());
  }
}
