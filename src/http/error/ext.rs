use error_stack::{Context, Report};

use super::Error;
use crate::types;

/// Attaches a wire error kind to any `error_stack` result, turning it
/// into a request-level failure.
pub trait IntoHttpError<T> {
  fn into_http_error(self, error_type: types::Error) -> super::Result<T>;
}

impl<T, C: Context> IntoHttpError<T> for std::result::Result<T, Report<C>> {
  fn into_http_error(self, error_type: types::Error) -> super::Result<T> {
    self.map_err(|report| Error::from_report(error_type, report))
  }
}
