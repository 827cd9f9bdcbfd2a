use actix_web::{body::BoxBody, http::StatusCode, HttpResponse};
use error_stack::Report;
use serde::Serialize;

use super::Error;
use crate::{database, types::Error as ErrorType, types::validation::ValidateError};

#[derive(Serialize)]
struct ErrorBody<'a> {
  #[serde(flatten)]
  error: &'a ErrorType,
  message: String,
}

impl actix_web::ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self.error_type {
      ErrorType::Conflict => StatusCode::CONFLICT,
      ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
      ErrorType::InvalidFormBody(..) => StatusCode::BAD_REQUEST,
      ErrorType::NotFound => StatusCode::NOT_FOUND,
      ErrorType::ReadonlyMode => StatusCode::SERVICE_UNAVAILABLE,
      ErrorType::Unauthorized => StatusCode::UNAUTHORIZED,
    }
  }

  fn error_response(&self) -> HttpResponse<BoxBody> {
    // the report never leaves the process, the caller only gets the kind
    if matches!(self.error_type, ErrorType::Internal) {
      tracing::error!(report = ?self.report, trace = %self.trace, "request failed");
    }

    HttpResponse::build(self.status_code()).json(ErrorBody {
      error: &self.error_type,
      message: self.error_type.to_string(),
    })
  }
}

impl From<Report<database::Error>> for Error {
  fn from(value: Report<database::Error>) -> Self {
    use database::ErrorExt2;

    let error_type = if value.is_readonly() {
      ErrorType::ReadonlyMode
    } else if value.is_unique_violation() {
      ErrorType::Conflict
    } else if value.is_foreign_key_violation() {
      ErrorType::NotFound
    } else {
      ErrorType::Internal
    };
    Error::from_report(error_type, value)
  }
}

impl From<ValidateError> for Error {
  fn from(value: ValidateError) -> Self {
    #[derive(Debug, thiserror::Error)]
    #[error("Validation error occurred")]
    struct ValidationFailed;
    Error::from_context(ErrorType::InvalidFormBody(value), ValidationFailed)
  }
}
