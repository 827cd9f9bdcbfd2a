use actix_web::HttpResponse;
use serde_json::json;

use crate::http::Error;

/// Sessions live entirely in the token, so there is nothing to tear
/// down server-side; the endpoint exists so clients have a single
/// place to end a session regardless of how it is stored.
#[tracing::instrument(skip_all)]
pub async fn logout() -> Result<HttpResponse, Error> {
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
  })))
}
