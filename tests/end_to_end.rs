//! End-to-end tests against a live Postgres server.
//!
//! These only run when `DATABASE_URL` points at a reachable server the
//! test user can create databases on. Every test provisions its own
//! scratch database, runs the embedded migrations and drops the
//! database on the way out.

use actix_web::{
  http::StatusCode,
  test::{self, TestRequest},
  web,
};
use serde_json::{json, Value};
use sqlx::{Connection as _, PgConnection};
use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};
use std::time::{SystemTime, UNIX_EPOCH};

use retirada::{config, database::migrations::MIGRATOR, http, App};

struct TestDb {
  base_url: String,
  name: String,
}

impl TestDb {
  /// Creates a scratch database, or `None` when `DATABASE_URL` is not
  /// set (the test then skips itself).
  async fn create() -> Option<Self> {
    let Ok(base_url) = std::env::var("DATABASE_URL") else {
      eprintln!("DATABASE_URL is not set; skipping end-to-end test");
      return None;
    };

    let nanos = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .unwrap()
      .as_nanos();
    let name = format!("retirada_test_{nanos}");

    let mut conn = PgConnection::connect(&base_url).await.unwrap();
    sqlx::query(&format!(r#"CREATE DATABASE "{name}""#))
      .execute(&mut conn)
      .await
      .unwrap();

    let db = Self { base_url, name };
    let mut conn = PgConnection::connect(&db.url()).await.unwrap();
    MIGRATOR.run(&mut conn).await.unwrap();

    Some(db)
  }

  fn url(&self) -> String {
    let mut url = url::Url::parse(&self.base_url).unwrap();
    url.set_path(&self.name);
    url.to_string()
  }

  fn config(&self) -> config::Server {
    config::Server {
      ip: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
      port: 0,
      workers: NonZeroUsize::new(1).unwrap(),
      jwt_secret: "end-to-end-test-secret".into(),
      db: config::Database {
        primary: config::DbPoolConfig {
          readonly: false,
          min_idle: None,
          pool_size: NonZeroU32::new(2).unwrap(),
          url: self.url().into(),
        },
        replica: None,
        enforce_tls: false,
        timeout_secs: NonZeroU64::new(5).unwrap(),
      },
    }
  }

  async fn drop_db(self) {
    let mut conn = PgConnection::connect(&self.base_url).await.unwrap();
    sqlx::query(&format!(r#"DROP DATABASE "{}" WITH (FORCE)"#, self.name))
      .execute(&mut conn)
      .await
      .unwrap();
  }
}

async fn build_service(
  app: App,
) -> impl actix_web::dev::Service<
  actix_http::Request,
  Response = actix_web::dev::ServiceResponse,
  Error = actix_web::Error,
> {
  test::init_service(
    actix_web::App::new()
      .app_data(web::Data::new(app))
      .configure(http::controllers::configure),
  )
  .await
}

async fn login(
  service: &impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
  >,
  name: &str,
  email: &str,
) -> Value {
  let request = TestRequest::post()
    .uri("/users/login")
    .set_json(json!({ "name": name, "email": email }))
    .to_request();

  let response = test::call_service(service, request).await;
  assert_eq!(response.status(), StatusCode::OK);
  test::read_body_json(response).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_full_dispensing_flow() {
  let Some(db) = TestDb::create().await else {
    return;
  };
  let app = App::new(db.config()).await.unwrap();
  let service = build_service(app).await;

  // logging in twice keeps the id, picks up the new display name
  let first = login(&service, "Ana Costa", "ana@clinic.example").await;
  let again = login(&service, "Ana C. Costa", "ana@clinic.example").await;
  assert_eq!(first["id"], again["id"]);
  assert_eq!(again["name"], "Ana C. Costa");
  let token = again["token"].as_str().unwrap().to_string();

  // no token, no session
  let request = TestRequest::get().uri("/users/me").to_request();
  let response = test::call_service(&service, request).await;
  assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

  let request = TestRequest::get()
    .uri("/users/me")
    .insert_header(("Authorization", format!("Bearer {token}")))
    .to_request();
  let response = test::call_service(&service, request).await;
  assert_eq!(response.status(), StatusCode::OK);
  let body: Value = test::read_body_json(response).await;
  assert_eq!(body["name"], "Ana C. Costa");

  // outpatient registration stores the normalized CPF and no sector
  let request = TestRequest::post()
    .uri("/patients")
    .set_json(json!({
      "name": "Maria Silva",
      "cpf": "529.982.247-25",
    }))
    .to_request();
  let response = test::call_service(&service, request).await;
  assert_eq!(response.status(), StatusCode::CREATED);
  let maria: Value = test::read_body_json(response).await;
  assert_eq!(maria["cpf"], "52998224725");
  assert_eq!(maria["sector"], Value::Null);
  let maria_id = maria["id"].as_str().unwrap().to_string();

  // same CPF under different formatting is still a duplicate
  let request = TestRequest::post()
    .uri("/patients")
    .set_json(json!({
      "name": "Maria S.",
      "cpf": "52998224725",
    }))
    .to_request();
  let response = test::call_service(&service, request).await;
  assert_eq!(response.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(response).await;
  assert_eq!(body["type"], "conflict");

  let request = TestRequest::post()
    .uri("/patients")
    .set_json(json!({
      "name": "João Souza",
      "cpf": "111.444.777-35",
      "is_hospital": true,
      "sector": "Ala B",
    }))
    .to_request();
  let response = test::call_service(&service, request).await;
  assert_eq!(response.status(), StatusCode::CREATED);
  let joao: Value = test::read_body_json(response).await;
  assert_eq!(joao["sector"], "Ala B");

  // list comes out name-ascending with zero counts before any dispensing
  let request = TestRequest::get().uri("/patients").to_request();
  let response = test::call_service(&service, request).await;
  assert_eq!(response.status(), StatusCode::OK);
  let list: Value = test::read_body_json(response).await;
  let list = list.as_array().unwrap();
  assert_eq!(list.len(), 2);
  assert_eq!(list[0]["name"], "João Souza");
  assert_eq!(list[1]["name"], "Maria Silva");
  assert_eq!(list[0]["dispensing_count"], 0);

  // two withdrawals for Maria, authenticated so delivered_by resolves
  for (medication, quantity) in [("Paracetamol 750mg", 2), ("Dipirona 500mg", 1)] {
    let request = TestRequest::post()
      .uri(&format!("/patients/{maria_id}/dispensings"))
      .insert_header(("Authorization", format!("Bearer {token}")))
      .set_json(json!({
        "medication": medication,
        "quantity": quantity,
        "type": "oral",
      }))
      .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert!(body["delivered_at"].is_string());
    assert_eq!(body["type"], "oral");
  }

  // history is newest first and carries the deliverer's name
  let request = TestRequest::get()
    .uri(&format!("/patients/{maria_id}/dispensings"))
    .to_request();
  let response = test::call_service(&service, request).await;
  assert_eq!(response.status(), StatusCode::OK);
  let history: Value = test::read_body_json(response).await;
  let history = history.as_array().unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0]["medication"], "Dipirona 500mg");
  assert_eq!(history[1]["medication"], "Paracetamol 750mg");
  assert_eq!(history[0]["delivered_by"], "Ana C. Costa");

  // the list count caught up; João still has none
  let request = TestRequest::get().uri("/patients?cpf=529.982").to_request();
  let response = test::call_service(&service, request).await;
  let list: Value = test::read_body_json(response).await;
  let list = list.as_array().unwrap();
  assert_eq!(list.len(), 1);
  assert_eq!(list[0]["name"], "Maria Silva");
  assert_eq!(list[0]["dispensing_count"], 2);

  db.drop_db().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_rejects_invalid_forms() {
  let Some(db) = TestDb::create().await else {
    return;
  };
  let app = App::new(db.config()).await.unwrap();
  let service = build_service(app).await;

  let bad_patients = [
    json!({ "name": "", "cpf": "52998224725" }),
    json!({ "name": "Maria Silva", "cpf": "52998224724" }),
    json!({ "name": "Maria Silva", "cpf": "00000000000" }),
    json!({ "name": "João Souza", "cpf": "52998224725", "is_hospital": true }),
  ];
  for body in bad_patients {
    let request = TestRequest::post()
      .uri("/patients")
      .set_json(body)
      .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["type"], "invalid_form_body");
  }

  // the quantity check fires before the patient lookup does
  let request = TestRequest::post()
    .uri("/patients/1/dispensings")
    .set_json(json!({
      "medication": "Paracetamol 750mg",
      "quantity": 0,
      "type": "oral",
    }))
    .to_request();
  let response = test::call_service(&service, request).await;
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);

  db.drop_db().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_unknown_patient_is_not_found() {
  let Some(db) = TestDb::create().await else {
    return;
  };
  let app = App::new(db.config()).await.unwrap();
  let service = build_service(app).await;

  let request = TestRequest::post()
    .uri("/patients/999999/dispensings")
    .set_json(json!({
      "medication": "Paracetamol 750mg",
      "quantity": 1,
      "type": "oral",
    }))
    .to_request();
  let response = test::call_service(&service, request).await;
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(response).await;
  assert_eq!(body["type"], "not_found");

  let request = TestRequest::get()
    .uri("/patients/999999/dispensings")
    .to_request();
  let response = test::call_service(&service, request).await;
  assert_eq!(response.status(), StatusCode::NOT_FOUND);

  db.drop_db().await;
}
