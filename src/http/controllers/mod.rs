use actix_web::web;

pub mod patients;
pub mod users;

pub fn configure(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/users")
      .route("/login", web::post().to(users::login))
      .route("/logout", web::post().to(users::logout))
      .route("/me", web::get().to(users::me)),
  );
  cfg.service(
    web::scope("/patients")
      .route("", web::post().to(patients::register))
      .route("", web::get().to(patients::list))
      .route("/{id}/dispensings", web::post().to(patients::dispense))
      .route("/{id}/dispensings", web::get().to(patients::history)),
  );
}
