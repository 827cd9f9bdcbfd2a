use actix_web::{web, HttpServer};
use clap::Parser;
use error_stack::{Result, ResultExt};
use std::net::IpAddr;
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use retirada::{config, database, http, App};

#[derive(Debug, Error)]
#[error("Failed to start the HTTP server")]
pub struct StartServerError;

/// Expose the retirada HTTP API
#[derive(Debug, Parser)]
pub struct ServerCommand {
    #[clap(long)]
    pub address: Option<IpAddr>,
    #[clap(long)]
    pub port: Option<u16>,
    #[clap(long)]
    pub workers: Option<NonZeroUsize>,
}

pub fn run(args: ServerCommand) -> Result<(), StartServerError> {
    let mut config = config::Server::load().change_context(StartServerError)?;
    args.override_config(&mut config);

    init_tracing();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .change_context(StartServerError)
        .attach_printable("could not build tokio runtime")?
        .block_on(start(config))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_error::ErrorLayer::default())
        .init();
}

async fn start(config: config::Server) -> Result<(), StartServerError> {
    let app = App::new(config).await.change_context(StartServerError)?;

    let mut conn = app.db_write().await.change_context(StartServerError)?;
    database::migrations::run_pending(&mut conn)
        .await
        .change_context(StartServerError)?;
    drop(conn);

    let addr = (app.config.ip, app.config.port);
    let workers = app.config.workers.get();
    tracing::info!("Starting HTTP server at http://{}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        actix_web::App::new()
            .app_data(web::Data::new(app.clone()))
            .wrap(TracingLogger::<http::util::QuieterRootSpanBuilder>::new())
            .configure(http::controllers::configure)
    })
    .workers(workers)
    .bind(addr)
    .change_context(StartServerError)
    .attach_printable("could not bind to the configured address")?
    .run()
    .await
    .change_context(StartServerError)
}

impl ServerCommand {
    fn override_config(&self, config: &mut config::Server) {
        // override server configurations if set by the cli
        if let Some(address) = self.address {
            config.ip = address;
        }

        if let Some(port) = self.port {
            config.port = port;
        }

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
    }
}
