//! Backend entry-point: loads settings, selects adapters, and serves the API.

mod server;

use std::io;
use std::net::SocketAddr;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use edunexus::inbound::http::health::HealthState;
use edunexus::inbound::http::session_config::{BuildMode, session_settings_from_env};
use edunexus::settings::AppSettings;

use server::{Runtime, ServerConfig, build_runtime, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| io::Error::other(err.to_string()))?;
    let bind_addr: SocketAddr = settings.bind_addr().parse().map_err(|err| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid bind address {}: {err}", settings.bind_addr()),
        )
    })?;

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    info!(
        fingerprint = %session.key_fingerprint(),
        cookie = %session.cookie_name,
        "session key loaded"
    );

    let Runtime {
        services,
        mail_task,
    } = build_runtime(&settings).await?;
    let notifier = services.coupon_expiry;
    let expiry_task = tokio::spawn(async move { notifier.run().await });

    let config = ServerConfig::new(session, bind_addr);
    info!(addr = %config.bind_addr(), "starting HTTP server");
    let health_state = web::Data::new(HealthState::new());
    let result = create_server(health_state, services.http, config)?.await;

    expiry_task.abort();
    mail_task.abort();
    info!("server stopped");
    result
}
