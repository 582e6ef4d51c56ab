//! Backend entry-point: resolves the datastore, wires the HTTP endpoints and
//! serves them until shutdown.

mod server;

use std::ffi::OsString;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use hello_assistant::inbound::http::health::HealthState;
use hello_assistant::outbound::gemini::AssistantSettings;
use hello_assistant::outbound::persistence::{BuildMode, Datastore, database_settings_from_env};
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = [OsString::from("hello-assistant")];
    let server_settings = ServerSettings::load_from_iter(args.clone())
        .map_err(|e| std::io::Error::other(format!("server settings: {e}")))?;
    let assistant_settings = AssistantSettings::load_from_iter(args)
        .map_err(|e| std::io::Error::other(format!("assistant settings: {e}")))?;

    let database_settings =
        database_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .map_err(std::io::Error::other)?;
    let datastore = Datastore::connect(&database_settings)
        .await
        .map_err(std::io::Error::other)?;

    let bind_addr = server_settings.bind_addr()?;
    let config =
        ServerConfig::new(bind_addr, assistant_settings).with_db_pool(datastore.pool().clone());
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), &config)?;
    info!(%bind_addr, "server listening");

    let result = server.await;
    health_state.mark_unhealthy();
    if let Err(e) = datastore.shutdown().await {
        warn!(error = %e, "datastore shutdown failed");
    }
    result
}
