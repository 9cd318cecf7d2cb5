//! wardend - Warden Daemon
//!
//! Automated moderation for a voice server's query interface.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wardend::config::{validate, Config, Key};
use wardend::link::{ControlLink, QuerySession, SessionContext};
use wardend::plugins::{self, Plugin};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "wardend.properties".to_string());

    let config = Config::bootstrap(Path::new(&config_path)).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;
    let Some(config) = config else {
        // First run: the operator has to fill in the credentials first.
        info!(path = %config_path, "Wrote default configuration; edit it and start again");
        return Ok(());
    };

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration failed validation ({} errors)", errors.len());
    }

    let host = config.str(Key::ServerHost)?.to_string();
    let query_port = u16::try_from(config.int(Key::QueryPort)?)
        .context("query.port out of range")?;

    info!(host = %host, port = query_port, "Starting wardend");

    let (session, events) = QuerySession::connect(&host, query_port)
        .await
        .context("failed to reach the query interface")?;

    session
        .login(
            config.str(Key::QueryUsername)?,
            config.str(Key::QueryPassword)?,
        )
        .await
        .context("authentication failed")?;
    session
        .select_server(config.int(Key::ServerPort)?, config.str(Key::BotUsername)?)
        .await
        .context("failed to select the virtual server")?;
    session.register_events().await?;

    let (own_id, _) = session.whoami().await?;
    let ctx = SessionContext {
        own_id,
        home_channel: config.int(Key::BotChannel)?,
    };
    info!(clid = own_id, "Session established");

    let config = Arc::new(config);
    let link: Arc<dyn ControlLink> = Arc::new(session);

    let loaded = plugins::build(&config, &link, ctx)?;
    info!(count = loaded.len(), "Plugins loaded");
    for plugin in &loaded {
        // A failed startup sweep degrades to event-driven tracking.
        if let Err(e) = plugin.start().await {
            warn!(plugin = plugin.name(), error = %e, "Startup sweep failed");
        }
    }

    tokio::select! {
        _ = plugins::dispatch(&loaded, events) => {
            anyhow::bail!("control connection lost");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
