//! # TaskQuest API Server
//!
//! Owner-scoped REST API for tasks, daily to-do lists, points tables and
//! progress trackers, with JWT authentication.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskquest \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p taskquest-api
//! ```
//!
//! Set `LOG_FORMAT=json` for JSON log lines.

use std::sync::Arc;

use taskquest_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskquest_shared::{
    db::{migrations, pool},
    mailer::LogMailer,
    models::auth_token::AuthToken,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskquest_api=debug,taskquest_shared=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "TaskQuest API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    if config.run_migrations {
        migrations::ensure_database_exists(&config.database.url).await?;
    }

    let db = pool::create_pool(config.pool_config()).await?;

    if config.run_migrations {
        migrations::run_migrations(&db).await?;
    }

    let purged = AuthToken::purge_expired(&db, config.auth_token_ttl()).await?;
    if purged > 0 {
        tracing::info!(purged, "Removed expired email tokens");
    }

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config, Arc::new(LogMailer));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}
