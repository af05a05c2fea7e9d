//! HTTP server lifecycle: storage setup, bind, serve, graceful shutdown.

use axum::ServiceExt;
use axum::extract::Request;
use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_app;
use crate::config::Settings;
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::state::AppState;

pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Starts the server and runs until a shutdown signal.
    ///
    /// # Errors
    /// - JWT configuration errors
    /// - Database pool or migration errors
    /// - Address binding errors
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = &self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            "Application starting"
        );
        tracing::info!(
            host = %settings.server.host,
            port = settings.server.port,
            request_timeout = settings.server.request_timeout,
            "Server configuration loaded"
        );
        tracing::info!(
            access_token_expiration = settings.jwt.access_token_expiration,
            refresh_token_expiration = settings.jwt.refresh_token_expiration,
            secret_configured = !settings.jwt.secret.is_empty(),
            "JWT configuration loaded"
        );

        settings.jwt.validate().map_err(|e| {
            tracing::error!(error = %e, "JWT configuration validation failed");
            anyhow::anyhow!("JWT configuration validation failed: {}", e)
        })?;

        let state = self.build_state().await?;
        let app = create_app(state, settings.server.request_timeout());

        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;
        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    async fn build_state(&self) -> anyhow::Result<AppState> {
        let database = &self.settings.database;
        let jwt = self.settings.jwt.clone();
        let pagination = self.settings.pagination.clone();

        if database.in_memory {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            return Ok(AppState::in_memory(jwt, pagination));
        }

        if database.auto_migrate {
            let applied = run_pending_migrations(database.url.clone()).await?;
            tracing::info!(count = applied.len(), migrations = ?applied, "Migrations applied");
        }

        tracing::info!(
            max_connections = database.max_connections,
            min_connections = database.min_connections,
            connection_timeout = database.connection_timeout,
            "Initializing database connection pool"
        );
        let pool = establish_async_connection_pool(database).await?;

        Ok(AppState::new(pool, jwt, pagination))
    }
}

/// Resolves on Ctrl+C or SIGTERM. A signal that cannot be installed is
/// logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
