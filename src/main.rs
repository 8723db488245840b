//! Prisma Cloud Tables - Main application entry point

use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};

use prismacloud_tables::{
    Config,
    application::TableServiceImpl,
    infrastructure::ConnectionManager,
    init_tracing,
    presentation::{AppState, create_router},
    tables,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        Config::default()
    });

    init_tracing(&config.logging)?;

    tracing::info!("Starting Prisma Cloud tables server...");
    tracing::info!(
        "Configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    let plugin = Arc::new(tables::plugin()?);
    let connection = Arc::new(ConnectionManager::new(config.prismacloud.clone()));
    if !connection.has_credentials() {
        tracing::warn!(
            "Prisma Cloud credentials not configured; table queries will fail until url and token or username/password are provided"
        );
    }

    let table_service = Arc::new(TableServiceImpl::new(plugin.clone(), connection.clone()));
    tracing::info!(
        plugin = %plugin.name(),
        tables = ?plugin.list_table_names(),
        "Registered tables"
    );

    let app_state = AppState {
        table_service,
        connection,
    };

    let app = create_router(app_state, &config);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    tracing::info!("Server listening on {}", addr);
    if config.server.enable_docs {
        tracing::info!("API documentation available at http://{}/docs", addr);
    } else {
        tracing::info!("API documentation disabled (enable_docs=false)");
    }

    // Start server with graceful shutdown
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
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
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
