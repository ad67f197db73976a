use anyhow::Context;
use portfolio_api::{
    config::Config,
    create_app,
    logging::{init_logging, log_server_ready, log_shutdown, log_startup_info, LogFormat},
    services::{database, S3MediaStore},
    AppState,
};
use std::{net::SocketAddr, sync::Arc};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LogFormat::detect())?;

    let config = Config::from_env()?;
    log_startup_info(&config);

    tracing::info!("Connecting to database...");
    let db = database::establish_connection(&config.database)
        .await
        .context("Database connection failed")?;

    if config.database.auto_schema {
        database::create_schema(&db)
            .await
            .context("Creating database schema failed")?;
    }

    let media = S3MediaStore::new(&config.s3)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("SERVER_HOST and SERVER_PORT do not form a socket address")?;

    let app_state = AppState::new(config, db, Arc::new(media));
    let app = create_app(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log_server_ready(&addr);

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    log_shutdown();
    result.map_err(Into::into)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
