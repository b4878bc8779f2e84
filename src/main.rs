use std::net::TcpListener;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use streamhub_auth::configuration::get_configuration;
use streamhub_auth::media::MediaClient;
use streamhub_auth::startup::run;
use streamhub_auth::store::PgUserStore;
use streamhub_auth::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let connection_string = configuration.database.connection_string();
    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    tracing::info!("Database connection pool created");

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
    })?;

    tracing::info!("Database migrations applied");

    let address = format!("127.0.0.1:{}", configuration.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let store = Arc::new(PgUserStore::new(pool));
    let media = Arc::new(MediaClient::new(
        configuration.media.base_url.clone(),
        reqwest::Client::new(),
    ));

    let server = run(listener, store, media, configuration.tokens.clone())?;
    tracing::info!("Server started successfully");

    server.await?;

    Ok(())
}
