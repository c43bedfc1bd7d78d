use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use socrato::{
    api::{create_router, AppState},
    config::{Config, LoggingConfig},
    gemini::GeminiClient,
    storage::Database,
    study_service::StudyService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let _guard = setup_logging(&LoggingConfig::from_env()?)?;

    let config = Config::from_env()?;
    config.validate()?;

    info!("Starting Socrato server...");

    let db = Database::new(&config.database.url).await?;
    info!("Database initialized successfully");

    let model = GeminiClient::new(
        config.gemini.api_key.clone(),
        config.gemini.base_url.clone(),
        config.gemini.model.clone(),
    );
    info!("Initialized Gemini client with model: {}", model.model_name());

    let state = AppState {
        study_service: StudyService::new(Arc::new(model)),
        store: Arc::new(db),
        auth: config.auth_config(),
    };

    let app = create_router(state).layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn setup_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));

    let console_layer = if logging.console_enabled {
        Some(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(true),
        )
    } else {
        None
    };

    let (file_layer, guard) = if logging.file_enabled {
        std::fs::create_dir_all(&logging.log_directory).unwrap_or_else(|e| {
            eprintln!("Warning: Could not create logs directory: {}", e);
        });

        let file_appender =
            tracing_appender::rolling::daily(&logging.log_directory, "socrato.log");
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(non_blocking_file);

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if logging.file_enabled {
        info!(
            "Logging initialized - writing to {}/socrato.log with daily rotation",
            logging.log_directory
        );
    }

    Ok(guard)
}
