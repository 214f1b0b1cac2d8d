use animgen_rs::{config, logging, routes, state};

use axum::Router;
use mimalloc::MiMalloc;
use tower_http::trace::TraceLayer;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Refusing to start: {}", err);
            std::process::exit(1);
        }
    };

    logging::init(&config.log_file);

    if let Err(err) = config.ensure_dirs() {
        tracing::error!(
            "Failed to create media directories under {}: {}",
            config.media_dir.display(),
            err
        );
        std::process::exit(1);
    }

    let state = match state::AppState::new(config.clone()) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("Failed to build model client: {}", err);
            std::process::exit(1);
        }
    };

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::generate::router())
        .layer(routes::cors_layer(&config))
        .layer(axum::extract::DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind {}: {}", addr, err);
            std::process::exit(1);
        }
    };

    tracing::info!("AnimGen-RS listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Generate: POST http://{}/api/generate", addr);
    tracing::info!("Media directory: {}", config.media_dir.display());

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
    }
}
