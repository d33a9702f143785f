mod config;
mod email;
mod handlers;
mod rate_limit;
mod retry;
mod security;
mod store;

use std::sync::Arc;

use dotenvy::dotenv;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use config::{validate_production_env, AppConfig};
use email::SmtpMailer;
use handlers::{build_router, AppState};
use rate_limit::RateLimiter;
use security::security_headers;
use store::SurrealStore;

#[tokio::main]
async fn main() {
    let tracing_level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_max_level(tracing_level)
        .init();

    if dotenv().is_err() {
        warn!("There is no corresponding .env file");
    }

    if let Err(problems) = validate_production_env() {
        for problem in &problems {
            error!(%problem, "Configuration error");
        }
        return;
    }

    let config = Arc::new(AppConfig::from_env());

    let store = match SurrealStore::connect(&config.database).await {
        Ok(store) => store,
        Err(err) => {
            error!("Failed to connect to the application store: {err}");
            return;
        }
    };

    let mailer = match SmtpMailer::from_config(&config.smtp) {
        Ok(mailer) => mailer,
        Err(err) => {
            error!("Failed to configure the contact mailer: {err}");
            return;
        }
    };

    let state = AppState {
        limiter: RateLimiter::new(&config.rate_limit),
        config: config.clone(),
        mailer: Arc::new(mailer),
        store: Arc::new(store),
    };

    let app = build_router(state).layer(
        tower::ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(security_headers)),
    );

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind tcp listener to {}: {}", config.listen_addr, err);
            return;
        }
    };
    info!("Listening on http://{}", config.listen_addr);

    match axum::serve(listener, app.into_make_service()).await {
        Ok(()) => info!("Server shutdown gracefully"),
        Err(err) => {
            error!("Failed to serve app: {}", err);
            error!("Error details: {:?}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_tracing_level_matches_build_profile() {
        let level = if cfg!(debug_assertions) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        if cfg!(debug_assertions) {
            assert_eq!(level, tracing::Level::DEBUG);
        } else {
            assert_eq!(level, tracing::Level::INFO);
        }
    }
}
