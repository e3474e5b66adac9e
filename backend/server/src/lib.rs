//! Proxy between the perevozki list UI and the 1C logistics web service.
//!
//!
//!
//! # General Infrastructure
//! - Browser talks only to this server, never to 1C directly
//! - One inbound request makes exactly one upstream call, no retries, no cache
//! - Nothing is stored, credentials live for the length of one request
//! - The 1C service account comes from the environment or `/run/secrets`, see [`config`]
//!
//!
//!
//! # Endpoints
//!
//! ## `POST /api/getfile`
//! - JSON body `{login, password, metod, number}`, `Number` also accepted
//! - Any field missing or empty is a 400 and 1C is not called
//! - Upstream 2xx is streamed back as 200 with its `Content-Type` and `Content-Disposition`,
//!   falling back to `application/octet-stream` and `attachment; filename="<metod>_<number>.pdf"`
//! - Upstream non-2xx is relayed with its own status and raw body
//! - No timeout, documents can be large
//!
//! ## `GET /api/perevozki`
//! - Needs `Authorization: Basic <base64>`, otherwise 401 and 1C is not called
//! - Calls `GetPerevozki` for the configured `DateB`/`DateE` range
//! - Upstream status and JSON body are relayed verbatim
//! - 15 second timeout by default, a timeout is a 500
//!
//! Anything that is not an upstream answer comes back as `{"message": "..."}`.
//!
//!
//!
//! # Notes
//!
//! ## Two credential headers
//! 1C wants the service account in `Authorization` and the end user in `Auth`, and
//! the user part is shaped differently per endpoint. See [`upstream`].
//!
//! ## Streaming
//! `GetFile` bodies are never buffered. Once headers are out there is no way to
//! report an error, so a failing upstream stream just closes the connection.
//!
//!
//!
//! # Setup
//!
//! Run locally.
//! ```sh
//! ONEC_SERVICE_LOGIN=... ONEC_SERVICE_PASSWORD=... \
//! UPSTREAM_BASE_URL=https://host/base/hs/api \
//! RUST_LOG=info cargo run -p perevozki-server
//! ```
//!
//! Smoke test.
//! ```sh
//! curl -u 'order@x.com:p' http://localhost:8080/api/perevozki
//! ```
use std::{error::Error, sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod upstream;
pub mod utils;

use config::Config;
use routes::{file_handler, get_only, perevozki_handler, post_only};
use state::State;

pub const FILE_PATH: &str = "/api/getfile";
pub const PEREVOZKI_PATH: &str = "/api/perevozki";

pub async fn start_server() -> Result<(), Box<dyn Error + Send + Sync>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config)?;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

pub fn app(state: Arc<State>) -> Router {
    Router::new()
        .route(FILE_PATH, post(file_handler).fallback(post_only))
        .route(
            PEREVOZKI_PATH,
            // axum answers HEAD with the GET handler unless HEAD has its own route
            get(perevozki_handler).head(get_only).fallback(get_only),
        )
        .layer(cors(&state.config.allowed_origin))
        .with_state(state)
}

fn cors(allowed_origin: &str) -> CorsLayer {
    let origin = match allowed_origin {
        "*" => AllowOrigin::any(),
        origin => match HeaderValue::from_str(origin) {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(_) => {
                warn!("Invalid ALLOWED_ORIGIN {origin}, allowing any");
                AllowOrigin::any()
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(60 * 60))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
