//! meshbridge gateway
//!
//! - Subscribes to every configured namespace (`<prefix>/#`)
//! - Relays allowed portnums to all other namespaces with hop and channel
//!   rewrite, re-encrypting per destination
//! - Logs a counter summary on shutdown

use tracing_subscriber::{fmt, EnvFilter};

use meshbridge_gateway::{app_state, config, transport};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "meshbridge.yaml".to_string());

    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, error = %e, "config load failed");
            std::process::exit(2);
        }
    };

    let state = match app_state::AppState::new(cfg) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "bridge setup failed");
            std::process::exit(2);
        }
    };
    let metrics = state.metrics();

    tracing::info!(config = %path, "meshbridge starting");

    let code = tokio::select! {
        res = transport::run(state) => match res {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!(error = %e, "transport stopped");
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("bridge stopped by user");
            0
        }
    };

    tracing::info!("relay counters:\n{}", metrics.render());
    std::process::exit(code);
}
