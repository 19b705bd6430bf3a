mod app;
mod auth;
mod config;
mod rate_limit;
mod state;
mod storage;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "keyguard=debug,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or_else(|_| config.environment.is_production());

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!(environment = %config.environment, "starting keyguard");

    let state = AppState::init(config).await?;
    let addr = app::bind_addr(&state.config)?;

    app::serve(app::build_app(state), addr).await
}
