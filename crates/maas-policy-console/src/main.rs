//! MaaS policy console
//!
//! - Policy CRUD, evaluation and simulation over HTTP/JSON
//! - Live synthetic request feed on a fixed interval
//! - Config from `MAAS_POLICY_CONFIG` (default `maas-policy.yaml`), defaults when absent

use std::error::Error;

use tracing_subscriber::{fmt, EnvFilter};

use maas_policy_console::{app_state, config, router};

const CONFIG_ENV: &str = "MAAS_POLICY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "maas-policy.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_or_default(&path)?;
    let listen = cfg.console.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    state.start_live_if_enabled()?;
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "maas-policy-console starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
