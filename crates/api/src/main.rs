use std::env;

use anyhow::Result;
use subway_api::{build_app, ApiConfig};
use subway_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("subway_api");

    let bind = env::var("SUBWAY_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let config = ApiConfig::from_env()?;
    let endpoint = config.skill.status.endpoint.clone();

    let app = build_app(config)?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, status_endpoint = %endpoint, "subway status skill api started");

    axum::serve(listener, app).await?;
    Ok(())
}
