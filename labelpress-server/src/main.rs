use labelpress_core::{Config, PrintService};
use labelpress_server::{AppState, routes};

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("LABELPRESS_CONFIG").unwrap_or_else(|_| "printer_config.json".to_string());
    let config = Config::load(Path::new(&config_path))?;
    tracing::info!(config = %config_path, "configuration loaded");

    let port: u16 = std::env::var("HTTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(7878);

    let state = AppState::new(PrintService::new(&config));
    let app = routes::build_app(state);

    // unauthenticated endpoint: loopback only
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "labelpress server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
