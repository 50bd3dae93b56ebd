//! Binary entry point: read config from the environment, build the router,
//! bind a socket, and serve.

use std::net::SocketAddr;

use colorsync_runtime::build_app;
use colorsync_runtime::config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let port = config.port;

    let (app, _state) = build_app(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "runtime listening");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
