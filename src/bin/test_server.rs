// Serves the fake dashboard locally: `cargo run --features test-server --bin test-server -- 3000`

use std::net::SocketAddr;
use tracing::info;

include!("../../tests/test_server_app.rs");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "test_server=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let port: u16 = std::env::args()
        .nth(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Fake dashboard listening on http://{}", addr);
    info!("Try: pulseprobe run --base-url http://{} --suite smoke", addr);

    axum::serve(listener, create_app().await).await?;
    Ok(())
}
