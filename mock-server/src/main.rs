use mock_server::{MockConfig, DEFAULT_PAGE_SIZE, DEFAULT_TOKEN};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let config = MockConfig {
        token: std::env::var("MOCK_TOKEN").unwrap_or_else(|_| DEFAULT_TOKEN.to_string()),
        page_size: std::env::var("MOCK_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE),
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, page_size = config.page_size, "mock Toshl API listening");
    mock_server::run_with(listener, config).await
}
