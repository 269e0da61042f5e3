use std::sync::Arc;

use ragkit::{PipelineContext, RagConfig};
use ragkit_server::server::{ServerConfig, run_server, startup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = RagConfig::from_env()?;
    let context = Arc::new(PipelineContext::new(config));
    startup(&context).await;

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8000);

    run_server(ServerConfig { host, port }, context).await
}
