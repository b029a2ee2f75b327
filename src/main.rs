use snaplink::{config, logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_from_env()?;
    let _log_guard = logging::init(&config)?;
    config.print_summary();

    server::run(config).await
}
