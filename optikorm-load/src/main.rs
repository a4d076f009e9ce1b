use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use optikorm_load::{runner, Cli};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "optikorm_load=debug,swarm=debug"
    } else {
        "optikorm_load=info,swarm=info"
    };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Some(addr) = cli.metrics_addr {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        info!("Serving metrics on {addr}");
    }

    let config = Arc::new(cli.load_config());
    for stats in runner::run(cli.run_settings(), config).await {
        println!("{stats}");
    }

    Ok(())
}
