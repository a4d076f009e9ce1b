use clap::Parser;
use mock_service::Behavior;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Mock OPTIKORM backend
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[arg(long, default_value = "0.0.0.0:3002")]
    addr: SocketAddr,

    /// Answer 503 above this many requests per second
    #[arg(long)]
    max_tps: Option<NonZeroU32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_env_filter("mock_service=debug,tower_http=info")
        .init();

    tokio::task::spawn(async { mock_service::tps_measure_task().await });

    info!("Mock OPTIKORM backend on {}", args.addr);
    mock_service::run(
        args.addr,
        Behavior {
            max_tps: args.max_tps,
            ..Behavior::default()
        },
    )
    .await?;

    Ok(())
}
