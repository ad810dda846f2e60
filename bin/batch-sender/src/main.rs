use crate::opts::{BatchSender, BatchSenderSubcommand};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cmd;
mod opts;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = BatchSender::parse();

    match args.cmd {
        BatchSenderSubcommand::Send(cmd) => cmd.run().await,
        BatchSenderSubcommand::Preview(cmd) => cmd.run().await,
    }
}
