use crate::cmd::{preview::PreviewArgs, send::SendArgs};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Distribute an ERC-20 token to many recipients in one transaction", long_about = None)]
pub(crate) struct BatchSender {
    #[command(subcommand)]
    pub(crate) cmd: BatchSenderSubcommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum BatchSenderSubcommand {
    /// Approve the distributor if needed, then send the batch
    Send(SendArgs),
    /// Show the parsed batch and whether an approval is needed, without sending
    Preview(PreviewArgs),
}
