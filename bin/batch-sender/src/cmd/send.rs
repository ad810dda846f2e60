use super::{KeyArgs, TargetArgs};
use batch_sender::{ActionOutcome, Controller, RpcWallet, StatusKind, StatusMessage};
use clap::Parser;
use eyre::{Context, Result};
use std::{pin::pin, sync::Arc};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::info;

#[derive(Parser, Debug)]
pub(crate) struct SendArgs {
    #[command(flatten)]
    target: TargetArgs,

    #[command(flatten)]
    key: KeyArgs,
}

impl SendArgs {
    pub(crate) async fn run(self) -> Result<()> {
        let config = self.target.load_config()?;
        let rpc_url = self.target.rpc_url(&config)?;
        let list = self.target.read_list()?;
        let signer = self.key.signer()?;

        let wallet = Arc::new(
            RpcWallet::connect(&rpc_url, signer)
                .await
                .context("Failed to connect to RPC")?,
        );
        let _chain_watch = wallet.watch_chain(config.chain_poll_interval());

        let distributor_address = config.distributor;
        let controller = Controller::new(Arc::clone(&wallet), config);
        let _wallet_events = controller.subscribe_wallet_events();
        let mut feed = controller.status().feed();

        // First press of the action control connects the wallet.
        with_status(controller.handle_action(), &mut feed).await?;
        controller.set_token_address(self.target.token);
        controller.set_recipients_text(list);

        info!(distributor = %distributor_address, "starting distribution");
        let outcome = with_status(controller.handle_action(), &mut feed).await;

        match outcome? {
            ActionOutcome::Distributed(receipt) => {
                println!();
                if let Some(approval) = &receipt.approval {
                    println!("Approval tx:      {}", approval.tx_hash);
                }
                println!("Distribution tx:  {}", receipt.distribution.tx_hash);
                if let Some(block) = receipt.distribution.block_number {
                    println!("Block:            {block}");
                }
                println!("Recipients:       {}", receipt.recipients);
                println!("Total (raw):      {}", receipt.total);
                Ok(())
            }
            ActionOutcome::Connected(account) => {
                eyre::bail!("Wallet {account} connected but no distribution was started")
            }
        }
    }
}

/// Drives `action` to completion, printing every status message it produces.
async fn with_status<T>(
    action: impl Future<Output = T>,
    feed: &mut broadcast::Receiver<StatusMessage>,
) -> T {
    let mut action = pin!(action);
    let result = loop {
        tokio::select! {
            result = &mut action => break result,
            Ok(message) = feed.recv() => print_message(&message),
        }
    };

    loop {
        match feed.try_recv() {
            Ok(message) => print_message(&message),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    result
}

fn print_message(message: &StatusMessage) {
    let marker = match message.kind {
        StatusKind::Info => "…",
        StatusKind::Success => "✓",
        StatusKind::Error => "✗",
    };
    println!("{marker} {}", message.text);
}
