use super::{KeyArgs, TargetArgs};
use alloy::primitives::{Address, U256, utils::format_units};
use batch_sender::{BatchPreview, Distributor, RpcWallet, TransferRequest};
use clap::Parser;
use eyre::{Context, Result};
use std::sync::Arc;

#[derive(Parser, Debug)]
pub(crate) struct PreviewArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Account whose allowance is checked (defaults to the signing key's address)
    #[arg(long)]
    from: Option<Address>,

    #[command(flatten)]
    key: KeyArgs,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    format: String,
}

impl PreviewArgs {
    pub(crate) async fn run(self) -> Result<()> {
        let config = self.target.load_config()?;
        let rpc_url = self.target.rpc_url(&config)?;
        let list = self.target.read_list()?;

        let account = match self.from {
            Some(account) => account,
            None if self.key.is_set() => self.key.signer()?.address(),
            None => eyre::bail!("Provide --from or a signing key to read the allowance"),
        };

        let wallet = RpcWallet::connect_read_only(&rpc_url, account)
            .await
            .context("Failed to connect to RPC")?;
        let distributor = Distributor::new(Arc::new(wallet), config);

        let request = TransferRequest::new(Some(account), &self.target.token, &list)?;
        let preview = distributor.preview(&request).await?;

        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(&preview)?);
            return Ok(());
        }

        print_table(&preview)
    }
}

fn print_table(preview: &BatchPreview) -> Result<()> {
    let amount = |value: U256| format_units(value, preview.decimals);

    println!("Batch Preview");
    println!("=============");
    println!();
    println!("Token:       {} ({})", preview.token, preview.symbol);
    println!("Spender:     {}", preview.spender);
    println!();

    println!("{:<44} {:>24}", "Recipient", "Amount");
    println!("{}", "-".repeat(69));
    for (recipient, value) in preview.batch.recipients.iter().zip(&preview.batch.amounts) {
        println!("{:<44} {:>24}", recipient, amount(*value)?);
    }

    println!();
    println!("Recipients:  {}", preview.batch.len());
    println!("Total:       {} {}", amount(preview.batch.total)?, preview.symbol);
    println!("Allowance:   {} {}", amount(preview.allowance)?, preview.symbol);
    if preview.needs_approval {
        println!("Approval:    required (unlimited approval will be requested first)");
    } else {
        println!("Approval:    not required");
    }

    Ok(())
}
