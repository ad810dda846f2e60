use alloy::signers::local::PrivateKeySigner;
use batch_sender::SenderConfig;
use clap::Args;
use eyre::{Context, Result};
use std::{ffi::OsStr, io::Read, path::PathBuf};

pub(crate) mod preview;
pub(crate) mod send;

/// Inputs shared by every subcommand: where to send and what.
#[derive(Args, Debug)]
pub(crate) struct TargetArgs {
    /// RPC endpoint of the distributor's chain (overrides config)
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// Token to distribute
    #[arg(long)]
    pub(crate) token: String,

    /// Recipient list, one `<address>,<amount>` per line. `-` reads stdin
    #[arg(long, default_value = "-")]
    list: PathBuf,

    /// Path to a TOML file overriding the built-in deployment settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl TargetArgs {
    pub(crate) fn load_config(&self) -> Result<SenderConfig> {
        match &self.config {
            Some(path) => SenderConfig::load(path)
                .wrap_err_with(|| format!("failed to load config from {}", path.display())),
            None => Ok(SenderConfig::default()),
        }
    }

    pub(crate) fn rpc_url(&self, config: &SenderConfig) -> Result<String> {
        self.rpc_url
            .clone()
            .or_else(|| config.rpc_url.clone())
            .ok_or_else(|| eyre::eyre!("No RPC URL provided, use --rpc-url or set rpc_url in the config"))
    }

    pub(crate) fn read_list(&self) -> Result<String> {
        if self.list.as_os_str() == OsStr::new("-") {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read recipient list from stdin")?;
            return Ok(text);
        }
        std::fs::read_to_string(&self.list)
            .wrap_err_with(|| format!("Failed to read recipient list {}", self.list.display()))
    }
}

/// Signing key, given inline or as a file.
#[derive(Args, Debug)]
pub(crate) struct KeyArgs {
    /// Hex encoded private key of the sending account
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true, conflicts_with = "key_path")]
    private_key: Option<String>,

    /// Path to a file holding the hex encoded private key
    #[arg(long)]
    key_path: Option<PathBuf>,
}

impl KeyArgs {
    pub(crate) fn is_set(&self) -> bool {
        self.private_key.is_some() || self.key_path.is_some()
    }

    pub(crate) fn signer(&self) -> Result<PrivateKeySigner> {
        let key_hex = match (&self.private_key, &self.key_path) {
            (Some(key), _) => key.trim().to_string(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .context("Failed to read key file")?
                .trim()
                .to_string(),
            (None, None) => eyre::bail!("No signing key provided, use --private-key or --key-path"),
        };
        key_hex.parse().context("Invalid private key")
    }
}
