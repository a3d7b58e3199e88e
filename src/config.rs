// src/config.rs
//! Service configuration.
//!
//! All runtime parameters live in one explicitly constructed [`AppConfig`]
//! that is loaded once at startup and handed to the chain client and
//! services. Values come from an optional `registry.toml` file overlaid
//! with environment variables (`RPC_URL`, `CONTRACT_ADDRESS`, ...).

use anyhow::Context;
use config::{Config, Environment, File};
use ethers_core::types::Address;
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// JSON-RPC endpoint of the chain node.
    pub rpc_url: String,
    /// Address the HTTP server binds to.
    pub bind_address: SocketAddr,
    /// Chain id used when signing transactions locally.
    pub chain_id: u64,
    /// Deployed registry contract.
    pub contract_address: Address,
    /// Service account; sender of locally signed transactions.
    pub account_address: Address,
    /// Admin account; sender of node-signed role mutations.
    pub admin_address: Address,
    /// Hex-encoded private key for local signing (0x prefix optional).
    pub private_key: String,
}

impl AppConfig {
    /// Loads configuration from `registry.toml` (optional) and the
    /// environment. Environment variables take precedence over the file.
    ///
    /// # Errors
    /// Fails if a required value is missing or cannot be parsed into its
    /// typed field (addresses, socket address, chain id).
    pub fn load() -> anyhow::Result<Self> {
        let settings = Config::builder()
            .set_default("rpc_url", "http://127.0.0.1:7545")?
            .set_default("bind_address", "127.0.0.1:3000")?
            .set_default("chain_id", 1337_i64)?
            .add_source(File::with_name("registry").required(false))
            .add_source(Environment::default())
            .build()
            .context("failed to assemble configuration sources")?;

        settings
            .try_deserialize()
            .context("invalid configuration value")
    }
}
