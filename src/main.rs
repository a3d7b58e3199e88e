// src/main.rs

//! # Credential Registry API - Main Entry Point
//!
//! Initializes the chain client, contract binding and services, then starts
//! the HTTP server.
//!
//! ## Architecture Overview
//! 1. **Blockchain Layer**: `EthClient` talking to an Ethereum JSON-RPC node
//! 2. **Contract Layer**: typed encode/decode over the registry contract ABI
//! 3. **Services Layer**: credential issuance, role management, documents
//! 4. **HTTP Layer**: Axum route handlers with request validation
//!
//! ## Configuration
//! Read from an optional `registry.toml` plus the environment (see
//! [`config::AppConfig`]):
//! - `RPC_URL`: JSON-RPC endpoint of the chain node
//! - `CONTRACT_ADDRESS`: deployed registry contract address
//! - `ACCOUNT_ADDRESS`: service account for locally signed transactions
//! - `ADMIN_ADDRESS`: admin account for node-signed role mutations
//! - `PRIVATE_KEY`: hex private key for local signing
//! - `BIND_ADDRESS`, `CHAIN_ID`: optional overrides

use crate::blockchain::eth_client::EthClient;
use crate::config::AppConfig;
use crate::contracts::credential_registry::CredentialRegistry;
use crate::services::api_server::ApiServer;
use crate::services::credential_issuer::CredentialIssuer;
use crate::services::document_registry::DocumentRegistry;
use crate::services::role_registry::RoleRegistry;
use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;

// Module declarations (organized by functional domain)
mod blockchain; // chain client and transaction submission
mod config; // startup configuration
mod contracts; // registry contract binding
mod error; // shared error taxonomy
mod models; // data structures
mod services; // business logic and API
mod utils; // hashing and signature helpers

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    let cfg = AppConfig::load().context("failed to load configuration")?;

    let client = Arc::new(
        EthClient::connect(&cfg).context("failed to initialize chain client")?,
    );
    log::info!("signing locally with account {:?}", client.signer_address());
    let registry = Arc::new(
        CredentialRegistry::new(cfg.contract_address)
            .context("failed to load registry contract binding")?,
    );

    let issuer = CredentialIssuer::new(client.clone(), registry.clone());
    let roles = RoleRegistry::new(
        client.clone(),
        registry.clone(),
        cfg.account_address,
        cfg.admin_address,
    );
    let documents = DocumentRegistry::new(client, registry);

    let server = ApiServer::new(issuer, roles, documents);
    log::info!(
        "registry API listening on http://{} (node {})",
        cfg.bind_address,
        cfg.rpc_url
    );
    server.run(cfg.bind_address).await
}
