// src/blockchain/eth_client.rs
//! Ethereum JSON-RPC client and transaction submission.
//!
//! Wraps an `ethers` provider together with the service signing key and
//! implements the single submission path used by every state-changing
//! endpoint: estimate gas, fetch the network gas price, assemble the
//! transaction, then sign locally or defer signing to the node.
//!
//! The client is generic over the JSON-RPC transport so tests can run it
//! against a mock transport.

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::utils::crypto;
use anyhow::Context;
use ethers::providers::{Http, JsonRpcClient, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{Address, BlockNumber, Bytes, Signature, TransactionRequest, H256, U256};
use std::sync::Arc;
use tokio::sync::Mutex;

/// How a transaction obtains its signature before reaching the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningPolicy {
    /// Sign with the service key and submit the raw transaction.
    LocalKey,
    /// Submit unsigned; the node signs with its managed account.
    NodeManaged,
}

/// Chain client holding the provider connection and the service signing key.
///
/// # Type Parameters
/// * `P` - JSON-RPC transport (e.g. `Http`)
pub struct EthClient<P> {
    provider: Arc<Provider<P>>,
    wallet: LocalWallet,
    chain_id: u64,
    /// Serializes locally signed submissions so concurrent requests cannot
    /// reuse the nonce fetched for the signing account.
    submit_lock: Mutex<()>,
}

impl EthClient<Http> {
    /// Connects to the configured JSON-RPC endpoint.
    ///
    /// # Errors
    /// Fails if the RPC URL is malformed or the private key cannot be
    /// decoded into a secp256k1 signing key.
    pub fn connect(cfg: &AppConfig) -> anyhow::Result<Self> {
        let provider =
            Provider::<Http>::try_from(cfg.rpc_url.as_str()).context("invalid RPC URL")?;
        let wallet = crypto::wallet_from_hex(&cfg.private_key, cfg.chain_id)
            .context("invalid private key")?;
        Ok(Self::new(provider, wallet, cfg.chain_id))
    }
}

impl<P: JsonRpcClient + 'static> EthClient<P> {
    pub fn new(provider: Provider<P>, wallet: LocalWallet, chain_id: u64) -> Self {
        EthClient {
            provider: Arc::new(provider),
            wallet,
            chain_id,
            submit_lock: Mutex::new(()),
        }
    }

    /// Address derived from the service signing key.
    pub fn signer_address(&self) -> Address {
        self.wallet.address()
    }

    /// Signs a 32-byte digest with the service key (EIP-191 prefixed).
    pub fn sign_digest(&self, digest: H256) -> ApiResult<Signature> {
        crypto::sign_digest(&self.wallet, digest)
    }

    /// Gas estimate and current network gas price for a prepared call.
    ///
    /// # Errors
    /// Returns [`ApiError::Estimation`] if the call would revert or the
    /// node cannot be reached.
    pub async fn estimate_and_price(&self, call: &TypedTransaction) -> ApiResult<(U256, U256)> {
        let gas = self
            .provider
            .estimate_gas(call, None)
            .await
            .map_err(|e| ApiError::Estimation(e.to_string()))?;
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| ApiError::Estimation(e.to_string()))?;
        Ok((gas, gas_price))
    }

    /// Assembles a legacy transaction from its parts. No side effects.
    pub fn build_transaction(
        from: Address,
        to: Address,
        data: Bytes,
        gas: U256,
        gas_price: U256,
    ) -> TransactionRequest {
        TransactionRequest::new()
            .from(from)
            .to(to)
            .data(data)
            .gas(gas)
            .gas_price(gas_price)
    }

    /// Executes a read-only contract call and returns the raw return data.
    ///
    /// # Errors
    /// Returns [`ApiError::Contract`] if the call reverts or the node is
    /// unreachable.
    pub async fn call(&self, to: Address, data: Bytes) -> ApiResult<Bytes> {
        let call: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        self.provider
            .call(&call, None)
            .await
            .map_err(|e| ApiError::Contract(e.to_string()))
    }

    /// Estimates, prices, signs (per `policy`) and submits one transaction,
    /// returning its hash without waiting for inclusion.
    ///
    /// Locally signed submissions fetch the pending nonce of the signing
    /// account and hold the submission lock until the raw transaction is
    /// sent.
    ///
    /// # Errors
    /// - [`ApiError::Estimation`] if gas estimation or pricing fails
    /// - [`ApiError::Submission`] if signing fails or the node rejects the
    ///   transaction
    pub async fn submit(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        policy: SigningPolicy,
    ) -> ApiResult<H256> {
        let probe: TypedTransaction = TransactionRequest::new()
            .from(from)
            .to(to)
            .data(data.clone())
            .into();
        let (gas, gas_price) = self.estimate_and_price(&probe).await?;
        let tx = Self::build_transaction(from, to, data, gas, gas_price);
        log::debug!("submitting to {to:?} from {from:?} (gas {gas}, gas price {gas_price})");

        match policy {
            SigningPolicy::LocalKey => {
                let _guard = self.submit_lock.lock().await;
                let nonce = self
                    .provider
                    .get_transaction_count(
                        self.wallet.address(),
                        Some(BlockNumber::Pending.into()),
                    )
                    .await
                    .map_err(|e| ApiError::Submission(e.to_string()))?;
                let tx: TypedTransaction = tx.nonce(nonce).chain_id(self.chain_id).into();
                let signature = self
                    .wallet
                    .sign_transaction_sync(&tx)
                    .map_err(|e| ApiError::Submission(format!("local signing failed: {e}")))?;
                let pending = self
                    .provider
                    .send_raw_transaction(tx.rlp_signed(&signature))
                    .await
                    .map_err(|e| ApiError::Submission(e.to_string()))?;
                Ok(*pending)
            }
            SigningPolicy::NodeManaged => {
                let pending = self
                    .provider
                    .send_transaction(tx, None)
                    .await
                    .map_err(|e| ApiError::Submission(e.to_string()))?;
                Ok(*pending)
            }
        }
    }
}
