// src/services/document_registry.rs
//! Document registration and verification.
//!
//! Documents are identified by the Keccak-256 hash of their metadata. The
//! contract stores the record; every read round-trips to the chain, nothing
//! is cached here.

use crate::blockchain::eth_client::{EthClient, SigningPolicy};
use crate::contracts::credential_registry::CredentialRegistry;
use crate::error::ApiResult;
use crate::models::document::DocumentRecord;
use crate::utils::crypto;
use ethers::providers::JsonRpcClient;
use ethers_core::types::{Address, H256};
use serde::Serialize;
use std::sync::Arc;

pub struct DocumentRegistry<P> {
    client: Arc<EthClient<P>>,
    registry: Arc<CredentialRegistry>,
}

/// A freshly registered document, echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDocument {
    pub address_sender: Address,
    pub doc_type: String,
    pub doc_metadata: String,
    pub document_hash: H256,
    pub transaction_hash: H256,
}

impl<P: JsonRpcClient + 'static> DocumentRegistry<P> {
    pub fn new(client: Arc<EthClient<P>>, registry: Arc<CredentialRegistry>) -> Self {
        DocumentRegistry { client, registry }
    }

    /// Hashes the metadata and records the document on-chain, sent from the
    /// caller's address and signed by the node.
    pub async fn register(
        &self,
        sender: Address,
        doc_type: String,
        doc_metadata: String,
    ) -> ApiResult<RegisteredDocument> {
        let document_hash = crypto::hash_bytes(doc_metadata.as_bytes());
        let data =
            self.registry
                .register_document(doc_type.clone(), doc_metadata.clone(), document_hash)?;
        let transaction_hash = self
            .client
            .submit(
                sender,
                self.registry.address(),
                data,
                SigningPolicy::NodeManaged,
            )
            .await?;
        Ok(RegisteredDocument {
            address_sender: sender,
            doc_type,
            doc_metadata,
            document_hash,
            transaction_hash,
        })
    }

    /// Lists every document registered by `sender`.
    pub async fn list(&self, sender: Address) -> ApiResult<Vec<DocumentRecord>> {
        let data = self.registry.documents_by_sender(sender)?;
        let output = self.client.call(self.registry.address(), data).await?;
        self.registry.decode_documents(&output)
    }

    /// Looks a document up by hash and checks the registrant matches the
    /// claimed sender. An unregistered hash verifies as false, not an error.
    pub async fn verify(&self, document_hash: H256, claimed_sender: Address) -> ApiResult<bool> {
        let data = self.registry.verify_document(document_hash)?;
        let output = self.client.call(self.registry.address(), data).await?;
        let (registered, registrant) = self.registry.decode_verification(&output)?;
        Ok(registered && registrant == claimed_sender)
    }
}
