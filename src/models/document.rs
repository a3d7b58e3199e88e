// src/models/document.rs
//! Document registry data model.

use ethers_core::types::{Address, H256, U256};
use serde::{Serialize, Serializer};

/// A document record as stored by the registry contract.
///
/// Returned by the list endpoint exactly as the chain reports it; nothing
/// is cached locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub address_sender: Address,
    pub doc_type: String,
    pub doc_metadata: String,
    /// Keccak-256 of the document metadata.
    pub document_hash: H256,
    /// Block timestamp at registration, rendered as a decimal string in
    /// JSON (the value does not fit a JSON number).
    #[serde(serialize_with = "serialize_u256_as_decimal")]
    pub registered_at: U256,
}

fn serialize_u256_as_decimal<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
