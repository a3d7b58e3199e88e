// src/models/credential.rs
//! Credential data model.
//!
//! A credential is never stored by this service. Its identity is the
//! Keccak-256 hash of the tightly packed fields, which the registry
//! contract records and which issuance signatures are computed over.

use crate::error::{ApiError, ApiResult};
use crate::utils::crypto;
use ethers_core::abi::{encode_packed, Token};
use ethers_core::types::{Address, H256};
use serde::{Deserialize, Serialize};

/// An academic credential as submitted by an issuing institution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Institution issuing the credential.
    pub education_address: Address,
    /// Student the credential is issued to.
    pub student_address: Address,
    pub credential_type: String,
    pub credential_details: String,
    pub credential_date: String,
}

impl Credential {
    /// Deterministic identity hash of the credential.
    ///
    /// Fields are tightly packed in contract order (type, details, issuer,
    /// student, date): addresses as 20 raw bytes, strings as raw UTF-8.
    /// Reordering fields changes the hash.
    pub fn hash(&self) -> ApiResult<H256> {
        let packed = encode_packed(&[
            Token::String(self.credential_type.clone()),
            Token::String(self.credential_details.clone()),
            Token::Address(self.education_address),
            Token::Address(self.student_address),
            Token::String(self.credential_date.clone()),
        ])
        .map_err(|e| ApiError::Contract(format!("failed to pack credential fields: {e}")))?;
        Ok(crypto::hash_bytes(&packed))
    }
}
