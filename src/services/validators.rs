// src/services/validators.rs
//! Request validation.
//!
//! Every handler validates its JSON body or query string here before any
//! chain interaction, so malformed requests never reach gas estimation.
//! All missing or malformed fields of a body are collected into a single
//! `ApiError::Validation`.

use crate::error::{ApiError, ApiResult};
use ethers_core::types::{Address, Signature, H256};
use serde_json::Value;
use std::str::FromStr;

/// Field-by-field reader over a JSON request body.
pub struct FieldReader<'a> {
    body: &'a Value,
    problems: Vec<String>,
}

impl<'a> FieldReader<'a> {
    pub fn new(body: &'a Value) -> Self {
        FieldReader {
            body,
            problems: Vec::new(),
        }
    }

    fn raw_str(&mut self, field: &str) -> Option<&'a str> {
        match self.body.get(field) {
            None | Some(Value::Null) => {
                self.problems.push(format!("{field} is required"));
                None
            }
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                self.problems.push(format!("{field} must be a string"));
                None
            }
        }
    }

    /// Requires a non-empty string field.
    pub fn string(&mut self, field: &str) -> Option<String> {
        match self.raw_str(field) {
            Some(s) if s.is_empty() => {
                self.problems.push(format!("{field} must not be empty"));
                None
            }
            Some(s) => Some(s.to_owned()),
            None => None,
        }
    }

    /// Requires a 20-byte hex address field.
    pub fn address(&mut self, field: &str) -> Option<Address> {
        let raw = self.raw_str(field)?;
        match Address::from_str(raw) {
            Ok(address) => Some(address),
            Err(_) => {
                self.problems.push(format!("{field} must be a hex address"));
                None
            }
        }
    }

    /// Requires a 32-byte hex hash field.
    pub fn hash(&mut self, field: &str) -> Option<H256> {
        let raw = self.raw_str(field)?;
        match H256::from_str(raw) {
            Ok(hash) => Some(hash),
            Err(_) => {
                self.problems
                    .push(format!("{field} must be a 32-byte hex hash"));
                None
            }
        }
    }

    /// Requires a 65-byte hex signature field.
    pub fn signature(&mut self, field: &str) -> Option<Signature> {
        let raw = self.raw_str(field)?;
        let stripped = raw.strip_prefix("0x").unwrap_or(raw);
        match Signature::from_str(stripped) {
            Ok(signature) => Some(signature),
            Err(_) => {
                self.problems
                    .push(format!("{field} must be a 65-byte hex signature"));
                None
            }
        }
    }

    /// Succeeds iff every requested field parsed.
    pub fn finish(self) -> ApiResult<()> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.problems))
        }
    }
}

/// Validates the `addressSender` query parameter of the document listing.
pub fn sender_query(raw: Option<&str>) -> ApiResult<Address> {
    let raw = raw.ok_or_else(|| {
        ApiError::Validation("addressSender query parameter is required".into())
    })?;
    Address::from_str(raw)
        .map_err(|_| ApiError::Validation("addressSender must be a hex address".into()))
}
