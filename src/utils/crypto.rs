// src/utils/crypto.rs
//! Cryptographic helpers optimized for blockchain compatibility.
//!
//! Hashing is Keccak-256 throughout (Solidity's `keccak256`). Signatures
//! follow the EIP-191 personal-message scheme over a 32-byte digest, so
//! they match what wallet tooling produces and what the contract's
//! `ecrecover` expects. Recovery applies the same prefix.

use crate::error::{ApiError, ApiResult};
use anyhow::{bail, Context};
use ethers::signers::{LocalWallet, Signer};
use ethers_core::types::{Address, RecoveryMessage, Signature, H256};
use ethers_core::utils::{hash_message, hex, keccak256};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::generic_array::GenericArray;

/// Computes the Keccak-256 hash of the input data (Ethereum-compatible).
pub fn hash_bytes(data: &[u8]) -> H256 {
    H256::from(keccak256(data))
}

/// Builds a signing wallet from a hex-encoded private key.
///
/// # Arguments
/// * `private_key` - 32-byte hex key, with or without 0x prefix
/// * `chain_id` - chain id embedded into the wallet for transaction signing
pub fn wallet_from_hex(private_key: &str, chain_id: u64) -> anyhow::Result<LocalWallet> {
    let raw = private_key.strip_prefix("0x").unwrap_or(private_key);
    let bytes = hex::decode(raw).context("private key is not valid hex")?;
    if bytes.len() != 32 {
        bail!("private key must be 32 bytes, got {}", bytes.len());
    }
    let signing_key = SigningKey::from_bytes(GenericArray::from_slice(&bytes))
        .context("private key is not a valid secp256k1 scalar")?;
    Ok(LocalWallet::from(signing_key).with_chain_id(chain_id))
}

/// Signs a 32-byte digest under the EIP-191 personal-message prefix.
///
/// # Returns
/// A 65-byte signature (r || s || v, with v in {27, 28}).
pub fn sign_digest(wallet: &LocalWallet, digest: H256) -> ApiResult<Signature> {
    wallet
        .sign_hash(hash_message(digest))
        .map_err(|e| ApiError::Submission(format!("local signing failed: {e}")))
}

/// Recovers the address that signed `digest` under the EIP-191 prefix.
pub fn recover_signer(digest: H256, signature: &Signature) -> ApiResult<Address> {
    signature
        .recover(RecoveryMessage::Data(digest.as_bytes().to_vec()))
        .map_err(|e| ApiError::Contract(format!("signature recovery failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn test_wallet() -> LocalWallet {
        wallet_from_hex(TEST_KEY, 1337).unwrap()
    }

    #[test]
    fn signature_recovers_to_signer() {
        let wallet = test_wallet();
        let digest = hash_bytes(b"bachelor of science");
        let signature = sign_digest(&wallet, digest).unwrap();
        assert_eq!(recover_signer(digest, &signature).unwrap(), wallet.address());
    }

    #[test]
    fn signing_is_deterministic_for_fixed_key_and_digest() {
        let wallet = test_wallet();
        let digest = hash_bytes(b"bachelor of science");
        let first = sign_digest(&wallet, digest).unwrap();
        let second = sign_digest(&wallet, digest).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tampered_digest_does_not_recover_the_signer() {
        let wallet = test_wallet();
        let signature = sign_digest(&wallet, hash_bytes(b"original")).unwrap();
        match recover_signer(hash_bytes(b"tampered"), &signature) {
            Ok(address) => assert_ne!(address, wallet.address()),
            Err(_) => {}
        }
    }

    #[test]
    fn wallet_from_hex_rejects_short_keys() {
        assert!(wallet_from_hex("0xdeadbeef", 1337).is_err());
        assert!(wallet_from_hex("not hex at all", 1337).is_err());
    }
}
