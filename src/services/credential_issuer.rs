// src/services/credential_issuer.rs
//! Credential issuance and validation.
//!
//! Issuance hashes the credential fields, signs the hash with the service
//! key, and records the credential on-chain through the registry contract.
//! Validation is purely local: it recovers the signer from a hash/signature
//! pair and compares it to the claimed issuing institution.

use crate::blockchain::eth_client::{EthClient, SigningPolicy};
use crate::contracts::credential_registry::CredentialRegistry;
use crate::error::ApiResult;
use crate::models::credential::Credential;
use crate::utils::crypto;
use ethers::providers::JsonRpcClient;
use ethers_core::types::{Address, Signature, H256};
use std::sync::Arc;

/// Service issuing and validating credentials against the registry.
pub struct CredentialIssuer<P> {
    client: Arc<EthClient<P>>,
    registry: Arc<CredentialRegistry>,
}

/// Outcome of a successful issuance, echoed back to the caller.
#[derive(Debug)]
pub struct IssuedCredential {
    pub transaction_hash: H256,
    pub credential_hash: H256,
    pub signature: Signature,
}

impl<P: JsonRpcClient + 'static> CredentialIssuer<P> {
    pub fn new(client: Arc<EthClient<P>>, registry: Arc<CredentialRegistry>) -> Self {
        CredentialIssuer { client, registry }
    }

    /// Hashes, signs, and records a credential.
    ///
    /// The issuance transaction is estimated from the issuing institution's
    /// address and signed locally with the service key.
    pub async fn issue(&self, credential: &Credential) -> ApiResult<IssuedCredential> {
        let credential_hash = credential.hash()?;
        let signature = self.client.sign_digest(credential_hash)?;
        let data = self.registry.issue_credential(credential, &signature)?;
        let transaction_hash = self
            .client
            .submit(
                credential.education_address,
                self.registry.address(),
                data,
                SigningPolicy::LocalKey,
            )
            .await?;
        log::info!("issued credential {credential_hash:?} in tx {transaction_hash:?}");
        Ok(IssuedCredential {
            transaction_hash,
            credential_hash,
            signature,
        })
    }

    /// Checks that `signature` over `credential_hash` recovers to the
    /// claimed institution. Both sides are canonical `Address` values, so
    /// the comparison is insensitive to hex casing in the request.
    pub fn validate(
        &self,
        credential_hash: H256,
        signature: &Signature,
        education_address: Address,
    ) -> ApiResult<bool> {
        let recovered = crypto::recover_signer(credential_hash, signature)?;
        Ok(recovered == education_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::{MockProvider, Provider};
    use ethers::signers::Signer;
    use ethers_core::types::U256;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn issuer() -> (CredentialIssuer<MockProvider>, MockProvider, Address) {
        let (provider, mock) = Provider::mocked();
        let wallet = crypto::wallet_from_hex(TEST_KEY, 1337).unwrap();
        let signer = wallet.address();
        let client = Arc::new(EthClient::new(provider, wallet, 1337));
        let registry = Arc::new(
            CredentialRegistry::new(
                "0x1111111111111111111111111111111111111111"
                    .parse()
                    .unwrap(),
            )
            .unwrap(),
        );
        (CredentialIssuer::new(client, registry), mock, signer)
    }

    fn sample_credential() -> Credential {
        Credential {
            education_address: "0x3333333333333333333333333333333333333333"
                .parse()
                .unwrap(),
            student_address: "0x4444444444444444444444444444444444444444"
                .parse()
                .unwrap(),
            credential_type: "degree".into(),
            credential_details: "BSc".into(),
            credential_date: "2024-01-01".into(),
        }
    }

    #[test]
    fn issuance_returns_hash_signature_and_tx_hash() {
        tokio_test::block_on(async {
            let (issuer, mock, signer) = issuer();
            let tx_hash = H256::repeat_byte(0x77);
            mock.push(tx_hash).unwrap();
            mock.push(U256::zero()).unwrap();
            mock.push(U256::one()).unwrap();
            mock.push(U256::from(21_000)).unwrap();

            let issued = issuer.issue(&sample_credential()).await.unwrap();

            assert_eq!(issued.transaction_hash, tx_hash);
            assert_eq!(
                issued.credential_hash,
                sample_credential().hash().unwrap()
            );
            assert_eq!(
                crypto::recover_signer(issued.credential_hash, &issued.signature).unwrap(),
                signer
            );
        });
    }

    #[test]
    fn validation_accepts_the_real_signer_and_rejects_others() {
        let (issuer, _mock, signer) = issuer();
        let wallet = crypto::wallet_from_hex(TEST_KEY, 1337).unwrap();
        let hash = sample_credential().hash().unwrap();
        let signature = crypto::sign_digest(&wallet, hash).unwrap();

        assert!(issuer.validate(hash, &signature, signer).unwrap());
        assert!(!issuer
            .validate(hash, &signature, Address::repeat_byte(0x09))
            .unwrap());
    }

    #[test]
    fn chain_failure_aborts_issuance() {
        tokio_test::block_on(async {
            let (issuer, _mock, _signer) = issuer();
            // No queued responses: the first estimation call fails.
            let err = issuer.issue(&sample_credential()).await.unwrap_err();
            assert!(matches!(err, crate::error::ApiError::Estimation(_)));
        });
    }
}
