// src/services/role_registry.rs
//! Role management against the registry contract.
//!
//! Role mutations are transactions: `setAdmin` is signed locally with the
//! service key from the service account, while institution/student/employer
//! assignments are sent unsigned from the admin account for the node to
//! sign with its managed key. Role predicates are zero-cost read calls.

use crate::blockchain::eth_client::{EthClient, SigningPolicy};
use crate::contracts::credential_registry::CredentialRegistry;
use crate::error::ApiResult;
use ethers::providers::JsonRpcClient;
use ethers_core::types::{Address, Bytes, H256};
use std::sync::Arc;

pub struct RoleRegistry<P> {
    client: Arc<EthClient<P>>,
    registry: Arc<CredentialRegistry>,
    /// Sender of locally signed role mutations.
    account_address: Address,
    /// Sender of node-signed role mutations.
    admin_address: Address,
}

impl<P: JsonRpcClient + 'static> RoleRegistry<P> {
    pub fn new(
        client: Arc<EthClient<P>>,
        registry: Arc<CredentialRegistry>,
        account_address: Address,
        admin_address: Address,
    ) -> Self {
        RoleRegistry {
            client,
            registry,
            account_address,
            admin_address,
        }
    }

    /// Transfers the admin role to `new_admin`.
    pub async fn set_admin(&self, new_admin: Address) -> ApiResult<H256> {
        let data = self.registry.set_admin(new_admin)?;
        self.client
            .submit(
                self.account_address,
                self.registry.address(),
                data,
                SigningPolicy::LocalKey,
            )
            .await
    }

    /// Registers an institution record for `institution`.
    pub async fn set_institution(&self, institution: Address, name: String) -> ApiResult<H256> {
        let data = self.registry.set_institution(institution, name)?;
        self.submit_as_admin(data).await
    }

    /// Registers a student record for `student`.
    pub async fn set_student(
        &self,
        student: Address,
        name: String,
        student_id: String,
    ) -> ApiResult<H256> {
        let data = self.registry.set_student(student, name, student_id)?;
        self.submit_as_admin(data).await
    }

    /// Registers an employer record for `employer`.
    pub async fn set_employer(&self, employer: Address) -> ApiResult<H256> {
        let data = self.registry.set_employer(employer)?;
        self.submit_as_admin(data).await
    }

    pub async fn is_institution(&self, account: Address) -> ApiResult<bool> {
        let data = self.registry.is_institution(account)?;
        self.check("isInstitution", data).await
    }

    pub async fn is_student(&self, account: Address) -> ApiResult<bool> {
        let data = self.registry.is_student(account)?;
        self.check("isStudent", data).await
    }

    pub async fn is_employer(&self, account: Address) -> ApiResult<bool> {
        let data = self.registry.is_employer(account)?;
        self.check("isEmployer", data).await
    }

    async fn submit_as_admin(&self, data: Bytes) -> ApiResult<H256> {
        self.client
            .submit(
                self.admin_address,
                self.registry.address(),
                data,
                SigningPolicy::NodeManaged,
            )
            .await
    }

    async fn check(&self, method: &str, data: Bytes) -> ApiResult<bool> {
        let output = self.client.call(self.registry.address(), data).await?;
        self.registry.decode_role_flag(method, &output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto;
    use ethers::providers::{MockProvider, Provider};
    use ethers_core::abi::{encode, Token};
    use ethers_core::types::U256;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn roles() -> (RoleRegistry<MockProvider>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        let wallet = crypto::wallet_from_hex(TEST_KEY, 1337).unwrap();
        let client = Arc::new(EthClient::new(provider, wallet, 1337));
        let registry = Arc::new(
            CredentialRegistry::new(
                "0x1111111111111111111111111111111111111111"
                    .parse()
                    .unwrap(),
            )
            .unwrap(),
        );
        (
            RoleRegistry::new(
                client,
                registry,
                Address::repeat_byte(0x0a),
                Address::repeat_byte(0x0b),
            ),
            mock,
        )
    }

    #[test]
    fn role_predicate_decodes_the_contract_flag() {
        tokio_test::block_on(async {
            let (roles, mock) = roles();
            mock.push::<Bytes, _>(Bytes::from(encode(&[Token::Bool(true)]))).unwrap();
            assert!(roles.is_institution(Address::repeat_byte(0x01)).await.unwrap());

            mock.push::<Bytes, _>(Bytes::from(encode(&[Token::Bool(false)]))).unwrap();
            assert!(!roles.is_employer(Address::repeat_byte(0x02)).await.unwrap());
        });
    }

    #[test]
    fn node_signed_mutation_returns_the_tx_hash() {
        tokio_test::block_on(async {
            let (roles, mock) = roles();
            let tx_hash = H256::repeat_byte(0x33);
            mock.push(tx_hash).unwrap();
            mock.push(U256::one()).unwrap();
            mock.push(U256::from(60_000)).unwrap();

            let got = roles
                .set_institution(Address::repeat_byte(0x04), "Example University".into())
                .await
                .unwrap();
            assert_eq!(got, tx_hash);
        });
    }

    #[test]
    fn locally_signed_admin_mutation_returns_the_tx_hash() {
        tokio_test::block_on(async {
            let (roles, mock) = roles();
            let tx_hash = H256::repeat_byte(0x44);
            mock.push(tx_hash).unwrap();
            mock.push(U256::zero()).unwrap();
            mock.push(U256::one()).unwrap();
            mock.push(U256::from(40_000)).unwrap();

            let got = roles.set_admin(Address::repeat_byte(0x05)).await.unwrap();
            assert_eq!(got, tx_hash);
        });
    }
}
