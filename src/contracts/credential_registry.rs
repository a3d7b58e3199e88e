// src/contracts/credential_registry.rs
//! Registry smart contract interface.
//!
//! Exposes each callable method of the deployed contract as a typed
//! operation over its compile-time ABI. Argument order follows the ABI
//! declarations exactly; the chain does not reject reordered arguments of
//! the same type, so every call site goes through these methods.
//!
//! Read-only methods (`is*`, document queries) produce calldata for
//! zero-cost `eth_call`s; state-changing methods produce calldata that must
//! go through transaction submission.

use crate::error::{ApiError, ApiResult};
use crate::models::credential::Credential;
use crate::models::document::DocumentRecord;
use ethers_contract::BaseContract;
use ethers_core::abi::{Abi, Token, Tokenize};
use ethers_core::types::{Address, Bytes, Signature, H256};

/// Typed wrapper over the registry contract ABI.
pub struct CredentialRegistry {
    abi: Abi,
    contract: BaseContract,
    address: Address,
}

impl CredentialRegistry {
    /// Loads the compiled ABI and binds it to the deployed address.
    pub fn new(address: Address) -> ApiResult<Self> {
        let abi = Abi::load(include_bytes!("../abi/CredentialRegistry.json") as &[u8])
            .map_err(|e| ApiError::Contract(format!("failed to load registry ABI: {e}")))?;
        Ok(CredentialRegistry {
            contract: BaseContract::from(abi.clone()),
            abi,
            address,
        })
    }

    /// Deployed contract address; the `to` field of every call.
    pub fn address(&self) -> Address {
        self.address
    }

    fn encode(&self, method: &str, args: impl Tokenize) -> ApiResult<Bytes> {
        self.contract
            .encode(method, args)
            .map_err(|e| ApiError::Contract(format!("failed to encode {method} call: {e}")))
    }

    fn function_output(&self, method: &str, data: &Bytes) -> ApiResult<Vec<Token>> {
        self.abi
            .function(method)
            .and_then(|function| function.decode_output(data.as_ref()))
            .map_err(|e| ApiError::Contract(format!("failed to decode {method} output: {e}")))
    }

    /// Calldata for `issueCredential`.
    pub fn issue_credential(
        &self,
        credential: &Credential,
        signature: &Signature,
    ) -> ApiResult<Bytes> {
        self.encode(
            "issueCredential",
            (
                credential.education_address,
                credential.student_address,
                credential.credential_type.clone(),
                credential.credential_details.clone(),
                credential.credential_date.clone(),
                Bytes::from(signature.to_vec()),
            ),
        )
    }

    pub fn set_admin(&self, new_admin: Address) -> ApiResult<Bytes> {
        self.encode("setAdmin", new_admin)
    }

    pub fn set_institution(&self, institution: Address, name: String) -> ApiResult<Bytes> {
        self.encode("setInstitution", (institution, name))
    }

    pub fn set_student(
        &self,
        student: Address,
        name: String,
        student_id: String,
    ) -> ApiResult<Bytes> {
        self.encode("setStudent", (student, name, student_id))
    }

    pub fn set_employer(&self, employer: Address) -> ApiResult<Bytes> {
        self.encode("setEmployer", employer)
    }

    pub fn is_institution(&self, account: Address) -> ApiResult<Bytes> {
        self.encode("isInstitution", account)
    }

    pub fn is_student(&self, account: Address) -> ApiResult<Bytes> {
        self.encode("isStudent", account)
    }

    pub fn is_employer(&self, account: Address) -> ApiResult<Bytes> {
        self.encode("isEmployer", account)
    }

    pub fn register_document(
        &self,
        doc_type: String,
        doc_metadata: String,
        document_hash: H256,
    ) -> ApiResult<Bytes> {
        self.encode("registerDocument", (doc_type, doc_metadata, document_hash))
    }

    pub fn documents_by_sender(&self, sender: Address) -> ApiResult<Bytes> {
        self.encode("getDocumentsBySender", sender)
    }

    pub fn verify_document(&self, document_hash: H256) -> ApiResult<Bytes> {
        self.encode("verifyDocument", document_hash)
    }

    /// Decodes the boolean returned by the `is*` role predicates.
    pub fn decode_role_flag(&self, method: &str, data: &Bytes) -> ApiResult<bool> {
        self.contract
            .decode_output::<bool, _>(method, data)
            .map_err(|e| ApiError::Contract(format!("failed to decode {method} output: {e}")))
    }

    /// Decodes the document array returned by `getDocumentsBySender`.
    pub fn decode_documents(&self, data: &Bytes) -> ApiResult<Vec<DocumentRecord>> {
        let mut tokens = self.function_output("getDocumentsBySender", data)?;
        let entries = match tokens.pop() {
            Some(Token::Array(entries)) if tokens.is_empty() => entries,
            other => {
                return Err(ApiError::Contract(format!(
                    "unexpected getDocumentsBySender output: {other:?}"
                )))
            }
        };
        entries.into_iter().map(Self::decode_document).collect()
    }

    // Field positions mirror the (sender, docType, docMetadata,
    // documentHash, registeredAt) tuple declared in the ABI.
    fn decode_document(token: Token) -> ApiResult<DocumentRecord> {
        let fields = match token {
            Token::Tuple(fields) => fields,
            other => {
                return Err(ApiError::Contract(format!(
                    "unexpected document encoding: {other:?}"
                )))
            }
        };
        match fields.as_slice() {
            [Token::Address(sender), Token::String(doc_type), Token::String(doc_metadata), Token::FixedBytes(hash), Token::Uint(registered_at)]
                if hash.len() == 32 =>
            {
                Ok(DocumentRecord {
                    address_sender: *sender,
                    doc_type: doc_type.clone(),
                    doc_metadata: doc_metadata.clone(),
                    document_hash: H256::from_slice(hash),
                    registered_at: *registered_at,
                })
            }
            other => Err(ApiError::Contract(format!(
                "unexpected document fields: {other:?}"
            ))),
        }
    }

    /// Decodes `verifyDocument` into (registered, registrant).
    pub fn decode_verification(&self, data: &Bytes) -> ApiResult<(bool, Address)> {
        let tokens = self.function_output("verifyDocument", data)?;
        match tokens.as_slice() {
            [Token::Bool(registered), Token::Address(registrant)] => {
                Ok((*registered, *registrant))
            }
            other => Err(ApiError::Contract(format!(
                "unexpected verifyDocument output: {other:?}"
            ))),
        }
    }
}
