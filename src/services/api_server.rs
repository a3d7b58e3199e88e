// src/services/api_server.rs
//! REST API for the credential registry.
//!
//! One handler per endpoint: validate the input, delegate to the matching
//! service, serialize the outcome. Failures propagate as `ApiError` and are
//! mapped to HTTP statuses in a single place (`ApiError::into_response`),
//! so no handler carries its own status-code plumbing.
//!
//! Endpoints:
//! - Credentials: issuance and signature validation
//! - Roles: admin/institution/student/employer mutations and predicates
//! - Documents: registration, listing by sender, hash verification

use crate::error::ApiError;
use crate::models::credential::Credential;
use crate::models::document::DocumentRecord;
use crate::services::credential_issuer::CredentialIssuer;
use crate::services::document_registry::{DocumentRegistry, RegisteredDocument};
use crate::services::role_registry::RoleRegistry;
use crate::services::validators::{self, FieldReader};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use ethers::providers::JsonRpcClient;
use ethers_core::types::H256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

// API request and response structures

/// Response carrying only a transaction hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionResponse {
    transaction_hash: String,
}

/// Response for credential issuance.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueCredentialResponse {
    transaction_hash: String,
    credential_hash: H256,
    signature: String,
}

/// Response for credential validation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateCredentialResponse {
    is_valid: bool,
}

/// Response for the role predicate endpoints.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleCheckResponse {
    valid_role: bool,
}

/// Response for document verification.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyDocumentResponse {
    verified: bool,
}

/// Query parameters accepted by `GET /documents`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentsQuery {
    address_sender: Option<String>,
}

/// API server state holding the service layer.
///
/// # Type Parameters
/// * `P` - JSON-RPC transport of the underlying chain client
pub struct ApiServer<P> {
    issuer: Arc<CredentialIssuer<P>>,
    roles: Arc<RoleRegistry<P>>,
    documents: Arc<DocumentRegistry<P>>,
}

impl<P: JsonRpcClient + 'static> ApiServer<P> {
    pub fn new(
        issuer: CredentialIssuer<P>,
        roles: RoleRegistry<P>,
        documents: DocumentRegistry<P>,
    ) -> Self {
        ApiServer {
            issuer: Arc::new(issuer),
            roles: Arc::new(roles),
            documents: Arc::new(documents),
        }
    }

    /// Builds the route table.
    pub fn router(self) -> Router {
        Router::new()
            .route("/issue-credential", post(Self::issue_credential_handler))
            .route(
                "/validate-credential",
                post(Self::validate_credential_handler),
            )
            .route("/set-admin", post(Self::set_admin_handler))
            .route("/set-institution", post(Self::set_institution_handler))
            .route("/set-student", post(Self::set_student_handler))
            .route("/set-employer", post(Self::set_employer_handler))
            .route("/is-institution", post(Self::is_institution_handler))
            .route("/is-student", post(Self::is_student_handler))
            .route("/is-employer", post(Self::is_employer_handler))
            .route(
                "/documents",
                get(Self::list_documents_handler).post(Self::register_document_handler),
            )
            .route("/documents/verify", post(Self::verify_document_handler))
            .layer(CorsLayer::permissive())
            .with_state(Arc::new(self))
    }

    /// Binds the listener and serves requests until shutdown.
    pub async fn run(self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    // =====================
    // Credential Handlers
    // =====================

    /// Issues a credential: hash the fields, sign the hash, submit the
    /// issuance transaction.
    ///
    /// # Endpoint
    /// POST /issue-credential
    ///
    /// # Responses
    /// - 200 OK: `{transactionHash, credentialHash, signature}`
    /// - 400 Bad Request: missing or malformed fields
    /// - 500 Internal Server Error: chain interaction failed
    async fn issue_credential_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<Json<IssueCredentialResponse>, ApiError> {
        let mut fields = FieldReader::new(&body);
        let education_address = fields.address("educationAddress");
        let student_address = fields.address("studentAddress");
        let credential_type = fields.string("credentialType");
        let credential_details = fields.string("credentialDetails");
        let credential_date = fields.string("credentialDate");
        fields.finish()?;

        // finish() guarantees every requested field parsed
        let (
            Some(education_address),
            Some(student_address),
            Some(credential_type),
            Some(credential_details),
            Some(credential_date),
        ) = (
            education_address,
            student_address,
            credential_type,
            credential_details,
            credential_date,
        )
        else {
            return Err(ApiError::Validation("incomplete request".into()));
        };
        let credential = Credential {
            education_address,
            student_address,
            credential_type,
            credential_details,
            credential_date,
        };

        let issued = state.issuer.issue(&credential).await?;
        Ok(Json(IssueCredentialResponse {
            transaction_hash: format!("0x{:x}", issued.transaction_hash),
            credential_hash: issued.credential_hash,
            signature: format!("0x{}", issued.signature),
        }))
    }

    /// Validates a credential signature against the claimed institution.
    ///
    /// # Endpoint
    /// POST /validate-credential
    ///
    /// # Responses
    /// - 200 OK: `{isValid}`
    /// - 400 Bad Request: missing or malformed fields
    /// - 500 Internal Server Error: signature recovery failed
    async fn validate_credential_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<Json<ValidateCredentialResponse>, ApiError> {
        let mut fields = FieldReader::new(&body);
        let credential_hash = fields.hash("credentialHash");
        let signature = fields.signature("signature");
        let education_address = fields.address("educationAddress");
        fields.finish()?;

        let (Some(credential_hash), Some(signature), Some(education_address)) =
            (credential_hash, signature, education_address)
        else {
            return Err(ApiError::Validation("incomplete request".into()));
        };
        let is_valid = state
            .issuer
            .validate(credential_hash, &signature, education_address)?;
        Ok(Json(ValidateCredentialResponse { is_valid }))
    }

    // =====================
    // Role Handlers
    // =====================

    /// Transfers the admin role.
    ///
    /// # Endpoint
    /// POST /set-admin
    async fn set_admin_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<Json<TransactionResponse>, ApiError> {
        let mut fields = FieldReader::new(&body);
        let new_admin = fields.address("newAdmin");
        fields.finish()?;
        let Some(new_admin) = new_admin else {
            return Err(ApiError::Validation("incomplete request".into()));
        };

        let tx_hash = state.roles.set_admin(new_admin).await?;
        Ok(Json(TransactionResponse {
            transaction_hash: format!("0x{:x}", tx_hash),
        }))
    }

    /// Registers an institution record.
    ///
    /// # Endpoint
    /// POST /set-institution
    async fn set_institution_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<Json<TransactionResponse>, ApiError> {
        let mut fields = FieldReader::new(&body);
        let institution_address = fields.address("institutionAddress");
        let institution_name = fields.string("institutionName");
        fields.finish()?;
        let (Some(institution_address), Some(institution_name)) =
            (institution_address, institution_name)
        else {
            return Err(ApiError::Validation("incomplete request".into()));
        };

        let tx_hash = state
            .roles
            .set_institution(institution_address, institution_name)
            .await?;
        Ok(Json(TransactionResponse {
            transaction_hash: format!("0x{:x}", tx_hash),
        }))
    }

    /// Registers a student record.
    ///
    /// # Endpoint
    /// POST /set-student
    async fn set_student_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<Json<TransactionResponse>, ApiError> {
        let mut fields = FieldReader::new(&body);
        let student_address = fields.address("studentAddress");
        let name = fields.string("name");
        let student_id = fields.string("studentId");
        fields.finish()?;
        let (Some(student_address), Some(name), Some(student_id)) =
            (student_address, name, student_id)
        else {
            return Err(ApiError::Validation("incomplete request".into()));
        };

        let tx_hash = state
            .roles
            .set_student(student_address, name, student_id)
            .await?;
        Ok(Json(TransactionResponse {
            transaction_hash: format!("0x{:x}", tx_hash),
        }))
    }

    /// Registers an employer record.
    ///
    /// # Endpoint
    /// POST /set-employer
    async fn set_employer_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<Json<TransactionResponse>, ApiError> {
        let mut fields = FieldReader::new(&body);
        let employer_address = fields.address("employerAddress");
        fields.finish()?;
        let Some(employer_address) = employer_address else {
            return Err(ApiError::Validation("incomplete request".into()));
        };

        let tx_hash = state.roles.set_employer(employer_address).await?;
        Ok(Json(TransactionResponse {
            transaction_hash: format!("0x{:x}", tx_hash),
        }))
    }

    /// Checks the institution role of an address.
    ///
    /// # Endpoint
    /// POST /is-institution
    async fn is_institution_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<Json<RoleCheckResponse>, ApiError> {
        let mut fields = FieldReader::new(&body);
        let address = fields.address("address");
        fields.finish()?;
        let Some(address) = address else {
            return Err(ApiError::Validation("incomplete request".into()));
        };

        let valid_role = state.roles.is_institution(address).await?;
        Ok(Json(RoleCheckResponse { valid_role }))
    }

    /// Checks the student role of an address.
    ///
    /// # Endpoint
    /// POST /is-student
    async fn is_student_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<Json<RoleCheckResponse>, ApiError> {
        let mut fields = FieldReader::new(&body);
        let address = fields.address("address");
        fields.finish()?;
        let Some(address) = address else {
            return Err(ApiError::Validation("incomplete request".into()));
        };

        let valid_role = state.roles.is_student(address).await?;
        Ok(Json(RoleCheckResponse { valid_role }))
    }

    /// Checks the employer role of an address.
    ///
    /// # Endpoint
    /// POST /is-employer
    async fn is_employer_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<Json<RoleCheckResponse>, ApiError> {
        let mut fields = FieldReader::new(&body);
        let address = fields.address("address");
        fields.finish()?;
        let Some(address) = address else {
            return Err(ApiError::Validation("incomplete request".into()));
        };

        let valid_role = state.roles.is_employer(address).await?;
        Ok(Json(RoleCheckResponse { valid_role }))
    }

    // =====================
    // Document Handlers
    // =====================

    /// Lists documents registered by a sender.
    ///
    /// # Endpoint
    /// GET /documents?addressSender=0x...
    ///
    /// # Responses
    /// - 200 OK: JSON array of document records
    /// - 400 Bad Request: missing or malformed `addressSender`
    /// - 500 Internal Server Error: chain read failed
    async fn list_documents_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Query(query): Query<DocumentsQuery>,
    ) -> Result<Json<Vec<DocumentRecord>>, ApiError> {
        let sender = validators::sender_query(query.address_sender.as_deref())?;
        let records = state.documents.list(sender).await?;
        Ok(Json(records))
    }

    /// Registers a document; the record is identified by the Keccak-256
    /// hash of its metadata.
    ///
    /// # Endpoint
    /// POST /documents
    ///
    /// # Responses
    /// - 201 Created: the registered document record
    /// - 400 Bad Request: missing or malformed fields
    /// - 500 Internal Server Error: chain submission failed
    async fn register_document_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<(StatusCode, Json<RegisteredDocument>), ApiError> {
        let mut fields = FieldReader::new(&body);
        let address_sender = fields.address("addressSender");
        let doc_type = fields.string("docType");
        let doc_metadata = fields.string("docMetadata");
        fields.finish()?;
        let (Some(address_sender), Some(doc_type), Some(doc_metadata)) =
            (address_sender, doc_type, doc_metadata)
        else {
            return Err(ApiError::Validation("incomplete request".into()));
        };

        let registered = state
            .documents
            .register(address_sender, doc_type, doc_metadata)
            .await?;
        Ok((StatusCode::CREATED, Json(registered)))
    }

    /// Verifies a document hash against its claimed sender.
    ///
    /// # Endpoint
    /// POST /documents/verify
    ///
    /// # Responses
    /// - 201 Created: `{verified}`
    /// - 400 Bad Request: missing or malformed fields
    /// - 500 Internal Server Error: chain read failed
    async fn verify_document_handler(
        State(state): State<Arc<ApiServer<P>>>,
        Json(body): Json<Value>,
    ) -> Result<(StatusCode, Json<VerifyDocumentResponse>), ApiError> {
        let mut fields = FieldReader::new(&body);
        let document_hash = fields.hash("documentHash");
        let address_sender = fields.address("addressSender");
        fields.finish()?;
        let (Some(document_hash), Some(address_sender)) = (document_hash, address_sender)
        else {
            return Err(ApiError::Validation("incomplete request".into()));
        };

        let verified = state
            .documents
            .verify(document_hash, address_sender)
            .await?;
        Ok((StatusCode::CREATED, Json(VerifyDocumentResponse { verified })))
    }
}
