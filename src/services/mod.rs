// src/services/mod.rs

pub mod api_server;
pub mod credential_issuer;
pub mod document_registry;
pub mod role_registry;
pub mod validators;
