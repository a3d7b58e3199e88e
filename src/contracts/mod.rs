// src/contracts/mod.rs

pub mod credential_registry;
