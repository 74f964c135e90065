//! Collections backend client: shared wire contract for the netting workflow.
//!
//! Debtor invoice and payment lists, reconciliation create, litigation create.
//! Implements the `collecta-netting` seams so the engine can drive it.
//!
//! No UI concepts. List reads retry with backoff; mutations never retry.

mod auth;
mod client;

pub use auth::{
    auth_file_path, delete_auth, load_auth, load_auth_from, resolve_credentials, save_auth,
    save_auth_to, AuthCredentials, TOKEN_ENV,
};
pub use client::{ClientError, ClientOptions, CollectionsClient, USER_AGENT};
