//! # Greenlight Infrastructure
//!
//! Concrete implementations of the ports defined in `greenlight-core`:
//! the disk-backed file store, the JWT session and token-exchange
//! services, and the in-memory post repository used when the external
//! database is not configured.

pub mod auth;
pub mod files;
pub mod repository;

#[cfg(test)]
mod tests;

pub use auth::{CredentialError, JwtConfig, JwtSessionService, JwtTokenExchange, ServiceAccount};
pub use files::DiskFileStore;
pub use repository::InMemoryPostRepository;
