//! # Greenlight Core
//!
//! The domain layer of the greenlight approval workflow.
//! This crate contains the post lifecycle state machine and the ports
//! infrastructure must implement; it has no infrastructure dependencies
//! of its own.

pub mod domain;
pub mod error;
pub mod ports;
pub mod workflow;

pub use error::DomainError;
pub use workflow::Workflow;
