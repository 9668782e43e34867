//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: debate state machine misuse

pub mod error;
