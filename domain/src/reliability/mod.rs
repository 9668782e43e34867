//! Reliability domain
//!
//! Pure building blocks for surviving flaky dependencies: the failure
//! taxonomy every external error is classified into, and the circuit
//! breaker state machine. The async retry and isolation layers that use
//! them live in the application crate.

pub mod circuit;
pub mod failure;
