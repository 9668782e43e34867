//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod debate_controller;
pub mod research_manager;
pub mod run_debate;
pub mod session;
