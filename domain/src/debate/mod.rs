//! Debate domain
//!
//! The data model of a two-sided debate: sides, what each side's generator
//! delivered, the judge's verdict, the per-round audit record and the
//! per-debate state machine.
//!
//! # Round lifecycle
//!
//! ```text
//! begin_round ─▶ record_argument (bull ‖ bear) ─▶ close_rendezvous ─▶ complete_round
//!      ▲                                                                    │
//!      └──────────────────────── Continue ◀─────────────────────────────────┤
//!                                                                 Finalize ─▶ complete
//! ```

pub mod argument;
pub mod phase;
pub mod record;
pub mod research;
pub mod side;
pub mod state;
pub mod verdict;
