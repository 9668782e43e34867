//! Argument generator adapters.

mod command;

pub use command::{CommandGenerator, EX_TEMPFAIL};
