//! Session domain module.
//!
//! # Module Structure
//!
//! - `state`: Client state (`ClientState`), derived phase (`SessionPhase`), `Session`
//! - `status`: The user-visible status line (`StatusMessage`)

mod state;
mod status;

// Re-export public API
pub use state::{ClientState, Session, SessionPhase};
pub use status::{StatusKind, StatusMessage};
