//! Application layer for Chemviz.
//!
//! This crate provides the `SessionController`, which coordinates the dataset
//! API and the report sink to drive the client session state machine.

pub mod messages;
pub mod session_controller;

pub use session_controller::SessionController;
