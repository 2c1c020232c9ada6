//! Domain layer for the Chemviz client.
//!
//! Holds the types shared by every other crate: credentials, history entries,
//! summaries, the client state machine, the error taxonomy, and the service
//! traits (`DatasetApi`, `ReportSink`) the application layer is wired with.
//! Nothing in here performs I/O.

pub mod chart;
pub mod config;
pub mod credentials;
pub mod dataset;
pub mod error;
pub mod session;

// Re-export common types
pub use credentials::Credentials;
pub use error::{ChemVizError, Result};
