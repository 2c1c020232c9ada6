//! Infrastructure layer for the Chemviz client.
//!
//! Filesystem-facing pieces: config file location and loading, reading upload
//! files from disk, and saving downloaded reports.

pub mod config_service;
pub mod paths;
pub mod report_sink;
pub mod upload_source;

pub use config_service::ConfigService;
pub use paths::ChemVizPaths;
pub use report_sink::FileReportSink;
pub use upload_source::read_upload_file;
