//! User-facing status texts.

use chemviz_core::dataset::DatasetId;

pub const LOGIN_SUCCESS: &str = "Login successful! Welcome.";
pub const LOGIN_FAILED: &str = "Login failed. Check username and password.";
pub const NOT_LOGGED_IN: &str = "Please log in first.";
pub const CREDENTIALS_REQUIRED: &str = "Username and password are required.";
pub const REGISTRATION_SUCCESS: &str = "Registration successful! Please log in.";
pub const HISTORY_FAILED: &str = "Failed to load history data.";
pub const SELECT_FILE_FIRST: &str = "Please select a file first.";
pub const UPLOADING: &str = "Uploading and analyzing data...";
pub const UPLOAD_IN_PROGRESS: &str = "An upload is already in progress.";
pub const SUMMARY_FAILED: &str = "Failed to retrieve dataset summary.";
pub const REPORT_FAILED: &str = "Failed to generate or download PDF report.";

pub fn password_too_short(min_length: usize) -> String {
    format!("Password must be at least {} characters long.", min_length)
}

pub fn file_selected(name: &str) -> String {
    format!("Selected file: {}", name)
}

pub fn upload_success(name: &str) -> String {
    format!("Upload success: {}. Processing complete.", name)
}

pub fn upload_history_failed(name: &str) -> String {
    format!("Upload success: {}. {}", name, HISTORY_FAILED)
}

pub fn loading_summary(id: DatasetId) -> String {
    format!("Loading summary for dataset ID {}...", id)
}

pub fn summary_loaded(id: DatasetId) -> String {
    format!("Loaded summary for dataset ID {}.", id)
}

pub fn report_saved(file: &str) -> String {
    format!("PDF Report downloaded successfully as {}.", file)
}

pub fn entry_deleted(id: DatasetId) -> String {
    format!("Deleted dataset ID {}.", id)
}

pub fn delete_failed(id: DatasetId) -> String {
    format!("Failed to delete dataset ID {}.", id)
}
