//! Reading a dataset file from disk for upload.

use chemviz_core::dataset::UploadFile;
use chemviz_core::{ChemVizError, Result};
use std::path::Path;

/// Reads `path` into an [`UploadFile`].
///
/// The extension must be in `allowed_extensions` (case-insensitive, no dot)
/// and the file must be non-empty. These checks run before any network call.
pub async fn read_upload_file(path: &Path, allowed_extensions: &[String]) -> Result<UploadFile> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ChemVizError::validation("Please select a valid file."))?
        .to_string();

    check_extension(&file_name, allowed_extensions)?;

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ChemVizError::validation("Please select a valid file."));
        }
        Err(e) => return Err(e.into()),
    };

    if bytes.is_empty() {
        return Err(ChemVizError::validation(format!(
            "The selected file '{}' is empty.",
            file_name
        )));
    }

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    tracing::debug!(
        "[UploadSource] Read {} ({} bytes, {})",
        file_name,
        bytes.len(),
        mime_type
    );

    Ok(UploadFile::new(file_name, mime_type, bytes))
}

fn check_extension(file_name: &str, allowed_extensions: &[String]) -> Result<()> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let allowed = extension
        .as_deref()
        .map(|ext| {
            allowed_extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false);

    if allowed {
        Ok(())
    } else {
        let list = allowed_extensions
            .iter()
            .map(|ext| format!(".{}", ext.trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join(", ");
        Err(ChemVizError::validation(format!(
            "Unsupported file format for '{}'. Allowed: {}",
            file_name, list
        )))
    }
}
