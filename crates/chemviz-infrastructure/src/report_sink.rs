//! Saving downloaded reports to disk.
//!
//! Bytes are written to a temporary file in the target directory and only
//! renamed into place once fully written. The temporary file is removed on
//! every failure path when it is dropped.

use async_trait::async_trait;
use chemviz_core::dataset::ReportSink;
use chemviz_core::{ChemVizError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes reports into a directory, never overwriting an existing file.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    directory: PathBuf,
}

impl FileReportSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let directory = self.directory.clone();
        let filename = filename.to_string();
        let bytes = bytes.to_vec();

        tokio::task::spawn_blocking(move || save_blocking(&directory, &filename, &bytes))
            .await
            .map_err(|e| ChemVizError::internal(format!("Report save task failed: {}", e)))?
    }
}

/// Suffixes tried before giving up on a free name.
const MAX_SUFFIX: u32 = 1000;

fn save_blocking(directory: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)?;

    let mut temp = NamedTempFile::new_in(directory)?;
    temp.write_all(bytes)?;
    temp.flush()?;

    for n in 0..=MAX_SUFFIX {
        let target = numbered_target(directory, filename, n);
        // The rename itself refuses an existing target, so a file created
        // concurrently is never replaced.
        match temp.persist_noclobber(&target) {
            Ok(_) => {
                tracing::info!("[FileReportSink] Saved report to {}", target.display());
                return Ok(target);
            }
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => temp = e.file,
            // Dropping the PersistError deletes the temp file.
            Err(e) => return Err(e.error.into()),
        }
    }

    Err(ChemVizError::io(format!(
        "No free file name for {} in {}",
        filename,
        directory.display()
    )))
}

/// `name.pdf` for 0, then `name (1).pdf`, `name (2).pdf`, ...
fn numbered_target(directory: &Path, filename: &str, n: u32) -> PathBuf {
    if n == 0 {
        return directory.join(filename);
    }

    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => directory.join(format!("{} ({}).{}", stem, n, ext)),
        None => directory.join(format!("{} ({})", stem, n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_saves_report_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let sink = FileReportSink::new(temp_dir.path());

        let path = sink.save("report_1.pdf", b"%PDF-1.4").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
        assert_eq!(entries(temp_dir.path()), vec!["report_1.pdf"]);
    }

    #[tokio::test]
    async fn test_does_not_overwrite_existing_report() {
        let temp_dir = TempDir::new().unwrap();
        let sink = FileReportSink::new(temp_dir.path());

        sink.save("report_1.pdf", b"first").await.unwrap();
        let second = sink.save("report_1.pdf", b"second").await.unwrap();

        assert!(second.ends_with("report_1 (1).pdf"));
        assert_eq!(
            entries(temp_dir.path()),
            vec!["report_1 (1).pdf", "report_1.pdf"]
        );
    }

    #[test]
    fn test_taken_names_are_skipped_without_overwriting() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("report_2.pdf"), b"old").unwrap();
        std::fs::write(temp_dir.path().join("report_2 (1).pdf"), b"older").unwrap();

        let path = save_blocking(temp_dir.path(), "report_2.pdf", b"new").unwrap();

        assert!(path.ends_with("report_2 (2).pdf"));
        assert_eq!(std::fs::read(temp_dir.path().join("report_2.pdf")).unwrap(), b"old");
        assert_eq!(
            std::fs::read(temp_dir.path().join("report_2 (1).pdf")).unwrap(),
            b"older"
        );
        assert_eq!(entries(temp_dir.path()).len(), 3);
    }

    #[test]
    fn test_numbered_target_without_extension() {
        let dir = Path::new("/reports");
        assert_eq!(numbered_target(dir, "summary", 0), dir.join("summary"));
        assert_eq!(numbered_target(dir, "summary", 3), dir.join("summary (3)"));
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("reports").join("2024");
        let sink = FileReportSink::new(&nested);

        let path = sink.save("r.pdf", b"x").await.unwrap();
        assert!(path.starts_with(&nested));
    }
}
