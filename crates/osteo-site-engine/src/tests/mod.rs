use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary content directory
pub fn create_test_content_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a file with content inside the content directory
pub fn create_test_file(content_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = content_dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}
