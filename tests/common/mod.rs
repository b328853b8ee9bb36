use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Writes `contents` to `config.yaml` inside a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the path is used.
#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Minimal config accepted by `Config::validate`.
#[allow(dead_code)]
pub const VALID_CONFIG: &str = "slack:\n  client_id: \"12345.67890\"\n  client_secret: shh\n";
