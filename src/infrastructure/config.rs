//! Settings file loading.
//!
//! Credentials for the record store live in a JSON file next to where the
//! tool is run. A missing file or key aborts the run before any other work.

use std::fs;
use std::path::Path;

use crate::domain::{AppError, RawSettings, Result, Settings};

/// Default settings file name, resolved against the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "config.json";

/// Load and validate settings from `path`.
///
/// # Errors
/// Returns error if the file is missing, unreadable, not JSON, or lacks a
/// required key.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Err(AppError::SettingsNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read settings file: {}", path.display()), e))?;

    let raw: RawSettings = serde_json::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })?;

    let settings = Settings::try_from(raw)?;
    tracing::debug!(?settings, "Settings loaded");

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_complete_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "AIRTABLE_API_KEY": "patXYZ",
                "AIRTABLE_BASE_ID": "appABC",
                "AIRTABLE_TABLE_NAME": "Mesh Nodes"
            }"#,
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.api_key, "patXYZ");
        assert_eq!(settings.table_name, "Mesh Nodes");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_settings(&dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, AppError::SettingsNotFound { .. }));
        assert!(err.is_config());
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "AIRTABLE_API_KEY": "patXYZ", "AIRTABLE_BASE_ID": "appABC" }"#,
        )
        .unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("AIRTABLE_TABLE_NAME"));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "AIRTABLE_API_KEY=patXYZ").unwrap();

        assert!(load_settings(&path).unwrap_err().is_config());
    }
}
