//! Record store credentials.

use serde::Deserialize;

use super::error::{AppError, Result};

/// Default REST endpoint of the record store.
pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Settings as they appear on disk. Every key is optional here so that
/// validation can report all missing keys at once.
#[derive(Debug, Default, Deserialize)]
pub struct RawSettings {
    #[serde(rename = "AIRTABLE_API_KEY", default)]
    pub api_key: Option<String>,
    #[serde(rename = "AIRTABLE_BASE_ID", default)]
    pub base_id: Option<String>,
    #[serde(rename = "AIRTABLE_TABLE_NAME", default)]
    pub table_name: Option<String>,
    #[serde(rename = "AIRTABLE_API_URL", default)]
    pub api_url: Option<String>,
}

/// Validated, immutable settings for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub base_id: String,
    pub table_name: String,
    pub api_url: String,
}

// Keep the API key out of debug logs.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"***")
            .field("base_id", &self.base_id)
            .field("table_name", &self.table_name)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = AppError;

    fn try_from(raw: RawSettings) -> Result<Self> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let api_key = present(raw.api_key);
        let base_id = present(raw.base_id);
        let table_name = present(raw.table_name);

        match (api_key, base_id, table_name) {
            (Some(api_key), Some(base_id), Some(table_name)) => Ok(Self {
                api_key,
                base_id,
                table_name,
                api_url: present(raw.api_url).map_or_else(
                    || DEFAULT_API_URL.to_string(),
                    |u| u.trim_end_matches('/').to_string(),
                ),
            }),
            (api_key, base_id, table_name) => {
                let missing: Vec<&str> = [
                    ("AIRTABLE_API_KEY", api_key.is_none()),
                    ("AIRTABLE_BASE_ID", base_id.is_none()),
                    ("AIRTABLE_TABLE_NAME", table_name.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, missing)| missing.then_some(key))
                .collect();

                Err(AppError::Config {
                    message: format!(
                        "Missing required configuration values: {}",
                        missing.join(", ")
                    ),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(key: Option<&str>, base: Option<&str>, table: Option<&str>) -> RawSettings {
        RawSettings {
            api_key: key.map(String::from),
            base_id: base.map(String::from),
            table_name: table.map(String::from),
            api_url: None,
        }
    }

    #[test]
    fn test_complete_settings_validate() {
        let settings = Settings::try_from(raw(Some("key"), Some("app123"), Some("Nodes"))).unwrap();
        assert_eq!(settings.base_id, "app123");
        assert_eq!(settings.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_each_missing_key_is_reported() {
        let err = Settings::try_from(raw(Some("key"), None, Some(""))).unwrap_err();
        let msg = err.to_string();
        assert!(err.is_config());
        assert!(msg.contains("AIRTABLE_BASE_ID"));
        assert!(msg.contains("AIRTABLE_TABLE_NAME"));
        assert!(!msg.contains("AIRTABLE_API_KEY"));
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let mut r = raw(Some("key"), Some("app"), Some("t"));
        r.api_url = Some("http://localhost:9000/v0/".into());
        let settings = Settings::try_from(r).unwrap();
        assert_eq!(settings.api_url, "http://localhost:9000/v0");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let settings = Settings::try_from(raw(Some("secret-token"), Some("a"), Some("t"))).unwrap();
        assert!(!format!("{settings:?}").contains("secret-token"));
    }
}
