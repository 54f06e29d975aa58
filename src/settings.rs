use serde::Deserialize;
use std::fs;

const SETTINGS_FILENAME: &str = "settings.json";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub port: u16,
    pub store_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            store_path: "tasks.redb".to_string(),
        }
    }
}

impl Settings {
    /// Read settings.json next to the binary; fall back to defaults when
    /// the file is absent or unparseable.
    pub fn load() -> Settings {
        match fs::read_to_string(SETTINGS_FILENAME) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(error = %e, "invalid {SETTINGS_FILENAME}, using defaults");
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "port": 8080 }"#).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.bind_addr, "0.0.0.0");
        assert_eq!(settings.store_path, "tasks.redb");
    }
}
