//! Application settings storage
//!
//! Stores the Gemini API key and usage stats in a JSON file in the app data
//! directory. The environment variable `GEMINI_API_KEY` always takes
//! precedence over the stored key, so an externally managed credential keeps
//! working without touching the settings file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::session::ApiConfigStatus;

/// Global settings instance
static SETTINGS: RwLock<Option<Settings>> = RwLock::new(None);

/// Path to config file (set during init)
static CONFIG_PATH: RwLock<Option<PathBuf>> = RwLock::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UsageStats {
    #[serde(default)]
    pub total_prompt_tokens: u64,
    #[serde(default)]
    pub total_output_tokens: u64,
    #[serde(default)]
    pub summaries_generated: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub usage_stats: UsageStats,
}

impl Settings {
    /// Load settings from disk or create default
    fn load(path: &PathBuf) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Settings::default(),
            }
        } else {
            Settings::default()
        }
    }

    /// Save settings to disk
    fn save(&self, path: &PathBuf) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, content).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }
}

/// Initialize settings with the app data directory
pub fn init(app_data_dir: PathBuf) {
    let config_path = app_data_dir.join("settings.json");
    let settings = Settings::load(&config_path);

    *CONFIG_PATH.write().unwrap() = Some(config_path);
    *SETTINGS.write().unwrap() = Some(settings);
}

/// Get the current API key (checks env var first, then stored setting)
pub fn get_api_key() -> Option<String> {
    // Environment variable takes precedence
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            return Some(key);
        }
    }

    // Fall back to stored setting
    let guard = SETTINGS.read().ok()?;
    let settings = guard.as_ref()?;
    settings.gemini_api_key.clone()
}

/// Check if an API key is available
pub fn has_api_key() -> bool {
    get_api_key().map(|k| !k.is_empty()).unwrap_or(false)
}

/// Set and save the API key. An empty string clears the stored key.
pub fn set_api_key(key: String) -> Result<(), String> {
    let mut settings_guard = SETTINGS
        .write()
        .map_err(|_| "Failed to acquire settings lock")?;

    let settings = settings_guard.get_or_insert_with(Settings::default);
    settings.gemini_api_key = if key.is_empty() { None } else { Some(key) };

    let config_path = CONFIG_PATH
        .read()
        .map_err(|_| "Failed to acquire config path lock")?
        .clone()
        .ok_or("Settings not initialized")?;

    settings.save(&config_path)?;

    println!("[Settings] Gemini API key saved");
    Ok(())
}

/// Mask a key for display (shows first/last chars only). Counts characters,
/// not bytes, so a key holding multibyte UTF-8 never panics on a slice.
fn mask_key(key: &str) -> String {
    let char_count = key.chars().count();
    if char_count > 12 {
        let prefix: String = key.chars().take(8).collect();
        let suffix: String = key.chars().skip(char_count - 4).collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "*".repeat(char_count)
    }
}

/// Get masked API key for display
pub fn get_masked_api_key() -> Option<String> {
    get_api_key().map(|key| mask_key(&key))
}

/// Derive the configuration status for the current interaction cycle.
/// Rechecks the credential sources every time, so a key rotated externally
/// takes effect on the next cycle.
pub fn api_status() -> ApiConfigStatus {
    match get_api_key() {
        Some(key) if !key.is_empty() => ApiConfigStatus {
            configured: true,
            error: None,
            masked_key: Some(mask_key(&key)),
        },
        _ => ApiConfigStatus {
            configured: false,
            error: Some(
                "Required credential GEMINI_API_KEY not found. Set the environment \
                 variable or save a key in Settings."
                    .to_string(),
            ),
            masked_key: None,
        },
    }
}

// ==================== Usage Stats ====================

/// Get accumulated usage stats
pub fn get_usage_stats() -> UsageStats {
    let guard = SETTINGS.read().ok();
    guard
        .as_ref()
        .and_then(|g| g.as_ref())
        .map(|s| s.usage_stats.clone())
        .unwrap_or_default()
}

/// Add Gemini API token usage from one summarization call
pub fn add_gemini_tokens(prompt_tokens: u64, output_tokens: u64) -> Result<(), String> {
    let mut settings_guard = SETTINGS
        .write()
        .map_err(|_| "Failed to acquire settings lock")?;

    let settings = settings_guard.get_or_insert_with(Settings::default);
    settings.usage_stats.total_prompt_tokens += prompt_tokens;
    settings.usage_stats.total_output_tokens += output_tokens;
    settings.usage_stats.summaries_generated += 1;

    let config_path = CONFIG_PATH
        .read()
        .map_err(|_| "Failed to acquire config path lock")?
        .clone()
        .ok_or("Settings not initialized")?;

    settings.save(&config_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings {
            gemini_api_key: Some("AIzaSyTestKey1234567890".to_string()),
            usage_stats: UsageStats {
                total_prompt_tokens: 1200,
                total_output_tokens: 310,
                summaries_generated: 3,
            },
        };
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded.gemini_api_key, settings.gemini_api_key);
        assert_eq!(loaded.usage_stats.total_prompt_tokens, 1200);
        assert_eq!(loaded.usage_stats.summaries_generated, 3);
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load(&dir.path().join("nope.json"));
        assert!(loaded.gemini_api_key.is_none());
        assert_eq!(loaded.usage_stats.summaries_generated, 0);
    }

    #[test]
    fn test_load_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let loaded = Settings::load(&path);
        assert!(loaded.gemini_api_key.is_none());
    }

    #[test]
    fn test_mask_key_hides_middle() {
        let masked = mask_key("AIzaSyABCDEFGHIJKLMNOP");
        assert_eq!(masked, "AIzaSyAB...MNOP");
        assert!(!masked.contains("CDEFGHIJKL"));
    }

    #[test]
    fn test_mask_key_short_keys_fully_hidden() {
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn test_mask_key_handles_multibyte_keys() {
        // '€' is three bytes; byte-index slicing would land mid-codepoint
        let masked = mask_key(&"€".repeat(14));
        assert_eq!(masked, format!("{}...{}", "€".repeat(8), "€".repeat(4)));

        let mixed = mask_key("AIzaSy€€rest-of-key-here");
        assert!(mixed.starts_with("AIzaSy€€"));
        assert!(mixed.ends_with("here"));

        // Short multibyte keys are fully hidden, one star per character
        assert_eq!(mask_key("€€€€€"), "*****");
    }
}
