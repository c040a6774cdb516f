//! Configuration for the walker.
//!
//! Loaded from a TOML file; every field has a default so an absent file or a
//! partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WalkError};
use crate::store::DEFAULT_KEY;

/// Config file name looked up inside the state directory.
pub const CONFIG_FILE: &str = "tilewalk.toml";

/// Environment variable overriding the state directory.
pub const STATE_DIR_ENV: &str = "TILEWALK_STATE_DIR";

/// Labels recognized on an action control.
pub const DEFAULT_ACTION_LABELS: [&str; 6] = [
    "add",
    "add offer",
    "add to card",
    "activate",
    "activate offer",
    "enroll",
];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Tick cadence and settle delays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Period between ticks.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Pause after clicking an action control, before navigating back.
    #[serde(default = "default_activate_settle_ms")]
    pub activate_settle_ms: u64,

    /// Pause after landing on a detour page, before navigating back.
    #[serde(default = "default_detour_settle_ms")]
    pub detour_settle_ms: u64,
}

fn default_period_ms() -> u64 {
    1200
}

fn default_activate_settle_ms() -> u64 {
    350
}

fn default_detour_settle_ms() -> u64 {
    200
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            activate_settle_ms: default_activate_settle_ms(),
            detour_settle_ms: default_detour_settle_ms(),
        }
    }
}

impl ScheduleConfig {
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    #[must_use]
    pub fn activate_settle(&self) -> Duration {
        Duration::from_millis(self.activate_settle_ms)
    }

    #[must_use]
    pub fn detour_settle(&self) -> Duration {
        Duration::from_millis(self.detour_settle_ms)
    }
}

/// How pages are recognized and what is clicked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Substring of the location that marks the list page.
    #[serde(default = "default_hub_marker")]
    pub hub_marker: String,

    /// Regex over the location that marks a detour page.
    #[serde(default = "default_detour_pattern")]
    pub detour_pattern: String,

    /// CSS selector of the selectable items on the list page.
    #[serde(default = "default_item_selector")]
    pub item_selector: String,

    /// CSS selector of candidate action controls on a detail page.
    #[serde(default = "default_control_selector")]
    pub control_selector: String,

    /// Labels an action control may carry (matched case-insensitively).
    #[serde(default = "default_action_labels")]
    pub action_labels: Vec<String>,

    /// Fraction of the viewport height scrolled when more items are needed.
    #[serde(default = "default_scroll_fraction")]
    pub scroll_fraction: f64,
}

fn default_hub_marker() -> String {
    "offer-hub".to_string()
}

fn default_detour_pattern() -> String {
    "(?i)bookmark|bookmarks|favorite|favorites|saved".to_string()
}

fn default_item_selector() -> String {
    r#"div[data-testid="commerce-tile"][role="button"]"#.to_string()
}

fn default_control_selector() -> String {
    "button".to_string()
}

fn default_action_labels() -> Vec<String> {
    DEFAULT_ACTION_LABELS.iter().map(|s| s.to_string()).collect()
}

fn default_scroll_fraction() -> f64 {
    0.9
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            hub_marker: default_hub_marker(),
            detour_pattern: default_detour_pattern(),
            item_selector: default_item_selector(),
            control_selector: default_control_selector(),
            action_labels: default_action_labels(),
            scroll_fraction: default_scroll_fraction(),
        }
    }
}

/// Where the progress record lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_key")]
    pub key: String,
}

fn default_store_key() -> String {
    DEFAULT_KEY.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: default_store_key(),
        }
    }
}

/// Browser attachment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// DevTools websocket URL of a running browser.
    #[serde(default)]
    pub ws_url: Option<String>,

    /// Open a new tab here instead of reusing the first open tab.
    #[serde(default)]
    pub start_url: Option<String>,
}

impl WalkConfig {
    /// Load configuration from an explicit file, or `<state_dir>/tilewalk.toml`
    /// when present, else defaults. The result is validated.
    pub fn load(explicit: Option<&Path>, state_dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(WalkError::config_with_path(
                        "config file not found",
                        path.to_path_buf(),
                    ));
                }
                path.to_path_buf()
            }
            None => {
                let path = Self::default_path(state_dir);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&content)
            .map_err(|e| WalkError::config_with_path(e.to_string(), path.clone()))?;
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: WalkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the config file inside a state directory.
    #[must_use]
    pub fn default_path(state_dir: &Path) -> PathBuf {
        state_dir.join(CONFIG_FILE)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.period_ms == 0 {
            return Err(WalkError::invalid_config(
                "schedule.period_ms",
                "must be greater than zero",
            ));
        }

        if self.page.hub_marker.trim().is_empty() {
            return Err(WalkError::invalid_config("page.hub_marker", "must not be empty"));
        }

        regex::Regex::new(&self.page.detour_pattern).map_err(|e| {
            WalkError::invalid_config("page.detour_pattern", e.to_string())
        })?;

        if self.page.action_labels.is_empty() {
            return Err(WalkError::invalid_config(
                "page.action_labels",
                "at least one label is required",
            ));
        }
        if self.page.action_labels.iter().any(|l| l.trim().is_empty()) {
            return Err(WalkError::invalid_config(
                "page.action_labels",
                "labels must not be blank",
            ));
        }

        let fraction = self.page.scroll_fraction;
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 2.0 {
            return Err(WalkError::invalid_config(
                "page.scroll_fraction",
                format!("{fraction} is outside (0, 2]"),
            ));
        }

        let key = &self.store.key;
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(WalkError::invalid_config(
                "store.key",
                format!("'{key}' is not a plain file name"),
            ));
        }

        Ok(())
    }
}

/// Resolve the state directory: explicit flag, then `$TILEWALK_STATE_DIR`,
/// then the platform data directory, then `./.tilewalk`.
#[must_use]
pub fn resolve_state_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(STATE_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_local_dir()
        .map(|d| d.join("tilewalk"))
        .unwrap_or_else(|| PathBuf::from(".tilewalk"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = WalkConfig::default();
        assert_eq!(config.schedule.period(), Duration::from_millis(1200));
        assert_eq!(config.schedule.activate_settle(), Duration::from_millis(350));
        assert_eq!(config.schedule.detour_settle(), Duration::from_millis(200));
        assert_eq!(config.page.hub_marker, "offer-hub");
        assert_eq!(config.page.action_labels.len(), 6);
        assert_eq!(config.store.key, DEFAULT_KEY);
        assert!(config.browser.ws_url.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = WalkConfig::from_toml("").unwrap();
        assert_eq!(config, WalkConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = WalkConfig::from_toml(
            r#"
            [schedule]
            period_ms = 2000

            [page]
            action_labels = ["Enroll now"]
            "#,
        )
        .unwrap();
        assert_eq!(config.schedule.period_ms, 2000);
        assert_eq!(config.schedule.activate_settle_ms, 350);
        assert_eq!(config.page.action_labels, vec!["Enroll now".to_string()]);
        assert_eq!(config.page.hub_marker, "offer-hub");
    }

    #[test]
    fn test_zero_period_rejected() {
        let err = WalkConfig::from_toml("[schedule]\nperiod_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("schedule.period_ms"));
    }

    #[test]
    fn test_bad_detour_pattern_rejected() {
        let err = WalkConfig::from_toml("[page]\ndetour_pattern = \"(open\"\n").unwrap_err();
        assert!(err.to_string().contains("page.detour_pattern"));
    }

    #[test]
    fn test_scroll_fraction_bounds() {
        let mut config = WalkConfig::default();
        config.page.scroll_fraction = 0.0;
        assert!(config.validate().is_err());
        config.page.scroll_fraction = 2.5;
        assert!(config.validate().is_err());
        config.page.scroll_fraction = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_key_must_be_file_name() {
        let mut config = WalkConfig::default();
        config.store.key = "../escape".to_string();
        assert!(config.validate().is_err());
        config.store.key = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_label_rejected() {
        let mut config = WalkConfig::default();
        config.page.action_labels.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_default_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = WalkConfig::load(None, temp.path()).unwrap();
        assert_eq!(config, WalkConfig::default());
    }

    #[test]
    fn test_load_from_state_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            WalkConfig::default_path(temp.path()),
            "[page]\nhub_marker = \"catalog\"\n",
        )
        .unwrap();
        let config = WalkConfig::load(None, temp.path()).unwrap();
        assert_eq!(config.page.hub_marker, "catalog");
    }

    #[test]
    fn test_load_missing_explicit_file_errors() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        let err = WalkConfig::load(Some(&missing), temp.path()).unwrap_err();
        assert!(matches!(err, WalkError::Config { .. }));
    }

    #[test]
    fn test_load_invalid_file_carries_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "[schedule]\nperiod_ms = \"fast\"\n").unwrap();
        match WalkConfig::load(Some(&path), temp.path()) {
            Err(WalkError::Config { path: Some(p), .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_state_dir_explicit_wins() {
        let dir = resolve_state_dir(Some(Path::new("/tmp/walk")));
        assert_eq!(dir, PathBuf::from("/tmp/walk"));
    }
}
