//! Configuration module for HazVis-RS
//!
//! Handles persisted application state (last session, recent queries,
//! service endpoint) and UI preferences.
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location under
//! `org.hazvis.hazvis-rs`:
//! - **Linux**: `~/.local/share/org.hazvis.hazvis-rs/`
//! - **macOS**: `~/Library/Application Support/org.hazvis.hazvis-rs/`
//! - **Windows**: `%APPDATA%\org.hazvis.hazvis-rs\`
//!
//! # Files
//!
//! - `app_state.json` - last session query, recent queries, service URL
//! - `preferences.toml` - UI preferences (theme, plot styling)

pub mod query;

pub use query::DeepLink;

use crate::error::{HazVisError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "org.hazvis.hazvis-rs";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// UI preferences filename
pub const PREFERENCES_FILE: &str = "preferences.toml";

/// Maximum number of recent queries to remember
pub const MAX_RECENT_QUERIES: usize = 10;

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir()
        .ok_or_else(|| HazVisError::Config("could not determine app data directory".to_string()))?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|e| HazVisError::Config(format!("failed to create app data directory: {e}")))?;
    }
    Ok(dir)
}

/// Persisted application state: last session and recent queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppState {
    /// Query string of the last submitted computation, restored on startup
    pub last_query: Option<String>,
    /// Recently submitted queries, most recent first
    #[serde(default)]
    pub recent_queries: Vec<String>,
    /// Base URL of the hazard web services; the in-process mock service is
    /// used when unset
    #[serde(default)]
    pub service_url: Option<String>,
}

impl AppState {
    /// Load app state from the default location, or default on any failure
    pub fn load_or_default() -> Self {
        match app_data_dir() {
            Some(dir) => Self::load_from(&dir.join(APP_STATE_FILE)).unwrap_or_else(|e| {
                tracing::debug!("using default app state: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(&dir.join(APP_STATE_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Record a submitted query as both the last session and a recent entry
    pub fn record_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.recent_queries.retain(|q| q != &query);
        self.recent_queries.insert(0, query.clone());
        self.recent_queries.truncate(MAX_RECENT_QUERIES);
        self.last_query = Some(query);
    }
}

/// UI preferences, persisted separately as TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    /// Dark or light egui visuals
    pub dark_mode: bool,
    /// Base line width for unselected series
    pub line_width: f32,
    /// Line width for the highlighted series
    pub selection_line_width: f32,
    /// Whether plots draw grid lines
    pub show_grid: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            line_width: 3.0,
            selection_line_width: 5.0,
            show_grid: true,
        }
    }
}

impl UiPreferences {
    pub fn load_or_default() -> Self {
        match app_data_dir() {
            Some(dir) => Self::load_from(&dir.join(PREFERENCES_FILE)).unwrap_or_default(),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| HazVisError::Config(e.to_string()))
    }

    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(&dir.join(PREFERENCES_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| HazVisError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_app_state_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(APP_STATE_FILE);

        let mut state = AppState::default();
        state.record_query("edition=E2014&region=COUS&imt=PGA&vs30=760");
        state.service_url = Some("https://example.invalid/ws".to_string());
        state.save_to(&path).unwrap();

        let loaded = AppState::load_from(&path).unwrap();
        assert_eq!(loaded.last_query, state.last_query);
        assert_eq!(loaded.recent_queries.len(), 1);
        assert_eq!(loaded.service_url, state.service_url);
    }

    #[test]
    fn test_recent_queries_dedupe_and_cap() {
        let mut state = AppState::default();
        for i in 0..15 {
            state.record_query(format!("imt=PGA&vs30={i}"));
        }
        state.record_query("imt=PGA&vs30=3");
        assert_eq!(state.recent_queries.len(), MAX_RECENT_QUERIES);
        assert_eq!(state.recent_queries[0], "imt=PGA&vs30=3");
        assert_eq!(
            state.recent_queries.iter().filter(|q| *q == "imt=PGA&vs30=3").count(),
            1
        );
    }

    #[test]
    fn test_preferences_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE);

        let mut prefs = UiPreferences::default();
        prefs.dark_mode = false;
        prefs.line_width = 2.0;
        prefs.save_to(&path).unwrap();

        let loaded = UiPreferences::load_from(&path).unwrap();
        assert!(!loaded.dark_mode);
        assert_eq!(loaded.line_width, 2.0);
        assert_eq!(loaded.selection_line_width, 5.0);
    }
}
