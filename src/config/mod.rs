//! Plugin configuration.
//!
//! Per-project settings are persisted by the host platform; the plugin
//! reads and writes them only through the [`OptionStore`] accessor the
//! host provides, never touching storage directly.

use std::collections::HashMap;

use thiserror::Error;

/// Option key for the OpenProject instance URL.
pub const OPT_URL: &str = "url";
/// Option key for the API key of the authoring user.
pub const OPT_APIKEY: &str = "apikey";
/// Option key for the slug of the target project.
pub const OPT_PROJECT_SLUG: &str = "project_slug";
/// Option key for the optional default assignee id.
pub const OPT_ASSIGNEE_ID: &str = "assignee_id";

/// The settings that must be present before any API call is attempted.
const REQUIRED_OPTIONS: [&str; 3] = [OPT_URL, OPT_APIKEY, OPT_PROJECT_SLUG];

/// Per-project option storage provided by the host platform.
pub trait OptionStore: Send + Sync {
    /// Read a stored option value.
    fn get_option(&self, key: &str) -> Option<String>;

    /// Persist an option value.
    fn set_option(&mut self, key: &str, value: &str);
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent or empty.
    #[error("missing required configuration value: {0}")]
    Missing(&'static str),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The plugin's per-project configuration.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// Base URL of the OpenProject instance.
    pub url: String,
    /// API key of the user who will author new work packages.
    pub apikey: String,
    /// Slug of the project on OpenProject.
    pub project_slug: String,
    /// Default assignee for new work packages, if configured.
    pub assignee_id: Option<i64>,
}

impl PluginConfig {
    /// Load the configuration from the host's option store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `url`, `apikey`, or
    /// `project_slug` is unset or empty. The error is terminal: no API
    /// call is attempted against an incomplete configuration.
    pub fn load(store: &dyn OptionStore) -> Result<Self> {
        let url = require(store, OPT_URL)?;
        let apikey = require(store, OPT_APIKEY)?;
        let project_slug = require(store, OPT_PROJECT_SLUG)?;
        // An unparseable assignee id behaves as unset.
        let assignee_id = store
            .get_option(OPT_ASSIGNEE_ID)
            .and_then(|v| v.parse().ok());

        Ok(Self {
            url,
            apikey,
            project_slug,
            assignee_id,
        })
    }

    /// Check whether all required settings are present in the store.
    pub fn is_complete(store: &dyn OptionStore) -> bool {
        REQUIRED_OPTIONS
            .into_iter()
            .all(|key| store.get_option(key).is_some_and(|v| !v.is_empty()))
    }
}

/// Read a required option, treating an empty value as absent.
fn require(store: &dyn OptionStore, key: &'static str) -> Result<String> {
    match store.get_option(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

/// A map-backed [`OptionStore`] for tests and standalone use.
///
/// Host platforms bring their own persistent store; this one lives in
/// memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryOptionStore {
    options: HashMap<String, String>,
}

impl MemoryOptionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an option value, builder style.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set_option(key, value);
        self
    }
}

impl OptionStore for MemoryOptionStore {
    fn get_option(&self, key: &str) -> Option<String> {
        self.options.get(key).cloned()
    }

    fn set_option(&mut self, key: &str, value: &str) {
        self.options.insert(key.to_string(), value.to_string());
    }
}
