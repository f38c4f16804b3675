//! Client configuration

use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Default document-rendering proxy for the preview viewer
pub const DEFAULT_VIEWER_PROXY: &str = "https://docs.google.com/gview";

/// Quiet period before a suggestion lookup is issued
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Blank period before a reloaded viewer gets its fresh URL
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_millis(200);

/// Runtime configuration for the client components
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the remote book API
    pub api_url: String,

    /// Directory holding the local store
    pub data_dir: PathBuf,

    /// Rendering proxy used for embedded previews
    pub viewer_proxy: String,

    pub debounce: Duration,

    pub reload_delay: Duration,

    /// Per-request timeout for gateway calls
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: default_data_dir(),
            viewer_proxy: DEFAULT_VIEWER_PROXY.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            reload_delay: DEFAULT_RELOAD_DELAY,
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl ClientConfig {
    /// Build configuration from `LECTERN_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("LECTERN_API_URL") {
            config.api_url = url;
        }
        if let Some(dir) = lookup("LECTERN_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(proxy) = lookup("LECTERN_VIEWER_PROXY") {
            config.viewer_proxy = proxy;
        }
        if let Some(ms) = millis(&lookup, "LECTERN_DEBOUNCE_MS") {
            config.debounce = ms;
        }
        if let Some(ms) = millis(&lookup, "LECTERN_RELOAD_DELAY_MS") {
            config.reload_delay = ms;
        }

        config
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

/// Platform data directory, or `./lectern_data` when none is known
fn default_data_dir() -> PathBuf {
    ProjectDirs::from("org", "lectern", "lectern")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./lectern_data"))
}
