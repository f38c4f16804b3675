//! CLI command implementations

mod favorite;
mod history;
mod home;
mod login;
mod preview;
mod search;
mod view;

pub use favorite::favorite;
pub use history::{history_clear, history_list, history_remove};
pub use home::home;
pub use login::{login, logout};
pub use preview::preview;
pub use search::search;
pub use view::view;

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use lectern_core::preview::ViewerStrategy;
use lectern_core::{
    BookGateway, ClientConfig, FileStore, HistoryCache, HttpGateway, LocalStore, Session,
};
use std::sync::Arc;
use std::time::Duration;

/// Shared handles built once per invocation
pub struct Context {
    pub config: ClientConfig,
    pub store: Arc<dyn LocalStore>,
    pub gateway: Arc<dyn BookGateway>,
}

impl Context {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let store = FileStore::open(&config.data_dir).with_context(|| {
            format!("Failed to open local store in {}", config.data_dir.display())
        })?;
        tracing::debug!("Using local store at {}", store.path().display());

        let gateway = HttpGateway::new(config.api_url.clone(), config.request_timeout)
            .context("Failed to build API client")?;

        Ok(Self {
            config,
            store: Arc::new(store),
            gateway: Arc::new(gateway),
        })
    }

    pub fn session(&self) -> Session {
        Session::new(self.store.clone())
    }

    pub fn history(&self) -> HistoryCache {
        HistoryCache::new(self.store.clone())
    }

    pub fn viewer_strategy(&self) -> ViewerStrategy {
        ViewerStrategy::proxy(self.config.viewer_proxy.clone())
    }
}

/// Spinner shown while waiting on the API
fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
