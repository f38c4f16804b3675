//! Preview loader for the embedded document viewer
//!
//! States: `Idle -> Loading -> {Ready, Unsupported, Error}`, plus a user reload
//! from `Ready`, `Error` or `Loading` back to `Loading`. Fullscreen is tracked
//! separately on the same session.
//!
//! Documents are always rendered through a rendering proxy
//! ([`ViewerStrategy`]); a reload goes through the same proxy with a fresh
//! cache-busting token.

use crate::config::DEFAULT_VIEWER_PROXY;
use std::time::Duration;
use uuid::Uuid;

/// Source assigned to the viewer while it is blank
pub const BLANK_SOURCE: &str = "about:blank";

/// Lifecycle of the embedded viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    /// No document known yet
    Idle,
    Loading,
    Ready,
    /// No usable PDF; offer a direct download instead
    Unsupported,
    Error,
}

/// How viewer URLs are built from a document URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerStrategy {
    proxy: String,
}

impl Default for ViewerStrategy {
    fn default() -> Self {
        Self::proxy(DEFAULT_VIEWER_PROXY)
    }
}

impl ViewerStrategy {
    /// Render through the proxy at `base`
    pub fn proxy(base: impl Into<String>) -> Self {
        Self {
            proxy: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Viewer URL for `source`, optionally cache-busted with `token`
    pub fn viewer_url(&self, source: &str, token: Option<&str>) -> String {
        let mut url = format!(
            "{}?url={}&embedded=true",
            self.proxy,
            urlencoding::encode(source)
        );
        if let Some(token) = token {
            url.push_str("&t=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }
}

/// Rewrite an insecure `http://` scheme to `https://`
pub fn secure_url(url: &str) -> String {
    match url.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("http://") => format!("https://{}", &url[7..]),
        _ => url.to_string(),
    }
}

/// Whether `url`, ignoring its query string, names a PDF
pub fn is_pdf_url(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or_default();
    path.to_ascii_lowercase().ends_with(".pdf")
}

/// Icon/label of the fullscreen toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenControl {
    Enter,
    Exit,
}

impl FullscreenControl {
    pub fn icon(&self) -> &'static str {
        match self {
            FullscreenControl::Enter => "corners-out",
            FullscreenControl::Exit => "corners-in",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FullscreenControl::Enter => "Fullscreen",
            FullscreenControl::Exit => "Exit fullscreen",
        }
    }
}

/// Platform capabilities the preview needs for fullscreen
pub trait DisplayHost {
    /// Whether the platform can make the viewer container fullscreen at all
    fn supports_fullscreen(&self) -> bool;

    /// Ask for fullscreen; the platform may refuse
    fn request_fullscreen(&mut self) -> Result<(), String>;

    fn exit_fullscreen(&mut self);

    /// Open `url` in a new top-level context
    fn open_external(&mut self, url: &str);
}

/// Result of a fullscreen toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenOutcome {
    Entered,
    Exited,
    /// Fullscreen was unavailable; the document was opened externally
    OpenedExternally,
    /// Fullscreen was unavailable and there is nothing to open
    Unavailable,
}

/// Handle for a reload in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadTicket {
    attempt: u64,
}

/// Viewer session for one detail page
#[derive(Debug, Clone)]
pub struct PreviewSession {
    source_url: Option<String>,
    strategy: ViewerStrategy,
    state: ViewerState,
    viewer_src: String,
    loader_visible: bool,
    attempt: u64,
    is_fullscreen: bool,
}

impl PreviewSession {
    /// A session with no document yet
    pub fn idle(strategy: ViewerStrategy) -> Self {
        Self {
            source_url: None,
            strategy,
            state: ViewerState::Idle,
            viewer_src: BLANK_SOURCE.to_string(),
            loader_visible: false,
            attempt: 0,
            is_fullscreen: false,
        }
    }

    /// A session for `source`, already past `Idle`
    pub fn open(source: Option<&str>, strategy: ViewerStrategy) -> Self {
        let mut session = Self::idle(strategy);
        session.load(source);
        session
    }

    /// Point the viewer at a document
    ///
    /// A missing or blank URL, or one that is not a PDF, goes straight to
    /// `Unsupported` without showing the loader.
    pub fn load(&mut self, source: Option<&str>) {
        let source = source.map(str::trim).filter(|s| !s.is_empty());
        let Some(source) = source else {
            self.source_url = None;
            self.unsupported();
            return;
        };

        let secure = secure_url(source);
        let eligible = is_pdf_url(&secure);
        self.source_url = Some(secure);

        if !eligible {
            tracing::debug!("Preview unsupported for {:?}", self.source_url);
            self.unsupported();
            return;
        }

        self.attempt += 1;
        self.state = ViewerState::Loading;
        self.loader_visible = true;
        self.viewer_src = self.current_viewer_url(None);
    }

    fn unsupported(&mut self) {
        self.state = ViewerState::Unsupported;
        self.loader_visible = false;
        self.viewer_src = BLANK_SOURCE.to_string();
    }

    fn current_viewer_url(&self, token: Option<&str>) -> String {
        match &self.source_url {
            Some(source) => self.strategy.viewer_url(source, token),
            None => BLANK_SOURCE.to_string(),
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    /// Normalized document URL, if any
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Direct download / open target offered as a fallback
    pub fn fallback_url(&self) -> Option<&str> {
        self.source_url()
    }

    /// URL currently assigned to the viewer
    pub fn viewer_src(&self) -> &str {
        &self.viewer_src
    }

    pub fn loader_visible(&self) -> bool {
        self.loader_visible
    }

    /// Load attempts so far, including reloads
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// The viewer finished loading content
    ///
    /// Returns true when this hid the loader; that happens at most once per
    /// attempt. Load signals from the blank page during a reload are ignored.
    pub fn viewer_loaded(&mut self) -> bool {
        if self.state != ViewerState::Loading
            || !self.loader_visible
            || self.viewer_src == BLANK_SOURCE
        {
            return false;
        }
        self.state = ViewerState::Ready;
        self.loader_visible = false;
        true
    }

    /// The viewer reported a load failure
    pub fn viewer_failed(&mut self) {
        if self.state == ViewerState::Loading {
            tracing::warn!("Preview failed to load: {}", self.viewer_src);
            self.state = ViewerState::Error;
            self.loader_visible = false;
        }
    }

    /// Start a reload: blank the viewer and show the loader
    ///
    /// Returns `None` when there is nothing to reload (`Idle`, `Unsupported`).
    pub fn begin_reload(&mut self) -> Option<ReloadTicket> {
        match self.state {
            ViewerState::Ready | ViewerState::Error | ViewerState::Loading => {}
            ViewerState::Idle | ViewerState::Unsupported => return None,
        }

        self.attempt += 1;
        self.state = ViewerState::Loading;
        self.loader_visible = true;
        self.viewer_src = BLANK_SOURCE.to_string();
        Some(ReloadTicket {
            attempt: self.attempt,
        })
    }

    /// Finish a reload with a freshly cache-busted viewer URL
    ///
    /// A ticket superseded by a newer reload is ignored.
    pub fn finish_reload(&mut self, ticket: ReloadTicket) -> bool {
        if ticket.attempt != self.attempt || self.state != ViewerState::Loading {
            return false;
        }
        let token = Uuid::new_v4().simple().to_string();
        self.viewer_src = self.current_viewer_url(Some(&token));
        true
    }

    /// Blank, wait `delay`, then reassign a cache-busted URL
    pub async fn reload(&mut self, delay: Duration) -> bool {
        let Some(ticket) = self.begin_reload() else {
            return false;
        };
        tokio::time::sleep(delay).await;
        self.finish_reload(ticket)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    /// Control to display for the current fullscreen state
    pub fn fullscreen_control(&self) -> FullscreenControl {
        if self.is_fullscreen {
            FullscreenControl::Exit
        } else {
            FullscreenControl::Enter
        }
    }

    /// Toggle fullscreen, falling back to opening the document externally
    pub fn toggle_fullscreen(&mut self, host: &mut dyn DisplayHost) -> FullscreenOutcome {
        if self.is_fullscreen {
            host.exit_fullscreen();
            self.is_fullscreen = false;
            return FullscreenOutcome::Exited;
        }

        if host.supports_fullscreen() {
            match host.request_fullscreen() {
                Ok(()) => {
                    self.is_fullscreen = true;
                    return FullscreenOutcome::Entered;
                }
                Err(e) => tracing::debug!("Fullscreen request rejected: {}", e),
            }
        }

        match self.fallback_url() {
            Some(url) => {
                host.open_external(url);
                FullscreenOutcome::OpenedExternally
            }
            None => FullscreenOutcome::Unavailable,
        }
    }

    /// Resynchronize after an out-of-band fullscreen change (e.g. Escape)
    pub fn fullscreen_changed(&mut self, active: bool) -> FullscreenControl {
        self.is_fullscreen = active;
        self.fullscreen_control()
    }
}
