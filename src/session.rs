// src/session.rs
//! Session Manager: owner of the single stateful headless-browser resource.
//!
//! One Chromium instance with one long-lived page, shared behind a mutex so
//! only the current provider call touches it. A handle is considered invalid
//! once a trivial no-op (reading the current URL) fails; `fetch_page` then
//! recreates the session once and retries once before reporting the call as
//! degraded. If Chromium cannot be started at all, the manager stays
//! `Unavailable` for the process lifetime and providers run stateless-only.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use metrics::counter;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::ScrapeError;

pub const ENV_CHROME_PATH: &str = "AGGREGATOR_CHROME_PATH";

/// Find a Chromium/Chrome binary: env override first, then system PATH.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(ENV_CHROME_PATH) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }
    None
}

struct Session {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

enum SessionState {
    /// No launch attempted yet.
    Uninitialized,
    Ready(Session),
    /// The automation engine could not be started; permanent for the process.
    Unavailable,
}

pub struct SessionManager {
    inner: Mutex<SessionState>,
    nav_timeout: Duration,
    chrome_path: Option<PathBuf>,
    recreates: AtomicU64,
}

impl SessionManager {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            inner: Mutex::new(SessionState::Uninitialized),
            nav_timeout: Duration::from_secs(cfg.nav_timeout_secs),
            chrome_path: None,
            recreates: AtomicU64::new(0),
        }
    }

    /// Pin the browser binary instead of discovering it from the
    /// environment.
    pub fn with_chrome_path(cfg: &AppConfig, path: impl Into<PathBuf>) -> Self {
        Self {
            chrome_path: Some(path.into()),
            ..Self::new(cfg)
        }
    }

    /// Number of teardown-and-relaunch attempts over the manager lifetime.
    pub fn recreate_count(&self) -> u64 {
        self.recreates.load(Ordering::Relaxed)
    }

    async fn launch(&self) -> Result<Session, ScrapeError> {
        let chrome_path = match &self.chrome_path {
            Some(path) if path.exists() => path.clone(),
            Some(path) => {
                return Err(ScrapeError::SessionInvalid(format!(
                    "pinned Chromium binary missing: {}",
                    path.display()
                )))
            }
            None => find_chromium()
                .ok_or_else(|| ScrapeError::SessionInvalid("no Chromium binary found".into()))?,
        };

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--window-size=1920,1080")
            .build()
            .map_err(|e| ScrapeError::SessionInvalid(format!("browser config: {e}")))?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::SessionInvalid(format!("launching Chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::SessionInvalid(format!("creating page: {e}")))?;

        info!("browser session started");
        Ok(Session {
            browser,
            page,
            handler,
        })
    }

    /// Validity check + lazy start. Errors only when the engine is
    /// permanently unavailable.
    pub async fn ensure_valid(&self) -> Result<(), ScrapeError> {
        let mut state = self.inner.lock().await;
        self.ensure_valid_locked(&mut state).await.map(|_| ())
    }

    /// Returns whether the check had to recreate the session, so the caller
    /// can charge it against the per-invocation recreate budget.
    async fn ensure_valid_locked(&self, state: &mut SessionState) -> Result<bool, ScrapeError> {
        match state {
            SessionState::Unavailable => Err(ScrapeError::SessionInvalid(
                "automation engine unavailable".into(),
            )),
            SessionState::Ready(session) => {
                // No-op probe: reading the current URL fails once the
                // underlying browser process has died.
                if session.page.url().await.is_ok() {
                    return Ok(false);
                }
                warn!("session probe failed, recreating");
                self.recreate_locked(state).await?;
                Ok(true)
            }
            SessionState::Uninitialized => {
                self.recreate_locked(state).await?;
                Ok(true)
            }
        }
    }

    /// Tear down and relaunch the session. A launch failure marks the engine
    /// unavailable for the rest of the process lifetime.
    pub async fn recreate(&self) -> Result<(), ScrapeError> {
        let mut state = self.inner.lock().await;
        self.recreate_locked(&mut state).await
    }

    async fn recreate_locked(&self, state: &mut SessionState) -> Result<(), ScrapeError> {
        if let SessionState::Unavailable = state {
            return Err(ScrapeError::SessionInvalid(
                "automation engine unavailable".into(),
            ));
        }

        if let SessionState::Ready(old) = std::mem::replace(state, SessionState::Uninitialized) {
            let mut browser = old.browser;
            let _ = browser.close().await;
            old.handler.abort();
        }

        counter!("session_recreate_total").increment(1);
        self.recreates.fetch_add(1, Ordering::Relaxed);
        match self.launch().await {
            Ok(session) => {
                *state = SessionState::Ready(session);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "browser unavailable, falling back to stateless fetches");
                *state = SessionState::Unavailable;
                Err(e)
            }
        }
    }

    /// Navigate the session page to `url` and return the rendered HTML.
    ///
    /// At most one recreate per call: when an invalid handle is detected
    /// (either by the validity probe or mid-navigation) the session is
    /// recreated once and the navigation retried once; any further failure
    /// surfaces as `SessionInvalid` for the caller to degrade on.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        let mut state = self.inner.lock().await;
        let recreated = self.ensure_valid_locked(&mut state).await?;

        match self.navigate_locked(&state, url).await {
            Err(ScrapeError::SessionInvalid(reason)) if !recreated => {
                warn!(%url, %reason, "session handle failed, one recreate+retry");
                self.recreate_locked(&mut state).await?;
                self.navigate_locked(&state, url).await
            }
            result => result,
        }
    }

    async fn navigate_locked(&self, state: &SessionState, url: &str) -> Result<String, ScrapeError> {
        let session = match state {
            SessionState::Ready(s) => s,
            _ => return Err(ScrapeError::SessionInvalid("no session".into())),
        };

        let nav = tokio::time::timeout(self.nav_timeout, session.page.goto(url)).await;
        match nav {
            Ok(Ok(_)) => {}
            // Navigation errors are the URL's fault, not the handle's;
            // relaunching the browser would not help.
            Ok(Err(e)) => return Err(ScrapeError::Network(format!("goto {url}: {e}"))),
            Err(_) => {
                return Err(ScrapeError::Network(format!(
                    "navigation to {url} timed out after {:?}",
                    self.nav_timeout
                )))
            }
        }
        let _ = session.page.wait_for_navigation().await;

        session
            .page
            .content()
            .await
            .map_err(|e| ScrapeError::SessionInvalid(format!("reading page content: {e}")))
    }
}
