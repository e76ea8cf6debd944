//! Browser session management
//!
//! Launches and controls one Chrome instance per session, from acquire
//! through guaranteed release.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::browser::GetVersionParams;
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::chrome::resolve_chrome;
use super::config::SessionConfig;
use super::errors::HarnessError;

static SESSION_COUNTER: AtomicU32 = AtomicU32::new(1);

fn next_session_id() -> String {
    format!("session-{}", SESSION_COUNTER.fetch_add(1, Ordering::SeqCst))
}

fn remove_dirs(user_data_dir: &Path, download_dir: &Path) {
    let _ = std::fs::remove_dir_all(user_data_dir);
    let _ = std::fs::remove_dir_all(download_dir);
}

/// Per-session filesystem roots. Both carry a fresh UUID so sessions never
/// collide, even across process restarts.
fn session_dirs(id: &str) -> (PathBuf, PathBuf) {
    let tag = format!("{}-{}", id, uuid::Uuid::new_v4());
    let root = std::env::temp_dir().join("cdp-conformance");
    (
        root.join("profiles").join(&tag),
        root.join("downloads").join(tag),
    )
}

/// One live browser session: a launched Chrome process, the event handler
/// task driving its websocket, and the page used as the protocol channel.
///
/// `release_quietly` is the only teardown path. It never returns an error,
/// runs its cleanup exactly once no matter how often it is called, and leaves
/// every later `channel()` call failing with `NoActiveSession`.
#[derive(Clone)]
pub struct Session {
    id: String,
    config: SessionConfig,
    browser: Arc<RwLock<Option<Browser>>>,
    page: Arc<RwLock<Option<Page>>>,
    alive: Arc<AtomicBool>,
    released: Arc<AtomicBool>,
    commands_issued: Arc<AtomicBool>,
    close_count: Arc<AtomicU32>,
    user_data_dir: PathBuf,
    download_dir: PathBuf,
    handler_task: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl Session {
    /// Launch Chrome with the given config and hand back a ready session.
    pub async fn acquire(config: SessionConfig) -> Result<Self, HarnessError> {
        let id = next_session_id();
        let (user_data_dir, download_dir) = session_dirs(&id);

        let chrome = match &config.chrome_path {
            Some(path) => PathBuf::from(path),
            None => resolve_chrome().ok_or_else(|| {
                HarnessError::SessionStart(
                    "Chrome binary not found (set CHROME_PATH or install Chrome)".to_string(),
                )
            })?,
        };

        std::fs::create_dir_all(&user_data_dir)
            .map_err(|e| HarnessError::SessionStart(format!("create profile dir: {e}")))?;
        std::fs::create_dir_all(&download_dir)
            .map_err(|e| HarnessError::SessionStart(format!("create download dir: {e}")))?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&chrome)
            .user_data_dir(&user_data_dir)
            .window_size(config.window_width, config.window_height)
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if config.headless {
            builder = builder.headless_mode(HeadlessMode::New);
        } else {
            builder = builder.with_head();
        }
        if !config.extra_args.is_empty() {
            builder = builder.args(config.extra_args.clone());
        }
        let browser_config = builder.build().map_err(HarnessError::SessionStart)?;

        info!("Session {} launching Chrome at {}", id, chrome.display());
        let launched = match tokio::time::timeout(
            Duration::from_secs(config.startup_timeout_secs),
            Browser::launch(browser_config),
        )
        .await
        {
            Ok(launched) => launched,
            Err(_) => {
                remove_dirs(&user_data_dir, &download_dir);
                return Err(HarnessError::SessionStart(format!(
                    "launch timed out after {}s",
                    config.startup_timeout_secs
                )));
            }
        };
        let (mut browser, mut handler) = match launched {
            Ok(pair) => pair,
            Err(e) => {
                remove_dirs(&user_data_dir, &download_dir);
                return Err(HarnessError::SessionStart(e.to_string()));
            }
        };

        let alive = Arc::new(AtomicBool::new(true));
        let alive_for_handler = alive.clone();
        let handler_id = id.clone();
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            warn!(
                "Session {} Chrome disconnected (event handler ended)",
                handler_id
            );
            alive_for_handler.store(false, Ordering::Relaxed);
        });

        let page = match Self::prepare(&browser, &config).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.kill().await;
                handler_task.abort();
                remove_dirs(&user_data_dir, &download_dir);
                return Err(e);
            }
        };

        info!(
            "Browser session {} started (profile {})",
            id,
            user_data_dir.display()
        );

        Ok(Self {
            id,
            config,
            browser: Arc::new(RwLock::new(Some(browser))),
            page: Arc::new(RwLock::new(Some(page))),
            alive,
            released: Arc::new(AtomicBool::new(false)),
            commands_issued: Arc::new(AtomicBool::new(false)),
            close_count: Arc::new(AtomicU32::new(0)),
            user_data_dir,
            download_dir,
            handler_task: Arc::new(RwLock::new(Some(handler_task))),
        })
    }

    /// Take the first page Chrome opened (or open a blank one) and load the
    /// baseline URL when configured.
    async fn prepare(browser: &Browser, config: &SessionConfig) -> Result<Page, HarnessError> {
        let pages = browser
            .pages()
            .await
            .map_err(|e| HarnessError::SessionStart(e.to_string()))?;
        let page = match pages.into_iter().next() {
            Some(page) => page,
            None => browser
                .new_page("about:blank")
                .await
                .map_err(|e| HarnessError::SessionStart(e.to_string()))?,
        };
        if let Some(url) = &config.baseline_url {
            page.goto(url.as_str())
                .await
                .map_err(|e| HarnessError::Navigation(format!("{url}: {e}")))?;
        }
        Ok(page)
    }

    /// The protocol channel. Commands go through the page this returns;
    /// fetching it marks the session as having issued commands.
    pub async fn channel(&self) -> Result<Page, HarnessError> {
        if self.released.load(Ordering::Relaxed) {
            return Err(HarnessError::NoActiveSession);
        }
        if !self.alive.load(Ordering::Relaxed) {
            return Err(HarnessError::ChannelUnreachable(
                "event handler ended".to_string(),
            ));
        }
        let guard = self.page.read().await;
        let page = guard.clone().ok_or(HarnessError::NoActiveSession)?;
        self.commands_issued.store(true, Ordering::Relaxed);
        Ok(page)
    }

    /// Classify a command failure: a dead browser means the channel is gone,
    /// anything else is an ordinary command error.
    pub fn channel_error(&self, err: impl std::fmt::Display) -> HarnessError {
        if !self.alive.load(Ordering::Relaxed) {
            HarnessError::ChannelUnreachable(err.to_string())
        } else {
            HarnessError::Command(err.to_string())
        }
    }

    /// Probe the channel with `Browser.getVersion`. Scenarios that shut the
    /// browser down use this to confirm the channel is really gone.
    pub async fn ping(&self) -> Result<(), HarnessError> {
        let page = self.channel().await?;
        match tokio::time::timeout(
            Duration::from_secs(10),
            page.execute(GetVersionParams::default()),
        )
        .await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(self.channel_error(e)),
            Err(_) => Err(HarnessError::ChannelUnreachable(
                "no response to Browser.getVersion within 10s".to_string(),
            )),
        }
    }

    /// Wait until the event handler reports the browser gone.
    pub async fn wait_for_disconnect(&self, within: Duration) -> Result<(), HarnessError> {
        let deadline = tokio::time::Instant::now() + within;
        while self.alive.load(Ordering::Relaxed) {
            if tokio::time::Instant::now() >= deadline {
                return Err(HarnessError::Timeout(format!(
                    "browser still connected after {}s",
                    within.as_secs()
                )));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Ok(())
    }

    pub async fn navigate(&self, url: &str) -> Result<(), HarnessError> {
        let page = self.channel().await?;
        page.goto(url)
            .await
            .map_err(|e| HarnessError::Navigation(format!("{url}: {e}")))?;
        Ok(())
    }

    pub async fn reload(&self) -> Result<(), HarnessError> {
        let page = self.channel().await?;
        page.reload()
            .await
            .map_err(|e| HarnessError::Navigation(format!("reload: {e}")))?;
        Ok(())
    }

    /// Find an element, polling every 250ms until the configured wait
    /// timeout. Covers pages whose scripts add nodes asynchronously.
    pub async fn find_element(&self, selector: &str) -> Result<Element, HarnessError> {
        let deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.config.wait_timeout_secs);
        let mut last_err = String::from("no matching node");
        loop {
            let page = self.channel().await?;
            match page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(e) => last_err = e.to_string(),
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(HarnessError::ElementNotFound(format!(
                    "{selector} (waited {}s): {last_err}",
                    self.config.wait_timeout_secs
                )));
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    /// Count matching elements right now, without waiting. Zero matches is a
    /// valid answer here, not an error.
    pub async fn count_elements(&self, selector: &str) -> Result<usize, HarnessError> {
        let page = self.channel().await?;
        let elements = page
            .find_elements(selector)
            .await
            .map_err(|e| self.channel_error(e))?;
        Ok(elements.len())
    }

    pub async fn click(&self, selector: &str) -> Result<(), HarnessError> {
        let element = self.find_element(selector).await?;
        element.click().await.map_err(|e| self.channel_error(e))?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String, HarnessError> {
        let page = self.channel().await?;
        page.url()
            .await
            .map_err(|e| self.channel_error(e))?
            .ok_or_else(|| HarnessError::Command("page has no URL".to_string()))
    }

    /// Origin of the current page, in the `scheme://host:port` form that
    /// permission commands expect.
    pub async fn origin(&self) -> Result<String, HarnessError> {
        let current = self.current_url().await?;
        let parsed = url::Url::parse(&current)
            .map_err(|e| HarnessError::Command(format!("parse {current}: {e}")))?;
        Ok(parsed.origin().ascii_serialization())
    }

    /// Tear the session down: close the page, close the browser (with a kill
    /// as fallback), stop the handler task, and remove the per-session
    /// directories. Never returns an error; failures are logged and dropped.
    /// Calling it again after the first time is a no-op.
    pub async fn release_quietly(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            debug!("Session {} already released", self.id);
            return;
        }
        self.alive.store(false, Ordering::Relaxed);

        if let Some(page) = self.page.write().await.take() {
            let _ = page.close().await;
        }

        if let Some(mut browser) = self.browser.write().await.take() {
            if let Err(e) = browser.close().await {
                debug!("Session {} browser close: {}", self.id, e);
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = browser.kill().await;
        }

        if let Some(task) = self.handler_task.write().await.take() {
            task.abort();
        }

        for dir in [&self.user_data_dir, &self.download_dir] {
            if let Err(e) = std::fs::remove_dir_all(dir) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(
                        "Session {} could not remove {}: {}",
                        self.id,
                        dir.display(),
                        e
                    );
                }
            }
        }

        self.close_count.fetch_add(1, Ordering::SeqCst);
        info!("Browser session {} released", self.id);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Relaxed)
    }

    pub fn commands_issued(&self) -> bool {
        self.commands_issued.load(Ordering::Relaxed)
    }

    /// How many times teardown actually ran. Stays at one no matter how many
    /// times `release_quietly` is called.
    pub fn close_count(&self) -> u32 {
        self.close_count.load(Ordering::SeqCst)
    }

    pub fn user_data_dir(&self) -> &PathBuf {
        &self.user_data_dir
    }

    pub fn download_dir(&self) -> &PathBuf {
        &self.download_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        let a = next_session_id();
        let b = next_session_id();
        assert!(a.starts_with("session-"));
        assert!(b.starts_with("session-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_session_dirs_are_distinct_per_call() {
        let (profile_a, download_a) = session_dirs("session-1");
        let (profile_b, download_b) = session_dirs("session-1");
        assert_ne!(profile_a, profile_b);
        assert_ne!(download_a, download_b);
    }

    #[test]
    fn test_session_dirs_layout() {
        let (profile, download) = session_dirs("session-7");
        assert!(profile.starts_with(std::env::temp_dir().join("cdp-conformance")));
        assert!(profile.to_string_lossy().contains("profiles"));
        assert!(download.to_string_lossy().contains("downloads"));
        assert!(profile.to_string_lossy().contains("session-7"));
    }
}
