/// Launch settings for one browser session.
///
/// Every scenario gets its own config value; sessions never share profile or
/// download directories, so concurrent workers stay isolated.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Path to Chrome/Chromium executable; discovered per-OS when absent
    pub chrome_path: Option<String>,
    /// Run in headless mode
    pub headless: bool,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Page loaded right after launch; unset keeps the initial blank page
    pub baseline_url: Option<String>,
    /// Launch timeout in seconds
    pub startup_timeout_secs: u64,
    /// Upper bound in seconds for element polling
    pub wait_timeout_secs: u64,
    /// Extra Chrome switches, passed verbatim as full `--flag=value` strings
    pub extra_args: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            baseline_url: None,
            startup_timeout_secs: 45,
            wait_timeout_secs: 30,
            extra_args: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Default config adjusted by environment knobs: `CHROME_PATH` overrides
    /// binary discovery and `CDP_HEADFUL=1` opens a visible window.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("CHROME_PATH") {
            if !path.is_empty() {
                config.chrome_path = Some(path);
            }
        }
        if std::env::var("CDP_HEADFUL").map(|v| v == "1").unwrap_or(false) {
            config.headless = false;
        }
        config
    }

    /// Set explicit Chrome binary path
    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set window size
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set the page loaded right after launch
    pub fn baseline_url(mut self, url: impl Into<String>) -> Self {
        self.baseline_url = Some(url.into());
        self
    }

    /// Set launch timeout
    pub fn startup_timeout(mut self, secs: u64) -> Self {
        self.startup_timeout_secs = secs;
        self
    }

    /// Set element wait bound
    pub fn wait_timeout(mut self, secs: u64) -> Self {
        self.wait_timeout_secs = secs;
        self
    }

    /// Add one extra Chrome switch
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}
