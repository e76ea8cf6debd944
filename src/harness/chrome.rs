//! Chrome binary discovery

use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

/// Well-known Chrome/Chromium install locations for the current OS.
pub fn candidate_paths() -> Vec<PathBuf> {
    let candidates: Vec<&str> = if cfg!(target_os = "windows") {
        vec![
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    } else {
        vec![
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ]
    };
    candidates.into_iter().map(PathBuf::from).collect()
}

/// Locate a Chrome binary. `CHROME_PATH` wins when set; otherwise the first
/// existing candidate path is taken.
pub fn find_chrome() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHROME_PATH") {
        if !path.is_empty() {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            debug!("CHROME_PATH set but does not exist: {}", path.display());
        }
    }
    candidate_paths().into_iter().find(|p| p.exists())
}

static RESOLVED_CHROME: OnceCell<Option<PathBuf>> = OnceCell::new();

/// Process-wide cached result of [`find_chrome`]. Discovery runs once; every
/// session launched afterwards reuses the same binary.
pub fn resolve_chrome() -> Option<PathBuf> {
    RESOLVED_CHROME
        .get_or_init(|| {
            let found = find_chrome();
            match &found {
                Some(path) => info!("Using Chrome binary at {}", path.display()),
                None => debug!("No Chrome binary found in well-known locations"),
            }
            found
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_paths_not_empty() {
        assert!(!candidate_paths().is_empty());
    }

    #[test]
    fn test_candidate_paths_are_absolute() {
        for path in candidate_paths() {
            assert!(path.is_absolute(), "{} is not absolute", path.display());
        }
    }

    #[test]
    fn test_resolve_chrome_is_stable() {
        assert_eq!(resolve_chrome(), resolve_chrome());
    }
}
