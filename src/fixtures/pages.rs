//! The fixture pages. Kept deliberately small: each page exists to give one
//! group of scenarios something observable to assert against.

use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde_json::json;

/// Landing page. Touches cookie and local storage so Chrome records storage
/// access metrics for the histogram scenarios.
const BASELINE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>CDP conformance baseline</title></head>
<body>
<h1>Baseline</h1>
<div id="ready">ready</div>
<script>
  document.cookie = 'cdp-conformance=1; path=/';
  try {
    localStorage.setItem('cdp-conformance', String(Date.now()));
  } catch (e) {}
</script>
</body>
</html>
"#;

/// Microphone page. The request button is only added when the microphone
/// permission is not yet granted, and a marker node is appended once the
/// permission state has been checked. Scenarios wait for the marker before
/// counting buttons.
const MIC_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Microphone fixture</title></head>
<body>
<h1>Microphone</h1>
<script>
  (function () {
    function markChecked() {
      var marker = document.createElement('div');
      marker.className = 'mic-checked';
      document.body.appendChild(marker);
    }
    if (!navigator.permissions || !navigator.permissions.query) {
      markChecked();
      return;
    }
    navigator.permissions.query({ name: 'microphone' }).then(function (status) {
      if (status.state !== 'granted') {
        var button = document.createElement('button');
        button.id = 'request-mic';
        button.textContent = 'Enable microphone';
        document.body.appendChild(button);
      }
      markChecked();
    }).catch(markChecked);
  })();
</script>
</body>
</html>
"#;

/// Download page with a single attachment link.
const DOWNLOAD_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Download fixture</title></head>
<body>
<h1>Download</h1>
<a id="download-link" href="/files/sample.bin" download="sample.bin">Download sample</a>
</body>
</html>
"#;

pub fn router() -> Router {
    Router::new()
        .route("/", get(baseline))
        .route("/mic", get(mic))
        .route("/download", get(download))
        .route("/files/sample.bin", get(sample_file))
        .route("/healthz", get(healthz))
}

async fn baseline() -> Html<&'static str> {
    Html(BASELINE_PAGE)
}

async fn mic() -> Html<&'static str> {
    Html(MIC_PAGE)
}

async fn download() -> Html<&'static str> {
    Html(DOWNLOAD_PAGE)
}

/// 4 KiB of bytes, served as an attachment so Chrome treats the link as a
/// download rather than navigation.
pub fn sample_payload() -> Vec<u8> {
    (0u8..=255).cycle().take(4096).collect()
}

async fn sample_file() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sample.bin\"",
            ),
        ],
        sample_payload(),
    )
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
