//! HTTP client for the download backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::model::{
    DownloadRequest, MediaInfo, PlaylistStarted, ProgressReport, Quality, VideoStarted,
};

pub const INFO_PATH: &str = "/get_video_info";
pub const VIDEO_PATH: &str = "/download_video";
pub const PLAYLIST_PATH: &str = "/download_playlist";
pub const PROGRESS_PATH: &str = "/download_progress";
pub const CLEAR_PATH: &str = "/clear_downloads";

/// Messages used when a failed response does not carry its own `error`.
pub const INFO_FALLBACK: &str = "Failed to fetch video information";
pub const VIDEO_FALLBACK: &str = "Download failed";
pub const PLAYLIST_FALLBACK: &str = "Playlist download failed";
pub const PROGRESS_FALLBACK: &str = "Failed to fetch download progress";
pub const CLEAR_FALLBACK: &str = "Failed to clear downloads";

/// The backend operations the session controller relies on.
///
/// [`HttpBackend`] is the real implementation; tests substitute a scripted one.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetches metadata for a video or playlist URL.
    async fn video_info(&self, url: &str) -> Result<MediaInfo>;

    /// Starts a single-video download and returns its tracking identifier.
    async fn download_video(&self, url: &str, quality: &Quality) -> Result<String>;

    /// Starts a playlist download and returns its tracking identifier.
    async fn download_playlist(&self, url: &str, quality: &Quality) -> Result<String>;

    /// Fetches the current progress report for a tracking identifier.
    async fn progress(&self, tracking_id: &str) -> Result<ProgressReport>;

    /// Asks the backend to purge its transient download artifacts.
    async fn clear_downloads(&self) -> Result<()>;
}

/// [`Backend`] over JSON/HTTP using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a backend for `base_url` with a default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ServerConfig {
            base_url: base_url.to_string(),
            ..ServerConfig::default()
        })
    }

    /// Creates a backend from the server section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let http = build_http_client(config.request_timeout())?;
        Ok(Self::with_client(http, &config.base_url))
    }

    /// Creates a backend reusing an existing HTTP client.
    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a backend-relative path (such as a `download_url`) to an absolute URL.
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        resolve_url(&self.base_url, path)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Joins a backend-relative path onto `base_url`; absolute URLs pass through.
#[must_use]
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Builds a configured HTTP client for backend requests.
fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .build()
}

/// Reads a JSON body, turning non-success statuses into [`Error::Backend`].
///
/// The backend reports failures as `{"error": "..."}`; when that field is
/// missing (or the body is not JSON) `fallback` becomes the message.
async fn read_json(response: reqwest::Response, fallback: &str) -> Result<Value> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(backend_error(status, &body, fallback));
    }
    Ok(serde_json::from_str(&body)?)
}

fn backend_error(status: StatusCode, body: &str, fallback: &str) -> Error {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());
    Error::Backend {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn video_info(&self, url: &str) -> Result<MediaInfo> {
        let response = self
            .http
            .post(self.endpoint(INFO_PATH))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;
        MediaInfo::from_value(read_json(response, INFO_FALLBACK).await?)
    }

    async fn download_video(&self, url: &str, quality: &Quality) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint(VIDEO_PATH))
            .json(&DownloadRequest { url, quality })
            .send()
            .await?;
        let started: VideoStarted =
            serde_json::from_value(read_json(response, VIDEO_FALLBACK).await?)?;
        Ok(started.video_id)
    }

    async fn download_playlist(&self, url: &str, quality: &Quality) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint(PLAYLIST_PATH))
            .json(&DownloadRequest { url, quality })
            .send()
            .await?;
        let started: PlaylistStarted =
            serde_json::from_value(read_json(response, PLAYLIST_FALLBACK).await?)?;
        Ok(started.playlist_id)
    }

    async fn progress(&self, tracking_id: &str) -> Result<ProgressReport> {
        let response = self
            .http
            .get(format!("{}/{tracking_id}", self.endpoint(PROGRESS_PATH)))
            .send()
            .await?;
        Ok(serde_json::from_value(
            read_json(response, PROGRESS_FALLBACK).await?,
        )?)
    }

    async fn clear_downloads(&self) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint(CLEAR_PATH))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(backend_error(status, &body, CLEAR_FALLBACK))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgressStatus;

    use axum::Json;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use serde_json::json;

    async fn video_info(Json(body): Json<Value>) -> impl IntoResponse {
        match body["url"].as_str().unwrap_or_default() {
            "https://youtu.be/video" => (
                AxumStatus::OK,
                Json(json!({
                    "type": "video",
                    "title": "Clip",
                    "duration": 125,
                    "formats": [{"quality": "720p", "ext": "mp4", "type": "video"}]
                })),
            ),
            "https://youtube.com/playlist?list=PL" => (
                AxumStatus::OK,
                Json(json!({"type": "playlist", "title": "Mix", "video_count": 0, "videos": []})),
            ),
            "https://youtu.be/odd" => (AxumStatus::OK, Json(json!({"type": "channel"}))),
            _ => (
                AxumStatus::BAD_REQUEST,
                Json(json!({"error": "Invalid YouTube URL"})),
            ),
        }
    }

    async fn download_video(Json(body): Json<Value>) -> impl IntoResponse {
        assert_eq!(body["quality"], "720p");
        Json(json!({"success": true, "video_id": "dQw4w9WgXcQ", "message": "Download started"}))
    }

    async fn download_playlist() -> impl IntoResponse {
        (AxumStatus::INTERNAL_SERVER_ERROR, "boom")
    }

    async fn progress(Path(id): Path<String>) -> impl IntoResponse {
        if id == "done" {
            Json(json!({"status": "finished", "percent": 100, "filename": "a.mp4", "download_url": "/download_file/a.mp4"}))
        } else {
            Json(json!({"status": "downloading", "percent": 42.5, "speed": "1.2MiB/s", "eta": "00:10"}))
        }
    }

    async fn clear() -> impl IntoResponse {
        Json(json!({"success": true}))
    }

    async fn spawn_backend() -> HttpBackend {
        let app = Router::new()
            .route(INFO_PATH, post(video_info))
            .route(VIDEO_PATH, post(download_video))
            .route(PLAYLIST_PATH, post(download_playlist))
            .route("/download_progress/{id}", get(progress))
            .route(CLEAR_PATH, post(clear));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        HttpBackend::new(&format!("http://{addr}/")).unwrap()
    }

    #[tokio::test]
    async fn fetches_video_info() {
        let backend = spawn_backend().await;
        let MediaInfo::Video(info) = backend.video_info("https://youtu.be/video").await.unwrap()
        else {
            panic!("expected a video");
        };
        assert_eq!(info.title.as_deref(), Some("Clip"));
        assert_eq!(info.formats[0].quality, "720p");
    }

    #[tokio::test]
    async fn fetches_playlist_info() {
        let backend = spawn_backend().await;
        let info = backend
            .video_info("https://youtube.com/playlist?list=PL")
            .await
            .unwrap();
        assert!(matches!(info, MediaInfo::Playlist(p) if p.title.as_deref() == Some("Mix")));
    }

    #[tokio::test]
    async fn backend_error_message_is_kept() {
        let backend = spawn_backend().await;
        let err = backend.video_info("https://vimeo.com/1").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Backend { status: 400, ref message } if message == "Invalid YouTube URL"
        ));
    }

    #[tokio::test]
    async fn unknown_type_is_reported() {
        let backend = spawn_backend().await;
        let err = backend.video_info("https://youtu.be/odd").await.unwrap_err();
        assert!(matches!(err, Error::UnrecognizedResponse(ref t) if t == "channel"));
    }

    #[tokio::test]
    async fn starts_video_download() {
        let backend = spawn_backend().await;
        let id = backend
            .download_video("https://youtu.be/video", &Quality::from("720p"))
            .await
            .unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn non_json_error_uses_fallback() {
        let backend = spawn_backend().await;
        let err = backend
            .download_playlist("https://youtube.com/playlist?list=PL", &Quality::Best)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Backend { status: 500, ref message } if message == PLAYLIST_FALLBACK
        ));
    }

    #[tokio::test]
    async fn reads_progress_reports() {
        let backend = spawn_backend().await;

        let report = backend.progress("abc").await.unwrap();
        assert_eq!(report.status, ProgressStatus::Downloading);
        assert_eq!(report.percent, Some(42.5));
        assert_eq!(report.speed.as_deref(), Some("1.2MiB/s"));

        let report = backend.progress("done").await.unwrap();
        assert_eq!(report.status, ProgressStatus::Finished);
        assert_eq!(report.filename.as_deref(), Some("a.mp4"));
    }

    #[tokio::test]
    async fn clears_downloads() {
        let backend = spawn_backend().await;
        backend.clear_downloads().await.unwrap();
    }

    #[tokio::test]
    async fn missing_endpoint_is_a_backend_error() {
        let app = Router::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let backend = HttpBackend::new(&format!("http://{addr}")).unwrap();
        let err = backend.clear_downloads().await.unwrap_err();
        assert_eq!(err.user_message("x"), CLEAR_FALLBACK);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(&format!("http://{addr}")).unwrap();
        let err = backend.progress("abc").await.unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn resolves_relative_download_urls() {
        let backend = HttpBackend::new("http://127.0.0.1:5000/").unwrap();
        assert_eq!(backend.base_url(), "http://127.0.0.1:5000");
        assert_eq!(
            backend.resolve("/download_file/a.mp4"),
            "http://127.0.0.1:5000/download_file/a.mp4"
        );
        assert_eq!(backend.resolve("https://cdn/x"), "https://cdn/x");
    }
}
