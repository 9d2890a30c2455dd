// Data the shell needs before it can render: an upload endpoint for the
// library's upload widget and the current asset list.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::video_host::{Upload, Video, VideoHost, VideoHostError};

#[derive(Debug, Error)]
pub enum LoaderError {
    /// Fatal for the load; surfaced to the webview as an error response
    #[error("{message} ({status})")]
    Server { status: u16, message: String },

    #[error(transparent)]
    Host(#[from] VideoHostError),
}

impl LoaderError {
    fn server_error() -> Self {
        LoaderError::Server {
            status: 500,
            message: "Server error".to_string(),
        }
    }
}

// Configuration problems are logged here and reach the webview as a plain
// server error, like a missing CORS origin
impl From<ConfigError> for LoaderError {
    fn from(error: ConfigError) -> Self {
        tracing::error!(%error, "shell configuration incomplete");
        LoaderError::server_error()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShellData {
    pub upload: Upload,
    pub videos: Vec<Video>,
}

pub async fn load_shell<H: VideoHost>(
    cors_origin: Option<&str>,
    host: &H,
) -> Result<ShellData, LoaderError> {
    let Some(cors_origin) = cors_origin else {
        tracing::error!("CORS_ORIGIN is required");
        return Err(LoaderError::server_error());
    };

    let (upload, videos) = tokio::try_join!(host.create_upload(cors_origin), host.list_assets())?;
    tracing::info!(upload = %upload.id, videos = videos.len(), "shell loaded");

    Ok(ShellData { upload, videos })
}
