use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direct-upload endpoint handed to the upload widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Uploading,
    Processing,
    Ready,
    Error,
}

/// One entry of the video library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub name: String,
    pub playback_id: Option<String>,
    pub status: VideoStatus,
    /// Percentage, only reported while uploading
    pub progress: Option<f64>,
}

impl Video {
    pub fn is_ready(&self) -> bool {
        self.status == VideoStatus::Ready
    }

    /// Public stream URL, once the asset has a playback id
    pub fn stream_url(&self) -> Option<String> {
        self.playback_id
            .as_ref()
            .map(|id| format!("https://stream.mux.com/{}/high.mp4", id))
    }
}

#[derive(Debug, Error)]
pub enum VideoHostError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}
