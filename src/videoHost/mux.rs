use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::types::{Upload, Video, VideoHostError, VideoStatus};
use super::VideoHost;
use crate::config::ShellConfig;

/// Mux wraps every payload in `{ "data": ... }`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct NewAssetSettings<'a> {
    playback_policy: [&'a str; 1],
    video_quality: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateUploadRequest<'a> {
    new_asset_settings: NewAssetSettings<'a>,
    cors_origin: &'a str,
}

#[derive(Debug, Deserialize)]
struct MuxUpload {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct MuxPlaybackId {
    id: String,
    policy: String,
}

#[derive(Debug, Deserialize)]
struct MuxProgress {
    state: String,
    #[serde(default)]
    progress: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct MuxMeta {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MuxAsset {
    id: String,
    status: String,
    #[serde(default)]
    playback_ids: Vec<MuxPlaybackId>,
    #[serde(default)]
    progress: Option<MuxProgress>,
    #[serde(default)]
    meta: Option<MuxMeta>,
    #[serde(default)]
    passthrough: Option<String>,
}

impl From<MuxAsset> for Video {
    fn from(asset: MuxAsset) -> Self {
        let ingesting = asset
            .progress
            .as_ref()
            .is_some_and(|p| p.state == "ingesting");
        let status = match asset.status.as_str() {
            "ready" => VideoStatus::Ready,
            "errored" => VideoStatus::Error,
            _ if ingesting => VideoStatus::Uploading,
            _ => VideoStatus::Processing,
        };
        let progress = if status == VideoStatus::Uploading {
            asset.progress.and_then(|p| p.progress)
        } else {
            None
        };
        let playback_id = asset
            .playback_ids
            .iter()
            .find(|p| p.policy == "public")
            .or(asset.playback_ids.first())
            .map(|p| p.id.clone());
        let name = asset
            .meta
            .and_then(|m| m.title)
            .or(asset.passthrough)
            .unwrap_or_else(|| asset.id.clone());

        Video {
            id: asset.id,
            name,
            playback_id,
            status,
            progress,
        }
    }
}

/// Client for the Mux video API. Not `Debug`: it holds the token secret.
#[derive(Clone)]
pub struct MuxClient {
    http: reqwest::Client,
    base_url: String,
    token_id: String,
    token_secret: String,
}

impl MuxClient {
    pub fn new(config: &ShellConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.mux_api_url.clone(),
            token_id: config.mux_token_id.clone(),
            token_secret: config.mux_token_secret.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/video/v1/{}", self.base_url, path)
    }

    async fn fetch(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, VideoHostError> {
        let response = request
            .basic_auth(&self.token_id, Some(&self.token_secret))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VideoHostError::Status(response.status()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, VideoHostError> {
    let envelope: Envelope<T> = serde_json::from_slice(bytes)?;
    Ok(envelope.data)
}

fn decode_assets(bytes: &[u8]) -> Result<Vec<Video>, VideoHostError> {
    let assets: Vec<MuxAsset> = decode(bytes)?;
    Ok(assets.into_iter().map(Video::from).collect())
}

impl VideoHost for MuxClient {
    async fn create_upload(&self, cors_origin: &str) -> Result<Upload, VideoHostError> {
        let body = CreateUploadRequest {
            new_asset_settings: NewAssetSettings {
                playback_policy: ["public"],
                video_quality: "basic",
            },
            cors_origin,
        };
        let bytes = self
            .fetch(self.http.post(self.endpoint("uploads")).json(&body))
            .await?;
        let upload: MuxUpload = decode(&bytes)?;
        tracing::info!(upload = %upload.id, "created direct upload");
        Ok(Upload {
            id: upload.id,
            url: upload.url,
        })
    }

    async fn list_assets(&self) -> Result<Vec<Video>, VideoHostError> {
        let bytes = self.fetch(self.http.get(self.endpoint("assets"))).await?;
        let videos = decode_assets(&bytes)?;
        tracing::debug!(count = videos.len(), "listed assets");
        Ok(videos)
    }
}
