// Video library: upload widget state and the list of hosted videos

use std::sync::Arc;

use serde::Serialize;

use crate::context::{ContextError, RenderScope};
use crate::loader::ShellData;
use crate::state::window::{WindowKind, WindowPayload};
use crate::video_host::{Upload, Video, VideoHost, VideoHostError, VideoStatus};

/// Element id shared by the hidden uploader and its drop zone / progress
pub const UPLOADER_ID: &str = "my-videos-uploader";
pub const EMPTY_TEXT: &str = "Drag and drop video files here";
pub const DROP_OVERLAY_TEXT: &str = "Drop video files here";

const ID_DISPLAY_MAX: usize = 15;
const ID_DISPLAY_KEEP: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LibraryItem {
    /// Upload still running
    Progress { id: String, percent: f64 },
    Error { id: String, message: String },
    Entry {
        id: String,
        label: String,
        disabled: bool,
        processing: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryView {
    pub uploader_id: &'static str,
    pub upload_endpoint: Option<String>,
    pub drop_overlay: &'static str,
    pub items: Vec<LibraryItem>,
    /// Shown instead of the items when the library is empty
    pub empty_text: Option<&'static str>,
    pub status: String,
}

/// Ids longer than 15 characters are cut to 12 plus an ellipsis
pub fn display_id(id: &str) -> String {
    if id.chars().count() > ID_DISPLAY_MAX {
        let kept: String = id.chars().take(ID_DISPLAY_KEEP).collect();
        format!("{}...", kept)
    } else {
        id.to_string()
    }
}

pub fn render_item(video: &Video) -> LibraryItem {
    match video.status {
        VideoStatus::Uploading => LibraryItem::Progress {
            id: video.id.clone(),
            percent: video.progress.unwrap_or(0.0),
        },
        VideoStatus::Error => LibraryItem::Error {
            id: video.id.clone(),
            message: format!("Error uploading {}", video.name),
        },
        VideoStatus::Processing | VideoStatus::Ready => LibraryItem::Entry {
            id: video.id.clone(),
            label: display_id(&video.id),
            disabled: !video.is_ready(),
            processing: video.status == VideoStatus::Processing,
        },
    }
}

pub fn status_text(count: usize) -> String {
    format!("{} item(s)", count)
}

/// List the host's assets for a refetch
pub async fn fetch_videos<H: VideoHost>(host: &H) -> Result<Vec<Video>, VideoHostError> {
    let videos = host.list_assets().await?;
    tracing::debug!(count = videos.len(), "library refetched");
    Ok(videos)
}

/// Library contents as last loaded.
///
/// A failed load trips the error boundary: the library renders nothing until
/// the next successful load, and the rest of the shell keeps working.
#[derive(Debug, Default)]
pub struct Library {
    upload: Option<Upload>,
    videos: Vec<Video>,
    failed: bool,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, data: ShellData) {
        self.upload = Some(data.upload);
        self.videos = data.videos;
        self.failed = false;
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    #[cfg(test)]
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Apply the result of a refetch (e.g. after an upload succeeded)
    pub fn apply_fetch(&mut self, result: Result<Vec<Video>, VideoHostError>) {
        match result {
            Ok(videos) => {
                self.videos = videos;
                self.failed = false;
            }
            Err(e) => self.fail(&e),
        }
    }

    pub fn fail(&mut self, error: &dyn std::error::Error) {
        tracing::error!(%error, "video library failed to load");
        self.failed = true;
    }

    pub fn render(&self) -> Option<LibraryView> {
        if self.failed {
            return None;
        }

        Some(LibraryView {
            uploader_id: UPLOADER_ID,
            upload_endpoint: self.upload.as_ref().map(|u| u.url.clone()),
            drop_overlay: DROP_OVERLAY_TEXT,
            items: self.videos.iter().map(render_item).collect(),
            empty_text: self.videos.is_empty().then_some(EMPTY_TEXT),
            status: status_text(self.videos.len()),
        })
    }

    /// Open the player for a ready video. Selecting anything else does
    /// nothing. Returns whether the registry changed.
    pub fn select(&self, scope: &RenderScope, video_id: &str) -> Result<bool, ContextError> {
        let windows = scope.use_windows_context()?;

        let Some(video) = self.videos.iter().find(|v| v.id == video_id) else {
            tracing::warn!(video = video_id, "selected unknown video");
            return Ok(false);
        };
        if !video.is_ready() {
            return Ok(false);
        }

        let payload = WindowPayload::MediaPlayer {
            video_id: video.id.clone(),
        };
        Ok(windows.open(WindowKind::MediaPlayer.id(), Some(Arc::new(payload))))
    }
}
