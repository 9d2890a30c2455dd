// Player controls. Every control is a pure function of the media state: the
// player owns no playback state of its own.

use serde::Serialize;

use super::store::{MediaIntent, MediaState};
use crate::context::{ContextError, MediaPlayerContext, RenderScope};
use crate::video_host::Video;

/// Shown when the player is opened without a video
pub const DEFAULT_SOURCE: &str = "https://stream.mux.com/DS00Spx1CV902MCtPj5WknGlR102V5HFkDe/high.mp4";

pub const PLAYBACK_RATE_MIN: f64 = 0.25;
pub const PLAYBACK_RATE_MAX: f64 = 2.0;
pub const PLAYBACK_RATE_STEP: f64 = 0.25;

pub const VOLUME_MIN: f64 = 0.0;
pub const VOLUME_MAX: f64 = 1.0;
pub const VOLUME_STEP: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonView {
    pub label: &'static str,
    /// Dispatched on click
    pub intent: MediaIntent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderView {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerControls {
    pub play: ButtonView,
    pub fullscreen: ButtonView,
    pub playback_speed: SliderView,
    pub volume: SliderView,
}

pub fn play_button(state: &MediaState) -> ButtonView {
    if state.paused {
        ButtonView {
            label: "Play",
            intent: MediaIntent::Play,
        }
    } else {
        ButtonView {
            label: "Pause",
            intent: MediaIntent::Pause,
        }
    }
}

pub fn fullscreen_button(state: &MediaState) -> ButtonView {
    if state.fullscreen {
        ButtonView {
            label: "Exit fullscreen",
            intent: MediaIntent::ExitFullscreen,
        }
    } else {
        ButtonView {
            label: "Enter fullscreen",
            intent: MediaIntent::EnterFullscreen,
        }
    }
}

pub fn playback_speed_slider(state: &MediaState) -> SliderView {
    SliderView {
        min: PLAYBACK_RATE_MIN,
        max: PLAYBACK_RATE_MAX,
        step: PLAYBACK_RATE_STEP,
        value: state.playback_rate,
        label: format!("{}x", state.playback_rate),
    }
}

pub fn on_playback_speed_input(rate: f64) -> Vec<MediaIntent> {
    vec![MediaIntent::SetPlaybackRate(
        rate.clamp(PLAYBACK_RATE_MIN, PLAYBACK_RATE_MAX),
    )]
}

pub fn volume_slider(state: &MediaState) -> SliderView {
    let shown = if state.muted { 0.0 } else { state.volume };
    SliderView {
        min: VOLUME_MIN,
        max: VOLUME_MAX,
        step: VOLUME_STEP,
        value: shown,
        label: format!("{}%", (shown * 100.0).round()),
    }
}

/// Moving the volume slider also unmutes a muted player
pub fn on_volume_input(state: &MediaState, volume: f64) -> Vec<MediaIntent> {
    let mut intents = vec![MediaIntent::SetVolume(volume)];
    if state.muted && volume > 0.0 {
        intents.push(MediaIntent::Unmute);
    }
    intents
}

pub fn controls(state: &MediaState) -> PlayerControls {
    PlayerControls {
        play: play_button(state),
        fullscreen: fullscreen_button(state),
        playback_speed: playback_speed_slider(state),
        volume: volume_slider(state),
    }
}

/// Source URL for the player rendered inside `scope`.
///
/// A player window opened for a specific video plays that video once it has
/// a playback id; a player opened from the desktop plays the default source.
pub fn source_url(scope: &RenderScope, library: &[Video]) -> Result<Option<String>, ContextError> {
    let window = scope.use_window_context()?;
    if window.payload().is_none() {
        return Ok(Some(DEFAULT_SOURCE.to_string()));
    }

    let MediaPlayerContext { video_id } = window.narrow()?;
    Ok(library
        .iter()
        .find(|v| v.id == video_id)
        .and_then(Video::stream_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::WindowsContext;
    use crate::state::window::WindowPayload;
    use crate::video_host::fake::video;
    use crate::video_host::VideoStatus;
    use std::sync::Arc;

    #[test]
    fn test_play_button_toggles() {
        let mut state = MediaState::default();
        assert_eq!(play_button(&state).label, "Play");
        assert_eq!(play_button(&state).intent, MediaIntent::Play);

        state.paused = false;
        assert_eq!(play_button(&state).label, "Pause");
        assert_eq!(play_button(&state).intent, MediaIntent::Pause);
    }

    #[test]
    fn test_fullscreen_button() {
        let mut state = MediaState::default();
        assert_eq!(fullscreen_button(&state).label, "Enter fullscreen");
        state.fullscreen = true;
        assert_eq!(fullscreen_button(&state).intent, MediaIntent::ExitFullscreen);
    }

    #[test]
    fn test_speed_slider() {
        let mut state = MediaState::default();
        assert_eq!(playback_speed_slider(&state).label, "1x");
        state.playback_rate = 0.25;
        assert_eq!(playback_speed_slider(&state).label, "0.25x");

        assert_eq!(
            on_playback_speed_input(5.0),
            vec![MediaIntent::SetPlaybackRate(2.0)]
        );
    }

    #[test]
    fn test_volume_slider_shows_zero_while_muted() {
        let state = MediaState {
            volume: 0.8,
            muted: true,
            ..MediaState::default()
        };
        let slider = volume_slider(&state);
        assert_eq!(slider.value, 0.0);
        assert_eq!(slider.label, "0%");

        let state = MediaState {
            muted: false,
            ..state
        };
        assert_eq!(volume_slider(&state).label, "80%");
    }

    #[test]
    fn test_volume_input_unmutes() {
        let muted = MediaState::default();
        assert_eq!(
            on_volume_input(&muted, 0.4),
            vec![MediaIntent::SetVolume(0.4), MediaIntent::Unmute]
        );
        assert_eq!(on_volume_input(&muted, 0.0), vec![MediaIntent::SetVolume(0.0)]);

        let unmuted = MediaState {
            muted: false,
            ..muted
        };
        assert_eq!(on_volume_input(&unmuted, 0.4), vec![MediaIntent::SetVolume(0.4)]);
    }

    #[test]
    fn test_source_url() {
        let windows = WindowsContext::default();
        let library = vec![
            video("ready", VideoStatus::Ready),
            video("busy", VideoStatus::Processing),
        ];

        windows.open("media-player", None);
        let scope = RenderScope::root().with_window(windows.window_scope("media-player").unwrap());
        assert_eq!(
            source_url(&scope, &library).unwrap().as_deref(),
            Some(DEFAULT_SOURCE)
        );

        windows.open(
            "media-player",
            Some(Arc::new(WindowPayload::MediaPlayer {
                video_id: "ready".to_string(),
            })),
        );
        let scope = RenderScope::root().with_window(windows.window_scope("media-player").unwrap());
        assert_eq!(
            source_url(&scope, &library).unwrap().as_deref(),
            Some("https://stream.mux.com/pb-ready/high.mp4")
        );

        windows.open("media-player", Some(Arc::new(WindowPayload::Videos)));
        let scope = RenderScope::root().with_window(windows.window_scope("media-player").unwrap());
        assert_eq!(source_url(&scope, &library), Err(ContextError::TypeMismatch));

        assert!(source_url(&RenderScope::root(), &library).is_err());
    }
}
