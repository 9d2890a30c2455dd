use serde::{Deserialize, Serialize};

/// Playback state of the media element
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaState {
    pub paused: bool,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
    pub fullscreen: bool,
}

impl Default for MediaState {
    fn default() -> Self {
        // The player element starts paused and muted
        Self {
            paused: true,
            volume: 1.0,
            muted: true,
            playback_rate: 1.0,
            fullscreen: false,
        }
    }
}

/// State change requests understood by the media element
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", content = "detail", rename_all = "kebab-case")]
pub enum MediaIntent {
    Play,
    Pause,
    SetVolume(f64),
    SetPlaybackRate(f64),
    EnterFullscreen,
    ExitFullscreen,
    Mute,
    Unmute,
}

/// The media state store the player reads from and dispatches to
pub trait MediaStore {
    fn state(&self) -> MediaState;
    fn dispatch(&mut self, intent: MediaIntent);
}

/// Mirror of the webview's media element.
///
/// Dispatched intents are applied optimistically and queued as requests for
/// the element; whatever the element later reports through `sync` wins.
#[derive(Debug, Default)]
pub struct LocalMediaStore {
    state: MediaState,
    requests: Vec<MediaIntent>,
}

impl LocalMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// State reported by the media element
    pub fn sync(&mut self, state: MediaState) {
        self.state = state;
    }

    /// Requests not yet forwarded to the media element
    pub fn drain_requests(&mut self) -> Vec<MediaIntent> {
        std::mem::take(&mut self.requests)
    }
}

impl MediaStore for LocalMediaStore {
    fn state(&self) -> MediaState {
        self.state
    }

    fn dispatch(&mut self, intent: MediaIntent) {
        let state = &mut self.state;
        match intent {
            MediaIntent::Play => state.paused = false,
            MediaIntent::Pause => state.paused = true,
            MediaIntent::SetVolume(volume) => {
                if !volume.is_finite() {
                    tracing::warn!(volume, "ignoring invalid volume");
                    return;
                }
                state.volume = volume.clamp(0.0, 1.0);
            }
            MediaIntent::SetPlaybackRate(rate) => {
                if !rate.is_finite() || rate <= 0.0 {
                    tracing::warn!(rate, "ignoring invalid playback rate");
                    return;
                }
                state.playback_rate = rate;
            }
            MediaIntent::EnterFullscreen => state.fullscreen = true,
            MediaIntent::ExitFullscreen => state.fullscreen = false,
            MediaIntent::Mute => state.muted = true,
            MediaIntent::Unmute => state.muted = false,
        }
        // Clamped values are what the element receives
        let intent = match intent {
            MediaIntent::SetVolume(_) => MediaIntent::SetVolume(state.volume),
            other => other,
        };
        self.requests.push(intent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_applies_and_queues() {
        let mut store = LocalMediaStore::new();
        store.dispatch(MediaIntent::Play);
        store.dispatch(MediaIntent::SetVolume(1.7));
        store.dispatch(MediaIntent::Unmute);
        store.dispatch(MediaIntent::EnterFullscreen);

        let state = store.state();
        assert!(!state.paused);
        assert_eq!(state.volume, 1.0);
        assert!(!state.muted);
        assert!(state.fullscreen);

        assert_eq!(
            store.drain_requests(),
            vec![
                MediaIntent::Play,
                MediaIntent::SetVolume(1.0),
                MediaIntent::Unmute,
                MediaIntent::EnterFullscreen,
            ]
        );
        assert!(store.drain_requests().is_empty());
    }

    #[test]
    fn test_invalid_values_are_dropped() {
        let mut store = LocalMediaStore::new();
        store.dispatch(MediaIntent::SetPlaybackRate(0.0));
        store.dispatch(MediaIntent::SetVolume(f64::NAN));

        assert_eq!(store.state(), MediaState::default());
        assert!(store.drain_requests().is_empty());
    }

    #[test]
    fn test_sync_overrides_optimistic_state() {
        let mut store = LocalMediaStore::new();
        store.dispatch(MediaIntent::Play);
        store.sync(MediaState {
            paused: true,
            ..MediaState::default()
        });
        assert!(store.state().paused);
    }

    #[test]
    fn test_intent_wire_format() {
        let json = serde_json::to_value(MediaIntent::SetVolume(0.5)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "set-volume", "detail": 0.5}));
        let json = serde_json::to_value(MediaIntent::Pause).unwrap();
        assert_eq!(json, serde_json::json!({"type": "pause"}));
    }
}
