use super::store::{MediaIntent, MediaState};

/// Pauses playback while the viewer is not looking at the screen.
///
/// Presence reports come from an external face detector running in the
/// webview. The gate only resumes playback that it paused itself, so a video
/// the user paused stays paused when they look back.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AttentionGate {
    enabled: bool,
    paused_by_gate: bool,
}

impl AttentionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn paused_playback(&self) -> bool {
        self.paused_by_gate
    }

    /// Returns Play when disabling the gate while it holds playback paused.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<MediaIntent> {
        self.enabled = enabled;
        if !enabled && self.paused_by_gate {
            self.paused_by_gate = false;
            return Some(MediaIntent::Play);
        }
        None
    }

    /// Feed one presence report. Returns the intent to dispatch, if any.
    pub fn observe(&mut self, attentive: bool, state: &MediaState) -> Option<MediaIntent> {
        if !self.enabled {
            return None;
        }

        match (attentive, state.paused) {
            (false, false) => {
                tracing::debug!("attention lost, pausing");
                self.paused_by_gate = true;
                Some(MediaIntent::Pause)
            }
            (true, true) if self.paused_by_gate => {
                tracing::debug!("attention back, resuming");
                self.paused_by_gate = false;
                Some(MediaIntent::Play)
            }
            (true, false) => {
                // Playback resumed some other way
                self.paused_by_gate = false;
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> MediaState {
        MediaState {
            paused: false,
            ..MediaState::default()
        }
    }

    #[test]
    fn test_disabled_gate_does_nothing() {
        let mut gate = AttentionGate::new();
        assert!(!gate.is_enabled());
        assert_eq!(gate.observe(false, &playing()), None);
        assert!(!gate.paused_playback());
    }

    #[test]
    fn test_pauses_and_resumes() {
        let mut gate = AttentionGate::new();
        gate.set_enabled(true);

        assert_eq!(gate.observe(false, &playing()), Some(MediaIntent::Pause));
        assert!(gate.paused_playback());

        // Repeated reports while away do nothing
        assert_eq!(gate.observe(false, &MediaState::default()), None);

        assert_eq!(gate.observe(true, &MediaState::default()), Some(MediaIntent::Play));
        assert!(!gate.paused_playback());
    }

    #[test]
    fn test_does_not_resume_user_pause() {
        let mut gate = AttentionGate::new();
        gate.set_enabled(true);

        let paused = MediaState::default();
        assert_eq!(gate.observe(false, &paused), None);
        assert_eq!(gate.observe(true, &paused), None);
    }

    #[test]
    fn test_disabling_releases_pause() {
        let mut gate = AttentionGate::new();
        gate.set_enabled(true);
        gate.observe(false, &playing());

        assert_eq!(gate.set_enabled(false), Some(MediaIntent::Play));
        assert_eq!(gate.set_enabled(false), None);
    }

    #[test]
    fn test_manual_resume_clears_gate_pause() {
        let mut gate = AttentionGate::new();
        gate.set_enabled(true);
        gate.observe(false, &playing());

        // User pressed play while away, then looked back
        assert_eq!(gate.observe(true, &playing()), None);
        assert_eq!(gate.observe(true, &MediaState::default()), None);
    }
}
