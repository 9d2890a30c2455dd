use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use self::window::{same_context, WindowContext, WindowEntry};
use crate::input_handler::DragSnapshot;

pub mod window;

/// Immutable view of the open windows. Position in `windows` is the z-order
/// (later = on top).
#[derive(Clone, Debug, Default, Serialize)]
pub struct RegistryState {
    pub windows: Vec<WindowEntry>,
    pub focused: Option<String>,
}

impl RegistryState {
    pub fn contains(&self, id: &str) -> bool {
        self.windows.iter().any(|w| w.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.windows.iter().position(|w| w.id == id)
    }
}

/// Owns the open windows, their stacking order and focus.
///
/// Every mutation swaps in a fresh `Arc<RegistryState>`; an operation that
/// changes nothing keeps the previous `Arc`, so callers can detect no-ops by
/// pointer identity. All operations are total and return whether they changed
/// the state.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    state: Arc<RegistryState>,
    // In-flight drag gestures, kept here so a remounted window view can pick
    // its gesture back up
    drag_cache: HashMap<String, DragSnapshot>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<RegistryState> {
        Arc::clone(&self.state)
    }

    pub fn windows(&self) -> &[WindowEntry] {
        &self.state.windows
    }

    pub fn focused(&self) -> Option<&str> {
        self.state.focused.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&WindowEntry> {
        self.state.windows.iter().find(|w| w.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.state.index_of(id)
    }

    pub fn len(&self) -> usize {
        self.state.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.windows.is_empty()
    }

    /// Open (or re-open) a window.
    ///
    /// Re-opening with the very same context is a plain `focus`. Any other
    /// open removes an existing entry with this id, appends the new one on top
    /// and focuses it.
    pub fn open(&mut self, id: &str, context: WindowContext) -> bool {
        if let Some(existing) = self.get(id) {
            if same_context(&existing.context, &context) {
                return self.focus(id);
            }
        }

        let mut windows: Vec<WindowEntry> = self
            .state
            .windows
            .iter()
            .filter(|w| w.id != id)
            .cloned()
            .collect();
        windows.push(WindowEntry {
            id: id.to_string(),
            context,
        });

        tracing::debug!(window = id, "open");
        self.state = Arc::new(RegistryState {
            windows,
            focused: Some(id.to_string()),
        });
        true
    }

    /// Close a window. Focus passes to the new topmost window when the closed
    /// one was focused.
    pub fn close(&mut self, id: &str) -> bool {
        if !self.state.contains(id) {
            return false;
        }

        let windows: Vec<WindowEntry> = self
            .state
            .windows
            .iter()
            .filter(|w| w.id != id)
            .cloned()
            .collect();
        let focused = if self.state.focused.as_deref() == Some(id) {
            windows.last().map(|w| w.id.clone())
        } else {
            self.state.focused.clone()
        };

        tracing::debug!(window = id, ?focused, "close");
        self.drag_cache.remove(id);
        self.state = Arc::new(RegistryState { windows, focused });
        true
    }

    /// Raise a window to the top and focus it
    pub fn focus(&mut self, id: &str) -> bool {
        if !self.state.contains(id) || self.state.focused.as_deref() == Some(id) {
            return false;
        }

        let mut windows = Vec::with_capacity(self.state.windows.len());
        let mut raised = None;
        for w in self.state.windows.iter() {
            if w.id == id {
                raised = Some(w.clone());
            } else {
                windows.push(w.clone());
            }
        }
        windows.extend(raised);

        tracing::debug!(window = id, "focus");
        self.state = Arc::new(RegistryState {
            windows,
            focused: Some(id.to_string()),
        });
        true
    }

    pub fn blur(&mut self) -> bool {
        if self.state.focused.is_none() {
            return false;
        }

        self.state = Arc::new(RegistryState {
            windows: self.state.windows.clone(),
            focused: None,
        });
        true
    }

    pub fn cached_drag(&self, id: &str) -> Option<DragSnapshot> {
        self.drag_cache.get(id).copied()
    }

    pub fn cache_drag(&mut self, id: &str, snapshot: DragSnapshot) {
        self.drag_cache.insert(id.to_string(), snapshot);
    }

    pub fn clear_drag(&mut self, id: &str) {
        self.drag_cache.remove(id);
    }
}
