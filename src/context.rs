// Window list context and per-window context.
//
// Views never reach for ambient state. A `RenderScope` is threaded through
// view construction; providers add to it and consumers read from it, failing
// loudly when the provider they need is not in scope.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;

use crate::state::window::{WindowContext, WindowEntry, WindowPayload};
use crate::state::{RegistryState, WindowRegistry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("{hook} must be used within a {provider} provider")]
    MissingProvider {
        hook: &'static str,
        provider: &'static str,
    },

    #[error("Window context value does not match predicate")]
    TypeMismatch,
}

/// Shared handle over the window registry, handed to every component that
/// enumerates or mutates the open windows
#[derive(Clone, Debug, Default)]
pub struct WindowsContext {
    registry: Arc<Mutex<WindowRegistry>>,
}

impl WindowsContext {
    pub fn new(registry: WindowRegistry) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
        }
    }

    // Registry state is swapped atomically, so a panic elsewhere can never
    // leave it half-updated and a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, WindowRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run several registry operations as one transition
    pub fn with<R>(&self, f: impl FnOnce(&mut WindowRegistry) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> Arc<RegistryState> {
        self.lock().snapshot()
    }

    pub fn windows(&self) -> Vec<WindowEntry> {
        self.lock().windows().to_vec()
    }

    pub fn focused(&self) -> Option<String> {
        self.lock().focused().map(str::to_string)
    }

    pub fn open(&self, id: &str, context: WindowContext) -> bool {
        self.lock().open(id, context)
    }

    pub fn close(&self, id: &str) -> bool {
        self.lock().close(id)
    }

    pub fn focus(&self, id: &str) -> bool {
        self.lock().focus(id)
    }

    pub fn blur(&self) -> bool {
        self.lock().blur()
    }

    /// Scope for the body of window `id`, if it is open
    pub fn window_scope(&self, id: &str) -> Option<WindowScope> {
        self.lock().get(id).map(WindowScope::from_entry)
    }
}

/// Identity and context of the one window a subtree is rendered inside
#[derive(Clone, Debug, Serialize)]
pub struct WindowScope {
    pub id: String,
    #[serde(serialize_with = "serialize_context")]
    pub context: WindowContext,
}

fn serialize_context<S: serde::Serializer>(
    context: &WindowContext,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    context.as_deref().serialize(serializer)
}

impl WindowScope {
    pub fn from_entry(entry: &WindowEntry) -> Self {
        Self {
            id: entry.id.clone(),
            context: entry.context.clone(),
        }
    }

    pub fn payload(&self) -> Option<&WindowPayload> {
        self.context.as_deref()
    }

    /// Narrow the context to a concrete payload type
    pub fn narrow<T: FromPayload>(&self) -> Result<T, ContextError> {
        T::from_payload(self.payload()).ok_or(ContextError::TypeMismatch)
    }

    /// Check the context against an arbitrary predicate
    pub fn expect_context(
        &self,
        predicate: impl FnOnce(Option<&WindowPayload>) -> bool,
    ) -> Result<&Self, ContextError> {
        if predicate(self.payload()) {
            Ok(self)
        } else {
            Err(ContextError::TypeMismatch)
        }
    }
}

/// A payload shape a window body can ask for
pub trait FromPayload: Sized {
    fn from_payload(payload: Option<&WindowPayload>) -> Option<Self>;
}

/// Context of a media player window
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MediaPlayerContext {
    pub video_id: String,
}

impl FromPayload for MediaPlayerContext {
    fn from_payload(payload: Option<&WindowPayload>) -> Option<Self> {
        match payload {
            Some(WindowPayload::MediaPlayer { video_id }) => Some(Self {
                video_id: video_id.clone(),
            }),
            _ => None,
        }
    }
}

/// The unit context
impl FromPayload for () {
    fn from_payload(payload: Option<&WindowPayload>) -> Option<Self> {
        payload.is_none().then_some(())
    }
}

/// Providers in scope for the component being built
#[derive(Clone, Debug, Default)]
pub struct RenderScope {
    windows: Option<WindowsContext>,
    window: Option<WindowScope>,
}

impl RenderScope {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_windows(&self, windows: WindowsContext) -> Self {
        Self {
            windows: Some(windows),
            window: self.window.clone(),
        }
    }

    pub fn with_window(&self, window: WindowScope) -> Self {
        Self {
            windows: self.windows.clone(),
            window: Some(window),
        }
    }

    pub fn use_windows_context(&self) -> Result<&WindowsContext, ContextError> {
        self.windows.as_ref().ok_or(ContextError::MissingProvider {
            hook: "useWindowsContext",
            provider: "WindowsContext",
        })
    }

    pub fn use_window_context(&self) -> Result<&WindowScope, ContextError> {
        self.window.as_ref().ok_or(ContextError::MissingProvider {
            hook: "useWindowContext",
            provider: "WindowContext",
        })
    }

    /// `use_window_context` narrowed to `T`; a missing provider is reported
    /// before a shape mismatch
    pub fn use_window_context_as<T: FromPayload>(&self) -> Result<T, ContextError> {
        self.use_window_context()?.narrow()
    }
}
