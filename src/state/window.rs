use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};

/// Per-window payload, keyed by the kind of window it belongs to
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WindowPayload {
    MediaPlayer {
        #[serde(rename = "videoId")]
        video_id: String,
    },
    Videos,
    MyComputer,
    /// Anything without a dedicated kind
    Custom { data: Map<String, Value> },
}

/// Caller-supplied context. `None` is the unit context.
///
/// Identity is the `Arc` pointer: two contexts are "the same" only when they
/// came from the same `open` call, never because their contents match.
pub type WindowContext = Option<Arc<WindowPayload>>;

pub fn same_context(a: &WindowContext, b: &WindowContext) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

#[derive(Clone, Debug)]
pub struct WindowEntry {
    pub id: String,          // Window kind tag, the sole identity key
    pub context: WindowContext,
}

impl Serialize for WindowEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("WindowEntry", 2)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("context", &self.context.as_deref())?;
        s.end()
    }
}

static MY_COMPUTER_PAYLOAD: LazyLock<Arc<WindowPayload>> =
    LazyLock::new(|| Arc::new(WindowPayload::MyComputer));
static VIDEOS_PAYLOAD: LazyLock<Arc<WindowPayload>> =
    LazyLock::new(|| Arc::new(WindowPayload::Videos));

/// Window kinds the desktop knows how to open
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum WindowKind {
    MyComputer,
    Videos,
    MediaPlayer,
}

impl WindowKind {
    pub const ALL: [WindowKind; 3] = [
        WindowKind::MyComputer,
        WindowKind::Videos,
        WindowKind::MediaPlayer,
    ];

    /// Registry id used for windows of this kind
    pub fn id(&self) -> &'static str {
        match self {
            WindowKind::MyComputer => "my-computer",
            WindowKind::Videos => "videos",
            WindowKind::MediaPlayer => "media-player",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            WindowKind::MyComputer => "My Computer",
            WindowKind::Videos => "Videos",
            WindowKind::MediaPlayer => "Media Player",
        }
    }

    /// Default (width, height)
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            WindowKind::MyComputer => (300.0, 300.0),
            WindowKind::Videos => (480.0, 360.0),
            WindowKind::MediaPlayer => (640.0, 420.0),
        }
    }

    /// Payload attached when a desktop icon opens this kind. Every call
    /// hands out the same instance, so reopening from the desktop is a focus.
    pub fn default_payload(&self) -> WindowContext {
        match self {
            WindowKind::MyComputer => Some(Arc::clone(&MY_COMPUTER_PAYLOAD)),
            WindowKind::Videos => Some(Arc::clone(&VIDEOS_PAYLOAD)),
            WindowKind::MediaPlayer => None,
        }
    }
}
