use serde::{Deserialize, Serialize};

use crate::context::{WindowScope, WindowsContext};
use crate::input_handler::{
    DragEffect, Draggable, ElementRef, ListenerHandle, ObserverHandle, Point,
};
use crate::state::window::WindowKind;

/// Where the first window lands when no position is given
pub const CASCADE_ORIGIN: Point = Point::new(50.0, 50.0);
/// Offset per already-open window, so new windows never sit exactly on top
/// of each other
pub const CASCADE_STEP: f64 = 30.0;

pub const DEFAULT_WIDTH: f64 = 300.0;
pub const DEFAULT_HEIGHT: f64 = 300.0;

fn default_width() -> f64 {
    DEFAULT_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_HEIGHT
}

pub fn cascade_position(open_windows: usize) -> Point {
    let offset = CASCADE_STEP * open_windows as f64;
    CASCADE_ORIGIN + Point::new(offset, offset)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowProps {
    pub window_id: String,
    pub title: String,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub resizable: bool,
    #[serde(default)]
    pub position: Option<Point>,
}

impl WindowProps {
    pub fn new(window_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            window_id: window_id.into(),
            title: title.into(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            resizable: false,
            position: None,
        }
    }

    pub fn for_kind(kind: WindowKind) -> Self {
        let (width, height) = kind.default_size();
        Self {
            width,
            height,
            ..Self::new(kind.id(), kind.title())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowControl {
    Minimize,
    Maximize,
    Close,
}

impl WindowControl {
    pub const ALL: [WindowControl; 3] = [
        WindowControl::Minimize,
        WindowControl::Maximize,
        WindowControl::Close,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WindowControl::Minimize => "Minimize",
            WindowControl::Maximize => "Maximize",
            WindowControl::Close => "Close",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlButton {
    pub control: WindowControl,
    pub label: &'static str,
}

/// Everything the webview needs to draw one window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowFrame {
    pub id: String,
    pub title: String,
    pub size: Size,
    pub position: Point,
    pub z_index: usize,
    pub focused: bool,
    pub dragging: bool,
    pub resizable: bool,
    pub controls: Vec<ControlButton>,
    /// Window context provided to the body content
    pub body: WindowScope,
}

/// View model of one floating window, bound to one registry entry
#[derive(Debug)]
pub struct WindowView {
    props: WindowProps,
    size: Size,
    draggable: Draggable,
}

impl WindowView {
    /// Mount the view. The cascade position is captured here, once.
    pub fn mount(props: WindowProps, windows: &WindowsContext) -> (Self, Vec<DragEffect>) {
        let (draggable, effects) = windows.with(|registry| {
            let initial = props
                .position
                .unwrap_or_else(|| cascade_position(registry.len()));
            Draggable::resume(initial, registry.cached_drag(&props.window_id))
        });

        tracing::debug!(window = %props.window_id, position = ?draggable.position(), "mount");
        let size = Size {
            width: props.width,
            height: props.height,
        };
        (
            Self {
                props,
                size,
                draggable,
            },
            effects,
        )
    }

    pub fn id(&self) -> &str {
        &self.props.window_id
    }

    pub fn draggable(&self) -> &Draggable {
        &self.draggable
    }

    /// Current size. Non-resizable windows always use their props.
    pub fn size(&self) -> Size {
        if self.props.resizable {
            self.size
        } else {
            Size {
                width: self.props.width,
                height: self.props.height,
            }
        }
    }

    /// `None` while the window is closed
    pub fn render(&self, windows: &WindowsContext) -> Option<WindowFrame> {
        windows.with(|registry| {
            let z_index = registry.index_of(self.id())?;
            let entry = registry.get(self.id())?;
            Some(WindowFrame {
                id: entry.id.clone(),
                title: self.props.title.clone(),
                size: self.size(),
                position: self.draggable.position(),
                z_index,
                focused: registry.focused() == Some(self.id()),
                dragging: self.draggable.is_dragging(),
                resizable: self.props.resizable,
                controls: WindowControl::ALL
                    .iter()
                    .map(|&control| ControlButton {
                        control,
                        label: control.label(),
                    })
                    .collect(),
                body: WindowScope::from_entry(entry),
            })
        })
    }

    /// Pointer down on the title bar: raise first, then start dragging, in
    /// one registry transition
    pub fn title_pointer_down(
        &mut self,
        windows: &WindowsContext,
        pointer: Point,
        constraint: Option<ElementRef>,
    ) -> Vec<DragEffect> {
        windows.with(|registry| {
            if registry.get(self.id()).is_none() {
                return Vec::new();
            }
            registry.focus(self.id());
            let effects = self.draggable.begin(pointer, constraint);
            registry.cache_drag(self.id(), self.draggable.snapshot());
            effects
        })
    }

    pub fn pointer_move(&mut self, handle: ListenerHandle, pointer: Point) -> bool {
        self.draggable.pointer_move(handle, pointer)
    }

    pub fn pointer_up(&mut self, windows: &WindowsContext, handle: ListenerHandle) -> Vec<DragEffect> {
        let effects = self.draggable.pointer_up(handle);
        self.forget_gesture(windows, &effects);
        effects
    }

    pub fn pointer_cancel(
        &mut self,
        windows: &WindowsContext,
        handle: ListenerHandle,
    ) -> Vec<DragEffect> {
        let effects = self.draggable.pointer_cancel(handle);
        self.forget_gesture(windows, &effects);
        effects
    }

    pub fn constraint_visibility(&mut self, handle: ObserverHandle, visible: bool) -> bool {
        self.draggable.set_constraint_visible(handle, visible)
    }

    /// Returns whether the registry changed
    pub fn press_control(&mut self, windows: &WindowsContext, control: WindowControl) -> bool {
        match control {
            WindowControl::Close => windows.close(self.id()),
            WindowControl::Minimize | WindowControl::Maximize => {
                tracing::debug!(window = %self.id(), control = control.label(), "control not implemented");
                false
            }
        }
    }

    /// Resizing is not implemented; the requested size is ignored
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.props.resizable {
            tracing::debug!(window = %self.id(), width, height, "resize ignored");
        }
    }

    /// Tear the view down. The registry keeps any cached gesture so a
    /// remount can continue it.
    pub fn unmount(mut self) -> Vec<DragEffect> {
        tracing::debug!(window = %self.id(), "unmount");
        self.draggable.dispose()
    }

    fn forget_gesture(&self, windows: &WindowsContext, effects: &[DragEffect]) {
        if !effects.is_empty() && !self.draggable.is_dragging() {
            windows.with(|registry| registry.clear_drag(self.id()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listen_handle(effects: &[DragEffect]) -> ListenerHandle {
        effects
            .iter()
            .find_map(|e| match e {
                DragEffect::Listen { handle } => Some(*handle),
                _ => None,
            })
            .expect("Expected a Listen effect")
    }

    #[test]
    fn test_closed_window_renders_nothing() {
        let windows = WindowsContext::default();
        let (view, _) = WindowView::mount(WindowProps::new("videos", "Videos"), &windows);
        assert!(view.render(&windows).is_none());

        windows.open("videos", None);
        assert!(view.render(&windows).is_some());
    }

    #[test]
    fn test_cascade_position_captured_once() {
        let windows = WindowsContext::default();
        windows.open("videos", None);
        windows.open("media-player", None);

        let (view, _) = WindowView::mount(WindowProps::new("media-player", "Player"), &windows);
        let expected = cascade_position(2);
        assert_eq!(view.draggable().position(), expected);
        assert_eq!(expected, Point::new(110.0, 110.0));

        windows.open("my-computer", None);
        let frame = view.render(&windows).unwrap();
        assert_eq!(frame.position, expected);
    }

    #[test]
    fn test_explicit_position_wins() {
        let windows = WindowsContext::default();
        windows.open("videos", None);
        let mut props = WindowProps::new("videos", "Videos");
        props.position = Some(Point::new(5.0, 6.0));

        let (view, _) = WindowView::mount(props, &windows);
        assert_eq!(view.draggable().position(), Point::new(5.0, 6.0));
    }

    #[test]
    fn test_z_index_follows_registry_order() {
        let windows = WindowsContext::default();
        windows.open("videos", None);
        windows.open("media-player", None);
        let (videos, _) = WindowView::mount(WindowProps::new("videos", "Videos"), &windows);
        let (player, _) = WindowView::mount(WindowProps::new("media-player", "Player"), &windows);

        assert_eq!(videos.render(&windows).unwrap().z_index, 0);
        assert_eq!(player.render(&windows).unwrap().z_index, 1);
        assert!(player.render(&windows).unwrap().focused);

        windows.focus("videos");
        let videos_frame = videos.render(&windows).unwrap();
        assert_eq!(videos_frame.z_index, 1);
        assert!(videos_frame.focused);
        assert_eq!(player.render(&windows).unwrap().z_index, 0);
    }

    #[test]
    fn test_title_pointer_down_focuses_then_drags() {
        let windows = WindowsContext::default();
        windows.open("videos", None);
        windows.open("media-player", None);
        let mut props = WindowProps::new("videos", "Videos");
        props.position = Some(Point::new(10.0, 10.0));
        let (mut view, _) = WindowView::mount(props, &windows);

        let effects = view.title_pointer_down(&windows, Point::new(100.0, 100.0), None);
        let handle = listen_handle(&effects);
        assert_eq!(windows.focused().as_deref(), Some("videos"));
        assert_eq!(windows.snapshot().index_of("videos"), Some(1));

        assert!(view.pointer_move(handle, Point::new(150.0, 120.0)));
        view.pointer_up(&windows, handle);
        let frame = view.render(&windows).unwrap();
        assert_eq!(frame.position, Point::new(60.0, 30.0));
        assert!(!frame.dragging);
    }

    #[test]
    fn test_pointer_down_on_closed_window_is_ignored() {
        let windows = WindowsContext::default();
        let (mut view, _) = WindowView::mount(WindowProps::new("videos", "Videos"), &windows);
        assert!(view
            .title_pointer_down(&windows, Point::new(1.0, 1.0), None)
            .is_empty());
        assert!(!view.draggable().is_dragging());
    }

    #[test]
    fn test_remount_mid_drag_continues_gesture() {
        let windows = WindowsContext::default();
        windows.open("videos", None);
        let mut props = WindowProps::new("videos", "Videos");
        props.position = Some(Point::new(10.0, 10.0));
        let (mut view, _) = WindowView::mount(props.clone(), &windows);

        view.title_pointer_down(&windows, Point::new(100.0, 100.0), None);
        let released = view.unmount();
        assert_eq!(released.len(), 1);

        let (mut view, effects) = WindowView::mount(props.clone(), &windows);
        let handle = listen_handle(&effects);
        assert!(view.draggable().is_dragging());
        view.pointer_move(handle, Point::new(150.0, 120.0));
        assert_eq!(view.draggable().position(), Point::new(60.0, 30.0));

        view.pointer_up(&windows, handle);
        let (view, effects) = WindowView::mount(props, &windows);
        assert!(effects.is_empty());
        assert!(!view.draggable().is_dragging());
    }

    #[test]
    fn test_controls() {
        let windows = WindowsContext::default();
        windows.open("videos", None);
        let (mut view, _) = WindowView::mount(WindowProps::new("videos", "Videos"), &windows);

        let frame = view.render(&windows).unwrap();
        let labels: Vec<_> = frame.controls.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Minimize", "Maximize", "Close"]);

        assert!(!view.press_control(&windows, WindowControl::Minimize));
        assert!(!view.press_control(&windows, WindowControl::Maximize));
        assert!(view.render(&windows).is_some());

        assert!(view.press_control(&windows, WindowControl::Close));
        assert!(view.render(&windows).is_none());
    }

    #[test]
    fn test_resize_is_stubbed() {
        let windows = WindowsContext::default();
        let mut props = WindowProps::new("videos", "Videos");
        props.resizable = true;
        let (mut view, _) = WindowView::mount(props, &windows);

        view.resize(800.0, 600.0);
        assert_eq!(
            view.size(),
            Size {
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT
            }
        );
    }

    #[test]
    fn test_body_scope_carries_window_context() {
        let windows = WindowsContext::default();
        windows.open("media-player", None);
        let (view, _) = WindowView::mount(WindowProps::for_kind(WindowKind::MediaPlayer), &windows);

        let frame = view.render(&windows).unwrap();
        assert_eq!(frame.body.id, "media-player");
        assert_eq!(frame.title, "Media Player");
        assert!(frame.body.context.is_none());
    }
}
