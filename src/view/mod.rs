// View models rendered by the webview

pub mod desktop;
pub mod videos;
pub mod window;

use std::collections::HashMap;

use crate::context::WindowsContext;
use crate::input_handler::{DragEffect, ListenerHandle};
use desktop::StartMenu;
use videos::Library;
use window::{WindowProps, WindowView};

/// Host-side state of everything drawn on the desktop except the window
/// list itself, which lives in the registry
#[derive(Debug, Default)]
pub struct Desktop {
    views: HashMap<String, WindowView>,
    pub start_menu: StartMenu,
    pub library: Library,
}

impl Desktop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a view for `props.window_id`. An existing view for the same id
    /// is unmounted first; its effects come before the new view's.
    pub fn mount(&mut self, props: WindowProps, windows: &WindowsContext) -> Vec<DragEffect> {
        let mut effects = self.unmount(&props.window_id);
        let (view, mounted) = WindowView::mount(props, windows);
        effects.extend(mounted);
        self.views.insert(view.id().to_string(), view);
        effects
    }

    pub fn unmount(&mut self, id: &str) -> Vec<DragEffect> {
        self.views
            .remove(id)
            .map(WindowView::unmount)
            .unwrap_or_default()
    }

    /// Pointer up (or cancel, when `cancelled`) for a gesture on window
    /// `id`. With no view mounted the cached gesture is dropped so a later
    /// mount does not resume a drag nobody is holding.
    pub fn end_drag(
        &mut self,
        windows: &WindowsContext,
        id: &str,
        handle: ListenerHandle,
        cancelled: bool,
    ) -> Vec<DragEffect> {
        match self.views.get_mut(id) {
            Some(view) if cancelled => view.pointer_cancel(windows, handle),
            Some(view) => view.pointer_up(windows, handle),
            None => {
                tracing::debug!(window = id, "drag ended while unmounted");
                windows.with(|registry| registry.clear_drag(id));
                Vec::new()
            }
        }
    }

    pub fn view(&self, id: &str) -> Option<&WindowView> {
        self.views.get(id)
    }

    pub fn view_mut(&mut self, id: &str) -> Option<&mut WindowView> {
        self.views.get_mut(id)
    }

    pub fn mounted(&self) -> usize {
        self.views.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_handler::Point;

    #[test]
    fn test_remount_releases_previous_gesture() {
        let windows = WindowsContext::default();
        windows.open("videos", None);
        let mut desktop = Desktop::new();

        assert!(desktop.mount(WindowProps::new("videos", "Videos"), &windows).is_empty());
        let begun = desktop
            .view_mut("videos")
            .unwrap()
            .title_pointer_down(&windows, Point::new(60.0, 60.0), None);
        assert_eq!(begun.len(), 1);

        // Remounting releases the old listeners, then resumes the cached drag
        let effects = desktop.mount(WindowProps::new("videos", "Videos"), &windows);
        assert!(matches!(effects[0], DragEffect::Release { .. }));
        assert!(matches!(effects[1], DragEffect::Listen { .. }));
        assert!(desktop.view("videos").unwrap().draggable().is_dragging());
        assert_eq!(desktop.mounted(), 1);
    }

    #[test]
    fn test_drag_ended_while_unmounted_is_not_resumed() {
        let windows = WindowsContext::default();
        windows.open("videos", None);
        let mut desktop = Desktop::new();

        desktop.mount(WindowProps::new("videos", "Videos"), &windows);
        let begun = desktop
            .view_mut("videos")
            .unwrap()
            .title_pointer_down(&windows, Point::new(60.0, 60.0), None);
        let handle = match begun[0] {
            DragEffect::Listen { handle } => handle,
            ref other => panic!("Expected Listen, got {:?}", other),
        };

        desktop.unmount("videos");
        assert!(desktop.end_drag(&windows, "videos", handle, false).is_empty());
        assert!(windows.with(|registry| registry.cached_drag("videos")).is_none());

        let effects = desktop.mount(WindowProps::new("videos", "Videos"), &windows);
        assert!(effects.is_empty());
        assert!(!desktop.view("videos").unwrap().draggable().is_dragging());
    }

    #[test]
    fn test_end_drag_on_mounted_view() {
        let windows = WindowsContext::default();
        windows.open("videos", None);
        let mut desktop = Desktop::new();

        desktop.mount(WindowProps::new("videos", "Videos"), &windows);
        let begun = desktop
            .view_mut("videos")
            .unwrap()
            .title_pointer_down(&windows, Point::new(60.0, 60.0), None);
        let DragEffect::Listen { handle } = begun[0] else {
            panic!("Expected Listen, got {:?}", begun[0]);
        };

        let effects = desktop.end_drag(&windows, "videos", handle, true);
        assert_eq!(effects, vec![DragEffect::Release { handle }]);
        assert!(!desktop.view("videos").unwrap().draggable().is_dragging());
    }

    #[test]
    fn test_unmount_unknown_is_empty() {
        let mut desktop = Desktop::new();
        assert!(desktop.unmount("nope").is_empty());
    }
}
