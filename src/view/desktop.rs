// Desktop shell: icons and the start menu

use serde::Serialize;

use crate::context::{ContextError, RenderScope};
use crate::state::window::WindowKind;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesktopIcon {
    pub kind: WindowKind,
    pub label: &'static str,
    pub icon: &'static str,
}

impl DesktopIcon {
    const FALLBACK_ICON: &'static str = "/icons/window.png";

    fn for_kind(kind: WindowKind) -> Self {
        let icon = match kind {
            WindowKind::MyComputer => "/icons/my-computer.png",
            WindowKind::Videos => "/icons/folder.png",
            WindowKind::MediaPlayer => "/icons/media-player.png",
        };
        Self {
            kind,
            label: kind.title(),
            icon,
        }
    }

    pub fn icon_or_fallback(&self) -> &'static str {
        if self.icon.is_empty() {
            Self::FALLBACK_ICON
        } else {
            self.icon
        }
    }
}

pub fn desktop_icons() -> Vec<DesktopIcon> {
    WindowKind::ALL
        .into_iter()
        .map(DesktopIcon::for_kind)
        .map(|icon| DesktopIcon {
            icon: icon.icon_or_fallback(),
            ..icon
        })
        .collect()
}

/// Icon click: open the icon's window kind. Returns whether the registry
/// changed.
pub fn activate_icon(scope: &RenderScope, kind: WindowKind) -> Result<bool, ContextError> {
    let windows = scope.use_windows_context()?;
    tracing::info!(window = kind.id(), "desktop icon activated");
    Ok(windows.open(kind.id(), kind.default_payload()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StartMenuItem {
    Programs,
    Documents,
    Settings,
    #[serde(rename = "Shut Down")]
    ShutDown,
}

impl StartMenuItem {
    pub const ALL: [StartMenuItem; 4] = [
        StartMenuItem::Programs,
        StartMenuItem::Documents,
        StartMenuItem::Settings,
        StartMenuItem::ShutDown,
    ];
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMenuView {
    pub state: MenuState,
    /// Empty while closed
    pub items: Vec<StartMenuItem>,
}

#[derive(Debug, Default)]
pub struct StartMenu {
    open: bool,
}

impl StartMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self) -> MenuState {
        self.open = !self.open;
        self.state()
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn state(&self) -> MenuState {
        if self.open {
            MenuState::Open
        } else {
            MenuState::Closed
        }
    }

    pub fn render(&self) -> StartMenuView {
        StartMenuView {
            state: self.state(),
            items: if self.open {
                StartMenuItem::ALL.to_vec()
            } else {
                Vec::new()
            },
        }
    }
}
