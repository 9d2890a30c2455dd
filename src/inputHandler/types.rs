// Core data structures for pointer-driven window dragging

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use uuid::Uuid;

/// A point in desktop (client) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
}

/// Reference to an element in the webview (its DOM id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementRef(pub String);

/// The single cancellation handle covering the move/up/cancel listeners of
/// one drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerHandle(pub Uuid);

impl ListenerHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Handle of an intersection observer attached to a constraint element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObserverHandle(pub Uuid);

impl ObserverHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Observer threshold: only a fully intersecting target counts as visible
pub const FULL_INTERSECTION: f64 = 1.0;

/// Host-side resource changes the webview has to apply for a drag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DragEffect {
    /// Attach document-level pointermove/pointerup/pointercancel listeners
    Listen { handle: ListenerHandle },
    /// Abort every listener registered under `handle`
    Release { handle: ListenerHandle },
    /// Start observing intersection of `target`
    Observe {
        handle: ObserverHandle,
        target: ElementRef,
        threshold: f64,
    },
    Disconnect { handle: ObserverHandle },
}

/// Drag-in-progress state that must survive a remount of the window view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSnapshot {
    pub is_down: bool,
    pub drag_origin: Point,
}

/// Publicly visible state of one draggable window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraggableState {
    pub phase: DragPhase,
    pub position: Point,
    /// Pointer-to-window offset; only meaningful while dragging
    pub drag_origin: Point,
    pub constraint_target: Option<ElementRef>,
}
