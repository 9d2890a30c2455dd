// Drag gesture state machine for one window

use super::types::*;

#[derive(Debug)]
struct Observation {
    handle: ObserverHandle,
    visible: Option<bool>,
}

/// Tracks the position of one draggable window.
///
/// The tracker owns no host resources itself. Every transition returns the
/// `DragEffect`s the webview must apply, and the tracker remembers which
/// handles are live so that nothing outlives the gesture that created it.
#[derive(Debug)]
pub struct Draggable {
    state: DraggableState,
    listeners: Option<ListenerHandle>,
    observer: Option<Observation>,
}

impl Draggable {
    pub fn new(initial_position: Point) -> Self {
        Self {
            state: DraggableState {
                phase: DragPhase::Idle,
                position: initial_position,
                drag_origin: Point::default(),
                constraint_target: None,
            },
            listeners: None,
            observer: None,
        }
    }

    /// Build a tracker for a freshly mounted view, picking an interrupted
    /// gesture back up when one was cached
    pub fn resume(initial_position: Point, cached: Option<DragSnapshot>) -> (Self, Vec<DragEffect>) {
        let mut draggable = Self::new(initial_position);
        let Some(snapshot) = cached else {
            return (draggable, Vec::new());
        };

        draggable.state.drag_origin = snapshot.drag_origin;
        if !snapshot.is_down {
            return (draggable, Vec::new());
        }

        tracing::debug!(origin = ?snapshot.drag_origin, "resuming drag after remount");
        draggable.state.phase = DragPhase::Dragging;
        let handle = ListenerHandle::new();
        draggable.listeners = Some(handle);
        (draggable, vec![DragEffect::Listen { handle }])
    }

    pub fn state(&self) -> &DraggableState {
        &self.state
    }

    pub fn position(&self) -> Point {
        self.state.position
    }

    pub fn is_dragging(&self) -> bool {
        self.state.phase == DragPhase::Dragging
    }

    pub fn listener_handle(&self) -> Option<ListenerHandle> {
        self.listeners
    }

    pub fn observer_handle(&self) -> Option<ObserverHandle> {
        self.observer.as_ref().map(|o| o.handle)
    }

    /// Last visibility reported for the constraint element, if observed
    pub fn constraint_visible(&self) -> Option<bool> {
        self.observer.as_ref().and_then(|o| o.visible)
    }

    pub fn snapshot(&self) -> DragSnapshot {
        DragSnapshot {
            is_down: self.is_dragging(),
            drag_origin: self.state.drag_origin,
        }
    }

    /// Pointer went down on the drag handle
    pub fn begin(&mut self, pointer: Point, constraint: Option<ElementRef>) -> Vec<DragEffect> {
        // A gesture that never saw its pointerup must not leak its listeners
        let mut effects = self.release();

        self.state.phase = DragPhase::Dragging;
        self.state.drag_origin = pointer - self.state.position;
        self.state.constraint_target = constraint.clone();

        let handle = ListenerHandle::new();
        self.listeners = Some(handle);
        effects.push(DragEffect::Listen { handle });

        if let Some(target) = constraint {
            let handle = ObserverHandle::new();
            self.observer = Some(Observation {
                handle,
                visible: None,
            });
            effects.push(DragEffect::Observe {
                handle,
                target,
                threshold: FULL_INTERSECTION,
            });
        }

        tracing::trace!(origin = ?self.state.drag_origin, "drag start");
        effects
    }

    /// Pointer moved anywhere in the document. Returns whether the position
    /// changed.
    pub fn pointer_move(&mut self, handle: ListenerHandle, pointer: Point) -> bool {
        if !self.is_dragging() || self.listeners != Some(handle) {
            return false;
        }

        let next = self.constrain(pointer - self.state.drag_origin);
        if next == self.state.position {
            return false;
        }
        self.state.position = next;
        true
    }

    pub fn pointer_up(&mut self, handle: ListenerHandle) -> Vec<DragEffect> {
        self.finish(handle)
    }

    pub fn pointer_cancel(&mut self, handle: ListenerHandle) -> Vec<DragEffect> {
        self.finish(handle)
    }

    /// Intersection callback for the constraint element
    pub fn set_constraint_visible(&mut self, handle: ObserverHandle, visible: bool) -> bool {
        match self.observer.as_mut() {
            Some(observation) if observation.handle == handle => {
                observation.visible = Some(visible);
                true
            }
            _ => false,
        }
    }

    /// Component teardown
    pub fn dispose(&mut self) -> Vec<DragEffect> {
        self.release()
    }

    // Constrained movement is not enforced: visibility of the constraint
    // target is recorded, the proposed position always wins.
    fn constrain(&self, proposed: Point) -> Point {
        proposed
    }

    fn finish(&mut self, handle: ListenerHandle) -> Vec<DragEffect> {
        if self.listeners != Some(handle) {
            return Vec::new();
        }

        // Position and drag origin are kept as they are
        self.state.phase = DragPhase::Idle;
        tracing::trace!(position = ?self.state.position, "drag end");
        self.release()
    }

    fn release(&mut self) -> Vec<DragEffect> {
        let mut effects = Vec::new();
        if let Some(handle) = self.listeners.take() {
            effects.push(DragEffect::Release { handle });
        }
        if let Some(observation) = self.observer.take() {
            effects.push(DragEffect::Disconnect {
                handle: observation.handle,
            });
        }
        effects
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
    fn test_drag_gesture() {
        let mut drag = Draggable::new(Point::new(10.0, 10.0));

        let effects = drag.begin(Point::new(100.0, 100.0), None);
        let handle = listen_handle(&effects);
        assert_eq!(effects.len(), 1);
        assert!(drag.is_dragging());
        assert_eq!(drag.state().drag_origin, Point::new(90.0, 90.0));

        assert!(drag.pointer_move(handle, Point::new(150.0, 120.0)));
        assert_eq!(drag.position(), Point::new(60.0, 30.0));

        let effects = drag.pointer_up(handle);
        assert_eq!(effects, vec![DragEffect::Release { handle }]);
        assert_eq!(drag.state().phase, DragPhase::Idle);
        assert_eq!(drag.position(), Point::new(60.0, 30.0));
        // Origin is retained after the gesture
        assert_eq!(drag.state().drag_origin, Point::new(90.0, 90.0));

        // Late events after release are ignored
        assert!(!drag.pointer_move(handle, Point::new(500.0, 500.0)));
        assert_eq!(drag.position(), Point::new(60.0, 30.0));
    }

    #[test]
    fn test_origin_is_stable_during_gesture() {
        let mut drag = Draggable::new(Point::new(0.0, 0.0));
        let handle = listen_handle(&drag.begin(Point::new(5.0, 5.0), None));

        for step in 1..10 {
            let p = Point::new(5.0 + step as f64 * 3.0, 5.0 - step as f64);
            drag.pointer_move(handle, p);
            assert_eq!(drag.state().drag_origin, Point::new(5.0, 5.0));
        }
        assert_eq!(drag.position(), Point::new(27.0, -9.0));
    }

    #[test]
    fn test_cancel_ends_gesture() {
        let mut drag = Draggable::new(Point::new(0.0, 0.0));
        let handle = listen_handle(&drag.begin(Point::new(1.0, 1.0), None));
        drag.pointer_move(handle, Point::new(11.0, 21.0));

        let effects = drag.pointer_cancel(handle);
        assert_eq!(effects, vec![DragEffect::Release { handle }]);
        assert!(!drag.is_dragging());
        assert_eq!(drag.position(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_repeated_gestures_do_not_leak_listeners() {
        let mut drag = Draggable::new(Point::new(0.0, 0.0));
        let first = listen_handle(&drag.begin(Point::new(1.0, 1.0), None));

        // Second pointerdown without a pointerup in between
        let effects = drag.begin(Point::new(2.0, 2.0), None);
        assert_eq!(effects[0], DragEffect::Release { handle: first });
        let second = listen_handle(&effects);
        assert_ne!(first, second);
        assert_eq!(drag.listener_handle(), Some(second));

        // Stale handle can neither move nor end the new gesture
        assert!(!drag.pointer_move(first, Point::new(50.0, 50.0)));
        assert!(drag.pointer_up(first).is_empty());
        assert!(drag.is_dragging());

        assert_eq!(drag.pointer_up(second), vec![DragEffect::Release { handle: second }]);
        assert!(drag.listener_handle().is_none());
    }

    #[test]
    fn test_constraint_observer_lifecycle() {
        let mut drag = Draggable::new(Point::new(10.0, 10.0));
        let target = ElementRef("desktop".to_string());

        let effects = drag.begin(Point::new(20.0, 20.0), Some(target.clone()));
        let handle = listen_handle(&effects);
        let observer = drag.observer_handle().unwrap();
        assert!(effects.contains(&DragEffect::Observe {
            handle: observer,
            target,
            threshold: FULL_INTERSECTION,
        }));

        assert!(drag.set_constraint_visible(observer, false));
        assert_eq!(drag.constraint_visible(), Some(false));

        // Movement is computed the same whether or not the target is visible
        drag.pointer_move(handle, Point::new(120.0, 20.0));
        assert_eq!(drag.position(), Point::new(110.0, 10.0));

        let effects = drag.pointer_up(handle);
        assert_eq!(
            effects,
            vec![
                DragEffect::Release { handle },
                DragEffect::Disconnect { handle: observer },
            ]
        );
        assert!(drag.observer_handle().is_none());
        assert!(!drag.set_constraint_visible(observer, true));
    }

    #[test]
    fn test_dispose_mid_drag_releases_everything() {
        let mut drag = Draggable::new(Point::new(0.0, 0.0));
        drag.begin(Point::new(3.0, 3.0), Some(ElementRef("desktop".to_string())));

        let effects = drag.dispose();
        assert_eq!(effects.len(), 2);
        assert!(drag.listener_handle().is_none());
        assert!(drag.observer_handle().is_none());
        assert!(drag.dispose().is_empty());
    }

    #[test]
    fn test_resume_from_snapshot() {
        let snapshot = DragSnapshot {
            is_down: true,
            drag_origin: Point::new(40.0, 5.0),
        };
        let (mut drag, effects) = Draggable::resume(Point::new(50.0, 50.0), Some(snapshot));
        let handle = listen_handle(&effects);
        assert!(drag.is_dragging());

        drag.pointer_move(handle, Point::new(100.0, 100.0));
        assert_eq!(drag.position(), Point::new(60.0, 95.0));

        let (idle, effects) = Draggable::resume(Point::new(50.0, 50.0), None);
        assert!(effects.is_empty());
        assert!(!idle.is_dragging());
    }
}
