//! Per-element interaction controller.
//!
//! One `ElementController` exists for each element on the canvas. It turns
//! pointer input into geometry updates, runs the inline text-editing sub-mode,
//! and respects the element's lock flag. It never owns the element: every
//! change is emitted through [`ElementStore::update_element`] and the element's
//! current state is read back from the store when a gesture or edit begins.
//!
//! Invalid calls (locked element, wrong kind, wrong state) are silent no-ops.
//! Each operation that can be rejected returns whether it took effect so the
//! host can decide whether to re-render.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use tracing::trace;

use crate::consts::MIN_ELEMENT_SIZE;
use crate::doc::{ElementId, ElementPatch, ElementStore, Selection};
use crate::geometry::{Bounds, Point};
use crate::input::{Button, DragSession, Handle, InteractionState, ResizeSession};

/// Interaction state machine for a single element.
#[derive(Debug, Clone)]
pub struct ElementController {
    id: ElementId,
    state: InteractionState,
    draft: String,
}

impl ElementController {
    #[must_use]
    pub fn new(id: ElementId) -> Self {
        Self { id, state: InteractionState::Idle, draft: String::new() }
    }

    #[must_use]
    pub fn id(&self) -> ElementId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// The text-edit buffer. Holds the last committed or cancelled value when idle.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether pointer-move and pointer-up should be routed to this controller.
    #[must_use]
    pub fn wants_pointer(&self) -> bool {
        self.state.is_gesture()
    }

    // --- Gestures ---

    /// Start dragging the element. Selects it on success.
    pub fn begin_drag<S, L>(&mut self, store: &S, selection: &mut L, pointer: Point, button: Button) -> bool
    where
        S: ElementStore + ?Sized,
        L: Selection + ?Sized,
    {
        if button != Button::Primary {
            trace!(id = %self.id, ?button, "drag rejected: not the primary button");
            return false;
        }
        if self.state != InteractionState::Idle {
            trace!(id = %self.id, state = ?self.state, "drag rejected: controller busy");
            return false;
        }
        let Some(el) = store.element(&self.id) else {
            trace!(id = %self.id, "drag rejected: element missing");
            return false;
        };
        if el.locked {
            trace!(id = %self.id, "drag rejected: element locked");
            return false;
        }

        self.state = InteractionState::Dragging(DragSession { start_pointer: pointer, start_position: el.position() });
        selection.select(&self.id);
        true
    }

    /// Start resizing the element from one of its corner handles.
    pub fn begin_resize<S>(&mut self, store: &S, pointer: Point, handle: Handle) -> bool
    where
        S: ElementStore + ?Sized,
    {
        if self.state != InteractionState::Idle {
            trace!(id = %self.id, state = ?self.state, "resize rejected: controller busy");
            return false;
        }
        let Some(el) = store.element(&self.id) else {
            trace!(id = %self.id, "resize rejected: element missing");
            return false;
        };
        if el.locked {
            trace!(id = %self.id, "resize rejected: element locked");
            return false;
        }

        self.state = InteractionState::Resizing(ResizeSession { handle, start_pointer: pointer, start_bounds: el.bounds() });
        true
    }

    /// Track the pointer during a gesture. Emits one update per call.
    pub fn on_pointer_move<S>(&mut self, store: &mut S, pointer: Point) -> bool
    where
        S: ElementStore + ?Sized,
    {
        let patch = match &self.state {
            InteractionState::Dragging(session) => {
                let pos = drag_position(session, pointer);
                ElementPatch::position(pos.x, pos.y)
            }
            InteractionState::Resizing(session) => ElementPatch::bounds(resize_bounds(session, pointer)),
            InteractionState::Idle | InteractionState::Editing => {
                trace!(id = %self.id, state = ?self.state, "pointer move ignored: no gesture");
                return false;
            }
        };
        store.update_element(&self.id, patch);
        true
    }

    /// Finish the current drag or resize. Returns whether a gesture was active.
    pub fn end_gesture(&mut self) -> bool {
        if !self.state.is_gesture() {
            return false;
        }
        self.state = InteractionState::Idle;
        true
    }

    // --- Text editing ---

    /// Enter inline editing, seeding the draft from the element's content.
    pub fn begin_text_edit<S>(&mut self, store: &S) -> bool
    where
        S: ElementStore + ?Sized,
    {
        if self.state != InteractionState::Idle {
            trace!(id = %self.id, state = ?self.state, "edit rejected: controller busy");
            return false;
        }
        let Some(el) = store.element(&self.id) else {
            return false;
        };
        if el.locked || !el.kind.is_text() {
            trace!(id = %self.id, locked = el.locked, kind = el.kind.name(), "edit rejected");
            return false;
        }

        self.draft = el.kind.content().unwrap_or_default().to_owned();
        self.state = InteractionState::Editing;
        true
    }

    /// Replace the draft while editing.
    pub fn set_draft(&mut self, text: impl Into<String>) -> bool {
        if self.state != InteractionState::Editing {
            return false;
        }
        self.draft = text.into();
        true
    }

    /// Emit the draft as the element's content and leave editing.
    pub fn commit_text_edit<S>(&mut self, store: &mut S) -> bool
    where
        S: ElementStore + ?Sized,
    {
        if self.state != InteractionState::Editing {
            return false;
        }
        store.update_element(&self.id, ElementPatch::content(self.draft.clone()));
        self.state = InteractionState::Idle;
        true
    }

    /// Discard the draft, restoring the element's committed content.
    pub fn cancel_text_edit<S>(&mut self, store: &S) -> bool
    where
        S: ElementStore + ?Sized,
    {
        if self.state != InteractionState::Editing {
            return false;
        }
        self.draft = store
            .element(&self.id)
            .and_then(|el| el.kind.content())
            .unwrap_or_default()
            .to_owned();
        self.state = InteractionState::Idle;
        true
    }

    // --- Commands ---

    /// Flip the lock flag. An in-flight gesture keeps running.
    pub fn toggle_lock<S>(&mut self, store: &mut S) -> bool
    where
        S: ElementStore + ?Sized,
    {
        let Some(locked) = store.element(&self.id).map(|el| el.locked) else {
            return false;
        };
        store.update_element(&self.id, ElementPatch::locked(!locked));
        true
    }

    /// Ask the store to delete this element.
    pub fn remove<S>(&mut self, store: &mut S)
    where
        S: ElementStore + ?Sized,
    {
        self.state = InteractionState::Idle;
        store.remove_element(&self.id);
    }

    /// Ask the store to insert a copy of this element.
    pub fn duplicate<S>(&self, store: &mut S)
    where
        S: ElementStore + ?Sized,
    {
        store.duplicate_element(&self.id);
    }
}

/// Element position for a drag: start position plus pointer delta, never negative.
#[must_use]
pub fn drag_position(session: &DragSession, pointer: Point) -> Point {
    let d = pointer.delta_from(session.start_pointer);
    Point::new((session.start_position.x + d.dx).max(0.0), (session.start_position.y + d.dy).max(0.0))
}

/// Element bounds for a resize from `session.handle`.
///
/// Each dimension is floored at [`MIN_ELEMENT_SIZE`]. A moving left (top) edge
/// follows the pointer only while the unclamped width (height) is above the
/// floor. A negative position is absorbed by the matching dimension and the
/// position clamps to zero.
#[must_use]
pub fn resize_bounds(session: &ResizeSession, pointer: Point) -> Bounds {
    let d = pointer.delta_from(session.start_pointer);
    let start = session.start_bounds;
    let handle = session.handle;

    let raw_w = if handle.moves_left() { start.width - d.dx } else { start.width + d.dx };
    let raw_h = if handle.moves_top() { start.height - d.dy } else { start.height + d.dy };

    let mut x = start.x;
    let mut y = start.y;
    if handle.moves_left() && raw_w > MIN_ELEMENT_SIZE {
        x += d.dx;
    }
    if handle.moves_top() && raw_h > MIN_ELEMENT_SIZE {
        y += d.dy;
    }

    let mut width = raw_w.max(MIN_ELEMENT_SIZE);
    let mut height = raw_h.max(MIN_ELEMENT_SIZE);
    if x < 0.0 {
        width += x;
        x = 0.0;
    }
    if y < 0.0 {
        height += y;
        y = 0.0;
    }

    // Only reachable when the gesture started below the floor.
    Bounds { x, y, width: width.max(MIN_ELEMENT_SIZE), height: height.max(MIN_ELEMENT_SIZE) }
}
