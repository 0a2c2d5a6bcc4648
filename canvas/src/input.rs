//! Input model: mouse buttons, modifier keys, resize handles, and interaction state.
//!
//! This module defines the types consumed by the interaction controller and the
//! engine. `Button`, `Modifiers` and `Key` describe a raw host event.
//! `InteractionState` is the controller's state machine; its active variants
//! carry the gesture-start snapshot needed to compute deltas on each move.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::doc::ElementId;
use crate::geometry::{Bounds, Point};

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Corner grip used to resize an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Handle {
    /// All handles, in hit-test priority order.
    pub const ALL: [Handle; 4] = [Handle::Nw, Handle::Ne, Handle::Sw, Handle::Se];

    /// Canvas position of this handle on the given bounds.
    #[must_use]
    pub fn position(self, b: Bounds) -> Point {
        match self {
            Self::Nw => Point::new(b.x, b.y),
            Self::Ne => Point::new(b.x + b.width, b.y),
            Self::Sw => Point::new(b.x, b.y + b.height),
            Self::Se => Point::new(b.x + b.width, b.y + b.height),
        }
    }

    /// Whether dragging this handle moves the left edge.
    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::Nw | Self::Sw)
    }

    /// Whether dragging this handle moves the top edge.
    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::Nw | Self::Ne)
    }
}

/// Gesture-start snapshot for a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Pointer position at pointer-down.
    pub start_pointer: Point,
    /// Element position at pointer-down.
    pub start_position: Point,
}

/// Gesture-start snapshot for a resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    /// Which corner is being dragged.
    pub handle: Handle,
    /// Pointer position at pointer-down.
    pub start_pointer: Point,
    /// Element bounds at pointer-down.
    pub start_bounds: Bounds,
}

/// State of one element's interaction controller.
///
/// Dragging and Resizing are entered only from Idle and leave only through
/// `end_gesture`. Editing is entered only from Idle and leaves through commit
/// or cancel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// The element follows the pointer.
    Dragging(DragSession),
    /// One corner of the element follows the pointer.
    Resizing(ResizeSession),
    /// Inline text editing; the draft lives on the controller.
    Editing,
}

impl InteractionState {
    /// Whether a pointer gesture is in flight.
    #[must_use]
    pub fn is_gesture(&self) -> bool {
        matches!(self, Self::Dragging(_) | Self::Resizing(_))
    }
}

/// Persistent UI state visible to the host and renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The id of the currently selected element, if any.
    pub selected_id: Option<ElementId>,
    /// The element currently in inline text editing, if any.
    pub editing_id: Option<ElementId>,
}
