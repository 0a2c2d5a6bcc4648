#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{DocStore, ElementId};
use crate::geometry::Point;
use crate::input::Handle;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(Handle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Test which element (if any) is under `pt`, checking the selected element's handles first.
///
/// Handles are only offered for a visible, unlocked selection. Bodies are tested
/// top-most first; hidden elements are never hit.
#[must_use]
pub fn hit_test(pt: Point, doc: &DocStore, selected_id: Option<ElementId>) -> Option<Hit> {
    if let Some(el) = selected_id.and_then(|id| doc.get(&id)) {
        if el.visible && !el.locked {
            let bounds = el.bounds();
            for handle in Handle::ALL {
                if handle.position(bounds).distance_to(pt) <= HANDLE_RADIUS_PX {
                    return Some(Hit { element_id: el.id, part: HitPart::ResizeHandle(handle) });
                }
            }
        }
    }

    doc.sorted_elements()
        .into_iter()
        .rev()
        .find(|el| el.visible && el.bounds().contains(pt))
        .map(|el| Hit { element_id: el.id, part: HitPart::Body })
}
