//! Canvas engine: routes host input to per-element controllers.
//!
//! DESIGN
//! ======
//! The engine owns the document, the selection, one `ElementController` per
//! element (created lazily), and the capture slot naming the element whose
//! gesture is in flight. Pointer-move and pointer-up are delivered only to the
//! captured controller; with nothing captured they are dropped, which is the
//! engine's equivalent of registering global listeners only during a gesture.
//!
//! Every store mutation is applied locally and reported to the host as an
//! [`Action`], so the host can persist it and schedule a redraw.

use std::collections::HashMap;

use tracing::debug;

use crate::controller::ElementController;
use crate::doc::{DocStore, Element, ElementId, ElementPatch, ElementStore, Selection};
use crate::geometry::Point;
use crate::hit::{self, HitPart};
use crate::input::{Button, InteractionState, Key, Modifiers, UiState};
use crate::render::{self, SceneOptions};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ElementCreated(Element),
    ElementUpdated { id: ElementId, fields: ElementPatch },
    ElementDeleted { id: ElementId },
    SelectionChanged(Option<ElementId>),
    /// The host should show its text editor seeded with `text` and focus it.
    EditTextRequested { id: ElementId, text: String },
    RenderNeeded,
}

/// Store adapter that applies mutations to the document and records them.
struct Recorder<'a> {
    doc: &'a mut DocStore,
    actions: &'a mut Vec<Action>,
}

impl ElementStore for Recorder<'_> {
    fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    fn update_element(&mut self, id: &ElementId, patch: ElementPatch) {
        if self.doc.apply_patch(id, &patch) {
            self.actions.push(Action::ElementUpdated { id: *id, fields: patch });
        }
    }

    fn remove_element(&mut self, id: &ElementId) {
        if self.doc.remove(id).is_some() {
            self.actions.push(Action::ElementDeleted { id: *id });
        }
    }

    fn duplicate_element(&mut self, id: &ElementId) {
        if self.doc.get(id).is_some() && self.doc.z_order_saturated() {
            self.renumber();
        }
        if let Some(copy) = self.doc.duplicate(id) {
            self.actions.push(Action::ElementCreated(copy));
        }
    }
}

impl Recorder<'_> {
    /// Renumber the stack and report every z-index that moved.
    fn renumber(&mut self) {
        let changed = self.doc.normalize_z_order();
        debug!(changed = changed.len(), "z-order renumbered");
        for (id, z) in changed {
            self.actions.push(Action::ElementUpdated { id, fields: ElementPatch::z_index(z) });
        }
    }
}

/// Selection adapter that records changes.
struct SelectionRecorder<'a> {
    ui: &'a mut UiState,
    actions: &'a mut Vec<Action>,
}

impl Selection for SelectionRecorder<'_> {
    fn select(&mut self, id: &ElementId) {
        if self.ui.selected_id != Some(*id) {
            self.ui.selected_id = Some(*id);
            self.actions.push(Action::SelectionChanged(Some(*id)));
        }
    }
}

/// The canvas engine. Holds all state that isn't owned by the host UI.
#[derive(Default)]
pub struct Engine {
    pub doc: DocStore,
    pub ui: UiState,
    controllers: HashMap<ElementId, ElementController>,
    captured: Option<ElementId>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Hydrate the document from a snapshot. Resets all interaction state.
    pub fn load_snapshot(&mut self, elements: Vec<Element>) {
        self.doc.load_snapshot(elements);
        self.controllers.clear();
        self.captured = None;
        self.ui = UiState::default();
    }

    /// Apply an external create.
    pub fn apply_create(&mut self, element: Element) {
        self.doc.insert(element);
    }

    /// Apply an external update.
    pub fn apply_update(&mut self, id: &ElementId, fields: &ElementPatch) {
        self.doc.apply_patch(id, fields);
    }

    /// Apply an external delete, dropping any interaction state for the element.
    pub fn apply_delete(&mut self, id: &ElementId) {
        self.doc.remove(id);
        self.forget(id);
    }

    fn forget(&mut self, id: &ElementId) {
        self.controllers.remove(id);
        if self.captured.as_ref() == Some(id) {
            self.captured = None;
        }
        if self.ui.selected_id.as_ref() == Some(id) {
            self.ui.selected_id = None;
        }
        if self.ui.editing_id.as_ref() == Some(id) {
            self.ui.editing_id = None;
        }
    }

    // --- Pointer input ---

    /// Pointer pressed: start a resize on a selected handle, a drag on a body,
    /// or clear the selection on empty canvas. Commits any open text edit first.
    pub fn on_pointer_down(&mut self, pt: Point, button: Button) -> Vec<Action> {
        let mut actions = self.commit_text();
        if self.captured.is_some() {
            self.release_capture();
        }

        let Some(hit) = hit::hit_test(pt, &self.doc, self.ui.selected_id) else {
            if button == Button::Primary && self.ui.selected_id.take().is_some() {
                actions.push(Action::SelectionChanged(None));
                actions.push(Action::RenderNeeded);
            }
            return actions;
        };

        let id = hit.element_id;
        let Self { doc, ui, controllers, captured } = self;
        let ctl = controllers.entry(id).or_insert_with(|| ElementController::new(id));
        let mut selection = SelectionRecorder { ui, actions: &mut actions };

        let started = match hit.part {
            HitPart::ResizeHandle(handle) => ctl.begin_resize(&*doc, pt, handle),
            HitPart::Body => {
                let started = ctl.begin_drag(&*doc, &mut selection, pt, button);
                if !started && button == Button::Primary {
                    // Locked elements are still selectable.
                    selection.select(&id);
                }
                started
            }
        };
        if started {
            *captured = Some(id);
        }

        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Pointer moved. Only the captured controller sees it.
    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(id) = self.captured else {
            return actions;
        };
        let Self { doc, controllers, .. } = self;
        let Some(ctl) = controllers.get_mut(&id) else {
            return actions;
        };
        if ctl.on_pointer_move(&mut Recorder { doc, actions: &mut actions }, pt) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Pointer released: end the captured gesture and release capture.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        if self.release_capture() { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    fn release_capture(&mut self) -> bool {
        let Some(id) = self.captured.take() else {
            return false;
        };
        self.controllers
            .get_mut(&id)
            .is_some_and(ElementController::end_gesture)
    }

    /// Double click: open the inline editor on a text element.
    pub fn on_double_click(&mut self, pt: Point) -> Vec<Action> {
        let mut actions = self.commit_text();
        let Some(hit) = hit::hit_test(pt, &self.doc, self.ui.selected_id) else {
            return actions;
        };
        if hit.part != HitPart::Body {
            return actions;
        }

        let id = hit.element_id;
        let Self { doc, ui, controllers, .. } = self;
        let ctl = controllers.entry(id).or_insert_with(|| ElementController::new(id));
        if ctl.begin_text_edit(&*doc) {
            ui.editing_id = Some(id);
            actions.push(Action::EditTextRequested { id, text: ctl.draft().to_owned() });
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Text editing ---

    /// Replace the open editor's draft.
    pub fn set_draft(&mut self, text: impl Into<String>) -> bool {
        let Some(id) = self.ui.editing_id else {
            return false;
        };
        self.controllers
            .get_mut(&id)
            .is_some_and(|ctl| ctl.set_draft(text))
    }

    /// The open editor's draft, if any.
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        let id = self.ui.editing_id?;
        self.controllers.get(&id).map(ElementController::draft)
    }

    /// Commit the open edit, if any.
    pub fn commit_text(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(id) = self.ui.editing_id.take() else {
            return actions;
        };
        let Self { doc, controllers, .. } = self;
        if let Some(ctl) = controllers.get_mut(&id) {
            if ctl.commit_text_edit(&mut Recorder { doc, actions: &mut actions }) {
                actions.push(Action::RenderNeeded);
            }
        }
        actions
    }

    /// Cancel the open edit, if any.
    pub fn cancel_text(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.editing_id.take() else {
            return Vec::new();
        };
        let doc = &self.doc;
        let cancelled = self
            .controllers
            .get_mut(&id)
            .is_some_and(|ctl| ctl.cancel_text_edit(doc));
        if cancelled { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Keyboard ---

    /// Key pressed. While editing only Escape and Enter are handled.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let name = key.0.as_str();

        if self.ui.editing_id.is_some() {
            return match name {
                "Escape" => self.cancel_text(),
                "Enter" if !modifiers.shift => self.commit_text(),
                _ => Vec::new(),
            };
        }

        match name {
            "Escape" => self.clear_selection(),
            "Delete" | "Backspace" => self.delete_selected(),
            "]" => self.bring_to_front(),
            "[" => self.send_to_back(),
            _ if modifiers.command() && name.eq_ignore_ascii_case("d") => self.duplicate_selected(),
            _ if modifiers.command() && name.eq_ignore_ascii_case("l") => self.toggle_lock_selected(),
            _ => Vec::new(),
        }
    }

    // --- Selection commands ---

    /// Deselect everything.
    pub fn clear_selection(&mut self) -> Vec<Action> {
        if self.ui.selected_id.take().is_some() {
            vec![Action::SelectionChanged(None), Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Flip the lock flag on the selected element.
    pub fn toggle_lock_selected(&mut self) -> Vec<Action> {
        self.with_selected(|ctl, store| {
            ctl.toggle_lock(store);
        })
    }

    /// Insert a copy of the selected element.
    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        self.with_selected(|ctl, store| ctl.duplicate(store))
    }

    /// Delete the selected element.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected_id else {
            return Vec::new();
        };
        let mut actions = self.with_selected(|ctl, store| ctl.remove(store));
        self.forget(&id);
        actions.insert(0, Action::SelectionChanged(None));
        actions
    }

    /// Stack the selected element above all others.
    pub fn bring_to_front(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected_id else {
            return Vec::new();
        };
        let sorted = self.doc.sorted_elements();
        if sorted.last().map(|el| el.id) == Some(id) {
            return Vec::new();
        }
        self.restack(&id, |doc| doc.max_z_index().map_or(0, |z| z.saturating_add(1)))
    }

    /// Stack the selected element beneath all others.
    pub fn send_to_back(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected_id else {
            return Vec::new();
        };
        let sorted = self.doc.sorted_elements();
        if sorted.first().map(|el| el.id) == Some(id) {
            return Vec::new();
        }
        self.restack(&id, |doc| doc.min_z_index().map_or(0, |z| z.saturating_sub(1)))
    }

    /// Show or hide an element.
    pub fn toggle_visibility(&mut self, id: &ElementId) -> Vec<Action> {
        let Some(visible) = self.doc.get(id).map(|el| el.visible) else {
            return Vec::new();
        };
        self.update(id, ElementPatch::visible(!visible))
    }

    /// Move `id` to the z-index chosen by `pick`, renumbering a saturated
    /// stack first.
    fn restack<F>(&mut self, id: &ElementId, pick: F) -> Vec<Action>
    where
        F: FnOnce(&DocStore) -> i64,
    {
        let mut actions = Vec::new();
        let mut recorder = Recorder { doc: &mut self.doc, actions: &mut actions };
        if recorder.doc.z_order_saturated() {
            recorder.renumber();
        }
        let z = pick(&*recorder.doc);
        recorder.update_element(id, ElementPatch::z_index(z));
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    fn update(&mut self, id: &ElementId, patch: ElementPatch) -> Vec<Action> {
        let mut actions = Vec::new();
        Recorder { doc: &mut self.doc, actions: &mut actions }.update_element(id, patch);
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    fn with_selected<F>(&mut self, f: F) -> Vec<Action>
    where
        F: FnOnce(&mut ElementController, &mut Recorder<'_>),
    {
        let mut actions = Vec::new();
        let Some(id) = self.ui.selected_id else {
            return actions;
        };
        if self.doc.get(&id).is_none() {
            debug!(%id, "selection points at a missing element");
            return actions;
        }
        let Self { doc, controllers, .. } = self;
        let ctl = controllers.entry(id).or_insert_with(|| ElementController::new(id));
        f(ctl, &mut Recorder { doc, actions: &mut actions });
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Queries ---

    /// The currently selected element, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.ui.selected_id
    }

    /// The element whose gesture currently receives pointer events.
    #[must_use]
    pub fn captured(&self) -> Option<ElementId> {
        self.captured
    }

    /// Look up an element by id.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    /// Interaction state of an element. Elements never touched are idle.
    #[must_use]
    pub fn interaction(&self, id: &ElementId) -> InteractionState {
        self.controllers
            .get(id)
            .map_or(InteractionState::Idle, |ctl| *ctl.state())
    }

    /// Render the current document as an SVG document.
    #[must_use]
    pub fn render_svg(&self, options: &SceneOptions) -> String {
        render::scene_svg(&self.doc, options)
    }
}
