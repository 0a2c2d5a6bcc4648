#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{DocStore, Element, ElementKind};

// =============================================================
// Helpers
// =============================================================

/// Store wrapper that records every emitted patch.
#[derive(Default)]
struct Recorder {
    doc: DocStore,
    updates: Vec<ElementPatch>,
    removed: Vec<ElementId>,
    duplicated: Vec<ElementId>,
}

impl ElementStore for Recorder {
    fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    fn update_element(&mut self, id: &ElementId, patch: ElementPatch) {
        self.doc.apply_patch(id, &patch);
        self.updates.push(patch);
    }

    fn remove_element(&mut self, id: &ElementId) {
        self.doc.remove(id);
        self.removed.push(*id);
    }

    fn duplicate_element(&mut self, id: &ElementId) {
        self.duplicated.push(*id);
    }
}

#[derive(Default)]
struct Selected(Vec<ElementId>);

impl Selection for Selected {
    fn select(&mut self, id: &ElementId) {
        self.0.push(*id);
    }
}

fn setup(kind: ElementKind) -> (Recorder, ElementController) {
    let el = Element::new(kind, 100.0, 100.0, 50.0, 50.0);
    let ctl = ElementController::new(el.id);
    let mut store = Recorder::default();
    store.doc.insert(el);
    (store, ctl)
}

fn setup_rect() -> (Recorder, ElementController) {
    setup(ElementKind::Rectangle)
}

fn setup_text(content: &str) -> (Recorder, ElementController) {
    setup(ElementKind::Text { content: content.into() })
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn bounds_of(store: &Recorder, ctl: &ElementController) -> Bounds {
    store.doc.get(&ctl.id()).unwrap().bounds()
}

fn lock(store: &mut Recorder, ctl: &ElementController) {
    store.doc.apply_patch(&ctl.id(), &ElementPatch::locked(true));
}

fn resize_from(handle: Handle, x: f64, y: f64, w: f64, h: f64, dx: f64, dy: f64) -> Bounds {
    let session = ResizeSession {
        handle,
        start_pointer: pt(0.0, 0.0),
        start_bounds: Bounds { x, y, width: w, height: h },
    };
    resize_bounds(&session, pt(dx, dy))
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_controller_is_idle() {
    let (_, ctl) = setup_rect();
    assert_eq!(*ctl.state(), InteractionState::Idle);
    assert!(!ctl.wants_pointer());
    assert_eq!(ctl.draft(), "");
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_moves_by_pointer_delta() {
    let (mut store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    assert!(ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary));
    assert!(ctl.on_pointer_move(&mut store, pt(10.0, -20.0)));

    let b = bounds_of(&store, &ctl);
    assert_eq!((b.x, b.y), (110.0, 80.0));
    assert_eq!((b.width, b.height), (50.0, 50.0));
}

#[test]
fn drag_clamps_to_left_edge() {
    let (mut store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary);
    ctl.on_pointer_move(&mut store, pt(-150.0, 0.0));

    let b = bounds_of(&store, &ctl);
    assert_eq!((b.x, b.y), (0.0, 100.0));
}

#[test]
fn drag_clamps_to_top_edge() {
    let (mut store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    ctl.begin_drag(&store, &mut sel, pt(500.0, 500.0), Button::Primary);
    ctl.on_pointer_move(&mut store, pt(520.0, 0.0));
    let b = bounds_of(&store, &ctl);
    assert_eq!((b.x, b.y), (120.0, 0.0));
}

#[test]
fn drag_is_relative_to_gesture_start_not_last_move() {
    let (mut store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary);
    ctl.on_pointer_move(&mut store, pt(-500.0, -500.0));
    ctl.on_pointer_move(&mut store, pt(5.0, 5.0));
    let b = bounds_of(&store, &ctl);
    assert_eq!((b.x, b.y), (105.0, 105.0));
}

#[test]
fn drag_emits_update_on_every_move() {
    let (mut store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary);
    for i in 0..5 {
        ctl.on_pointer_move(&mut store, pt(0.0, f64::from(i)));
    }
    assert_eq!(store.updates.len(), 5);
    assert!(store.updates.iter().all(|p| p.width.is_none() && p.x.is_some()));
}

#[test]
fn drag_selects_element() {
    let (store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary);
    assert_eq!(sel.0, vec![ctl.id()]);
    assert!(ctl.wants_pointer());
}

#[test]
fn drag_requires_primary_button() {
    let (store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    assert!(!ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Secondary));
    assert!(!ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Middle));
    assert_eq!(*ctl.state(), InteractionState::Idle);
    assert!(sel.0.is_empty());
}

#[test]
fn drag_rejected_while_resizing() {
    let (store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    ctl.begin_resize(&store, pt(0.0, 0.0), Handle::Se);
    assert!(!ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary));
    assert!(matches!(ctl.state(), InteractionState::Resizing(_)));
}

#[test]
fn drag_rejected_for_missing_element() {
    let store = Recorder::default();
    let mut ctl = ElementController::new(uuid::Uuid::new_v4());
    let mut sel = Selected::default();
    assert!(!ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary));
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_se_grows_by_delta() {
    let b = resize_from(Handle::Se, 100.0, 100.0, 50.0, 50.0, 30.0, 5.0);
    assert_eq!((b.width, b.height), (80.0, 55.0));
    assert_eq!((b.x, b.y), (100.0, 100.0));
}

#[test]
fn resize_nw_moves_origin_and_grows() {
    let b = resize_from(Handle::Nw, 100.0, 100.0, 50.0, 50.0, -10.0, -10.0);
    assert_eq!((b.width, b.height), (60.0, 60.0));
    assert_eq!((b.x, b.y), (90.0, 90.0));
}

#[test]
fn resize_sw_shifts_x_and_grows_height() {
    let b = resize_from(Handle::Sw, 100.0, 100.0, 50.0, 50.0, -10.0, 10.0);
    assert_eq!((b.x, b.y), (90.0, 100.0));
    assert_eq!((b.width, b.height), (60.0, 60.0));
}

#[test]
fn resize_ne_shifts_y_and_grows_width() {
    let b = resize_from(Handle::Ne, 100.0, 100.0, 50.0, 50.0, 10.0, -10.0);
    assert_eq!((b.x, b.y), (100.0, 90.0));
    assert_eq!((b.width, b.height), (60.0, 60.0));
}

#[test]
fn resize_se_floors_at_minimum() {
    let b = resize_from(Handle::Se, 100.0, 100.0, 50.0, 50.0, -200.0, -200.0);
    assert_eq!((b.width, b.height), (MIN_ELEMENT_SIZE, MIN_ELEMENT_SIZE));
}

#[test]
fn resize_sw_past_floor_keeps_start_x() {
    let b = resize_from(Handle::Sw, 100.0, 100.0, 50.0, 50.0, 40.0, 0.0);
    assert_eq!(b.width, MIN_ELEMENT_SIZE);
    assert_eq!(b.x, 100.0);
}

#[test]
fn resize_ne_past_floor_keeps_start_y() {
    let b = resize_from(Handle::Ne, 100.0, 100.0, 50.0, 50.0, 0.0, 45.0);
    assert_eq!(b.height, MIN_ELEMENT_SIZE);
    assert_eq!(b.y, 100.0);
}

#[test]
fn resize_nw_past_left_edge_absorbs_into_width() {
    // x would be 10 - 30 = -20; width 80 loses the 20 overflow.
    let b = resize_from(Handle::Nw, 10.0, 10.0, 50.0, 50.0, -30.0, -30.0);
    assert_eq!((b.x, b.y), (0.0, 0.0));
    assert_eq!((b.width, b.height), (60.0, 60.0));
}

#[test]
fn resize_through_controller_emits_bounds() {
    let (mut store, mut ctl) = setup_rect();
    assert!(ctl.begin_resize(&store, pt(150.0, 150.0), Handle::Se));
    assert!(ctl.on_pointer_move(&mut store, pt(180.0, 155.0)));

    let last = store.updates.last().unwrap();
    assert_eq!(last.width, Some(80.0));
    assert_eq!(last.height, Some(55.0));
    assert_eq!(last.x, Some(100.0));
    assert_eq!(last.y, Some(100.0));
}

#[test]
fn resize_does_not_select() {
    let (store, mut ctl) = setup_rect();
    ctl.begin_resize(&store, pt(0.0, 0.0), Handle::Nw);
    assert!(ctl.wants_pointer());
}

#[test]
fn invariants_hold_across_pointer_sweep() {
    for handle in Handle::ALL {
        let (mut store, mut ctl) = setup_rect();
        ctl.begin_resize(&store, pt(0.0, 0.0), handle);
        let mut step = -400.0;
        while step <= 400.0 {
            ctl.on_pointer_move(&mut store, pt(step, -step * 0.7));
            let b = bounds_of(&store, &ctl);
            assert!(b.x >= 0.0 && b.y >= 0.0, "{handle:?} at {step}: {b:?}");
            assert!(b.width >= MIN_ELEMENT_SIZE && b.height >= MIN_ELEMENT_SIZE, "{handle:?} at {step}: {b:?}");
            step += 13.0;
        }
        ctl.end_gesture();
    }

    let (mut store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary);
    let mut step = -400.0;
    while step <= 400.0 {
        ctl.on_pointer_move(&mut store, pt(step, step * 0.3 - 200.0));
        let b = bounds_of(&store, &ctl);
        assert!(b.x >= 0.0 && b.y >= 0.0);
        step += 17.0;
    }
}

// =============================================================
// Pointer move / end gesture
// =============================================================

#[test]
fn pointer_move_when_idle_is_noop() {
    let (mut store, mut ctl) = setup_rect();
    assert!(!ctl.on_pointer_move(&mut store, pt(10.0, 10.0)));
    assert!(store.updates.is_empty());
}

#[test]
fn end_gesture_returns_to_idle() {
    let (mut store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary);
    assert!(ctl.end_gesture());
    assert_eq!(*ctl.state(), InteractionState::Idle);
    assert!(!ctl.wants_pointer());
    assert!(!ctl.on_pointer_move(&mut store, pt(30.0, 30.0)));
}

#[test]
fn end_gesture_when_idle_reports_nothing_ended() {
    let (_, mut ctl) = setup_rect();
    assert!(!ctl.end_gesture());
}

#[test]
fn end_gesture_leaves_edit_alone() {
    let (store, mut ctl) = setup_text("hi");
    ctl.begin_text_edit(&store);
    assert!(!ctl.end_gesture());
    assert_eq!(*ctl.state(), InteractionState::Editing);
}

#[test]
fn controller_is_reusable_after_gesture() {
    let (mut store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary);
    ctl.on_pointer_move(&mut store, pt(10.0, 0.0));
    ctl.end_gesture();
    assert!(ctl.begin_resize(&store, pt(0.0, 0.0), Handle::Se));
    ctl.on_pointer_move(&mut store, pt(10.0, 10.0));
    let b = bounds_of(&store, &ctl);
    assert_eq!((b.x, b.width, b.height), (110.0, 60.0, 60.0));
}

// =============================================================
// Lock
// =============================================================

#[test]
fn locked_element_rejects_all_begins() {
    let (mut store, mut ctl) = setup_text("hello");
    lock(&mut store, &ctl);
    let mut sel = Selected::default();

    assert!(!ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary));
    assert!(!ctl.begin_resize(&store, pt(0.0, 0.0), Handle::Se));
    assert!(!ctl.begin_text_edit(&store));

    assert_eq!(*ctl.state(), InteractionState::Idle);
    assert!(store.updates.is_empty());
    assert!(sel.0.is_empty());
}

#[test]
fn toggle_lock_flips_flag() {
    let (mut store, mut ctl) = setup_rect();
    assert!(ctl.toggle_lock(&mut store));
    assert_eq!(store.updates.last(), Some(&ElementPatch::locked(true)));
    assert!(store.doc.get(&ctl.id()).unwrap().locked);
    ctl.toggle_lock(&mut store);
    assert!(!store.doc.get(&ctl.id()).unwrap().locked);
}

#[test]
fn toggle_lock_mid_drag_keeps_gesture_and_blocks_next() {
    let (mut store, mut ctl) = setup_rect();
    let mut sel = Selected::default();
    ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary);
    ctl.on_pointer_move(&mut store, pt(5.0, 5.0));
    ctl.toggle_lock(&mut store);

    assert!(ctl.on_pointer_move(&mut store, pt(10.0, 10.0)));
    let b = bounds_of(&store, &ctl);
    assert_eq!((b.x, b.y), (110.0, 110.0));

    ctl.end_gesture();
    assert!(!ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary));
}

#[test]
fn toggle_lock_missing_element_is_noop() {
    let mut store = Recorder::default();
    let mut ctl = ElementController::new(uuid::Uuid::new_v4());
    assert!(!ctl.toggle_lock(&mut store));
    assert!(store.updates.is_empty());
}

// =============================================================
// Text editing
// =============================================================

#[test]
fn begin_text_edit_seeds_draft() {
    let (store, mut ctl) = setup_text("Hello");
    assert!(ctl.begin_text_edit(&store));
    assert_eq!(*ctl.state(), InteractionState::Editing);
    assert_eq!(ctl.draft(), "Hello");
}

#[test]
fn begin_text_edit_rejects_non_text() {
    let (store, mut ctl) = setup(ElementKind::Image { url: "a.png".into() });
    assert!(!ctl.begin_text_edit(&store));
    assert_eq!(*ctl.state(), InteractionState::Idle);
}

#[test]
fn begin_text_edit_rejected_mid_drag() {
    let (store, mut ctl) = setup_text("x");
    let mut sel = Selected::default();
    ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary);
    assert!(!ctl.begin_text_edit(&store));
}

#[test]
fn gestures_rejected_while_editing() {
    let (store, mut ctl) = setup_text("x");
    let mut sel = Selected::default();
    ctl.begin_text_edit(&store);
    assert!(!ctl.begin_drag(&store, &mut sel, pt(0.0, 0.0), Button::Primary));
    assert!(!ctl.begin_resize(&store, pt(0.0, 0.0), Handle::Ne));
    assert_eq!(*ctl.state(), InteractionState::Editing);
}

#[test]
fn set_draft_only_while_editing() {
    let (store, mut ctl) = setup_text("x");
    assert!(!ctl.set_draft("ignored"));
    assert_eq!(ctl.draft(), "");
    ctl.begin_text_edit(&store);
    assert!(ctl.set_draft("typed"));
    assert_eq!(ctl.draft(), "typed");
}

#[test]
fn commit_emits_draft_content() {
    let (mut store, mut ctl) = setup_text("old");
    ctl.begin_text_edit(&store);
    ctl.set_draft("new text");
    assert!(ctl.commit_text_edit(&mut store));

    assert_eq!(store.updates, vec![ElementPatch::content("new text".into())]);
    assert_eq!(store.doc.get(&ctl.id()).unwrap().kind.content(), Some("new text"));
    assert_eq!(*ctl.state(), InteractionState::Idle);
}

#[test]
fn cancel_restores_pre_edit_content() {
    let (mut store, mut ctl) = setup_text("keep me");
    ctl.begin_text_edit(&store);
    ctl.set_draft("throw away");
    assert!(ctl.cancel_text_edit(&store));

    assert_eq!(ctl.draft(), "keep me");
    assert!(store.updates.is_empty());
    assert_eq!(*ctl.state(), InteractionState::Idle);
    assert!(!ctl.commit_text_edit(&mut store));
}

#[test]
fn commit_and_cancel_outside_editing_are_noops() {
    let (mut store, mut ctl) = setup_text("x");
    assert!(!ctl.commit_text_edit(&mut store));
    assert!(!ctl.cancel_text_edit(&store));
    assert!(store.updates.is_empty());
}

// =============================================================
// Remove / duplicate
// =============================================================

#[test]
fn remove_and_duplicate_forward_to_store() {
    let (mut store, mut ctl) = setup_rect();
    ctl.duplicate(&mut store);
    assert_eq!(store.duplicated, vec![ctl.id()]);
    ctl.remove(&mut store);
    assert_eq!(store.removed, vec![ctl.id()]);
    assert!(store.doc.is_empty());
}

#[test]
fn remove_mid_gesture_resets_state() {
    let (mut store, mut ctl) = setup_rect();
    ctl.begin_resize(&store, pt(0.0, 0.0), Handle::Sw);
    ctl.remove(&mut store);
    assert_eq!(*ctl.state(), InteractionState::Idle);
}
