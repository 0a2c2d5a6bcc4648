//! Document model: elements, their style, sparse patches, and the element store.
//!
//! This module defines what is on the canvas (`Element`, `ElementKind`), the
//! sparse-update type emitted by interactions (`ElementPatch`), typed access to
//! the opaque `style` JSON bag (`Style`), the collaborator traits the
//! interaction controller talks to (`ElementStore`, `Selection`), and the
//! in-memory store that owns all live elements (`DocStore`).
//!
//! Elements are created and destroyed by the store. Interactions only ever
//! mutate a subset of fields through `ElementStore::update_element`.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::DUPLICATE_OFFSET;
use crate::geometry::{Bounds, Point};

/// Unique identifier for a canvas element.
pub type ElementId = Uuid;

/// The kind of an element, carrying only the fields that kind needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    /// Inline-editable text block.
    Text {
        /// The committed text.
        content: String,
    },
    /// Axis-aligned rectangle.
    Rectangle,
    /// Ellipse inscribed within the bounding box.
    Circle,
    /// Raster image loaded from a URL.
    Image {
        /// Image source URL (remote or `data:`).
        url: String,
    },
    /// Embedded SVG document loaded from a URL.
    SvgEmbed {
        /// SVG source URL (remote or `data:`).
        url: String,
    },
}

impl ElementKind {
    /// Whether this element supports inline text editing.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    /// The element's content: text for text elements, the URL for media.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            Self::Image { url } | Self::SvgEmbed { url } => Some(url),
            Self::Rectangle | Self::Circle => None,
        }
    }

    /// Replace the content. Returns false for kinds that carry none.
    pub fn set_content(&mut self, value: String) -> bool {
        match self {
            Self::Text { content } => *content = value,
            Self::Image { url } | Self::SvgEmbed { url } => *url = value,
            Self::Rectangle | Self::Circle => return false,
        }
        true
    }

    /// Wire name of the kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Image { .. } => "image",
            Self::SvgEmbed { .. } => "svg-embed",
        }
    }
}

fn default_visible() -> bool {
    true
}

/// An element as stored in the document and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier for this element.
    pub id: ElementId,
    /// Element kind and its kind-specific fields.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Left edge in canvas pixels. Never negative.
    pub x: f64,
    /// Top edge in canvas pixels. Never negative.
    pub y: f64,
    /// Width in canvas pixels.
    pub width: f64,
    /// Height in canvas pixels.
    pub height: f64,
    /// Opaque visual attributes (colors, font, border, radius).
    #[serde(default)]
    pub style: serde_json::Value,
    /// Locked elements cannot be dragged, resized, or edited.
    #[serde(default)]
    pub locked: bool,
    /// Hidden elements stay in the document but are not drawn or hit.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Stacking order; lower values are drawn beneath higher values.
    #[serde(default)]
    pub z_index: i64,
}

impl Element {
    /// Create a visible, unlocked element with a fresh id and empty style.
    #[must_use]
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            width,
            height,
            style: serde_json::Value::Null,
            locked: false,
            visible: true,
            z_index: 0,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New text or media URL. Ignored for kinds without content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
}

impl ElementPatch {
    /// A position-only update.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    /// A combined position and size update.
    #[must_use]
    pub fn bounds(bounds: Bounds) -> Self {
        Self {
            x: Some(bounds.x),
            y: Some(bounds.y),
            width: Some(bounds.width),
            height: Some(bounds.height),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn content(content: String) -> Self {
        Self { content: Some(content), ..Default::default() }
    }

    #[must_use]
    pub fn locked(locked: bool) -> Self {
        Self { locked: Some(locked), ..Default::default() }
    }

    #[must_use]
    pub fn visible(visible: bool) -> Self {
        Self { visible: Some(visible), ..Default::default() }
    }

    #[must_use]
    pub fn z_index(z_index: i64) -> Self {
        Self { z_index: Some(z_index), ..Default::default() }
    }

    /// True if the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Typed access to common fields of an `Element.style` JSON value.
///
/// Keys follow the editor's camelCase style objects. Lengths may be numbers or
/// `"12px"` strings.
pub struct Style<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Style<'a> {
    /// Wrap a reference to a `style` JSON value for typed access.
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    fn str_or(&self, key: &str, default: &'a str) -> &'a str {
        self.value.get(key).and_then(|v| v.as_str()).unwrap_or(default)
    }

    fn length_or(&self, key: &str, default: f64) -> f64 {
        match self.value.get(key) {
            Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(default),
            Some(serde_json::Value::String(s)) => s.trim().trim_end_matches("px").trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Shape fill color. Defaults to `"#D94B4B"`.
    #[must_use]
    pub fn fill(&self) -> &'a str {
        self.str_or("backgroundColor", "#D94B4B")
    }

    /// Text color. Defaults to `"#1F1A17"`.
    #[must_use]
    pub fn color(&self) -> &'a str {
        self.str_or("color", "#1F1A17")
    }

    /// Font family. Defaults to `"sans-serif"`.
    #[must_use]
    pub fn font_family(&self) -> &'a str {
        self.str_or("fontFamily", "sans-serif")
    }

    /// Font size in pixels. Defaults to `16`.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.length_or("fontSize", 16.0)
    }

    /// CSS font weight (`"normal"`, `"bold"`, `"700"`). Defaults to `"normal"`.
    #[must_use]
    pub fn font_weight(&self) -> String {
        match self.value.get("fontWeight") {
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            _ => "normal".to_owned(),
        }
    }

    /// Border color. Defaults to `"#1F1A17"`.
    #[must_use]
    pub fn border_color(&self) -> &'a str {
        self.str_or("borderColor", "#1F1A17")
    }

    /// Border width in pixels. Defaults to `0` (no border).
    #[must_use]
    pub fn border_width(&self) -> f64 {
        self.length_or("borderWidth", 0.0)
    }

    /// Corner radius in pixels. Defaults to `0`.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.length_or("borderRadius", 0.0)
    }

    /// Opacity in `[0, 1]`. Defaults to `1`.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.length_or("opacity", 1.0).clamp(0.0, 1.0)
    }
}

// =============================================================
// Collaborators
// =============================================================

/// The element store an interaction controller reads from and writes to.
///
/// Implementations own element lifetime. Updates are last-writer-wins per field.
pub trait ElementStore {
    /// Current state of an element, if it exists.
    fn element(&self, id: &ElementId) -> Option<&Element>;

    /// Apply a sparse update.
    fn update_element(&mut self, id: &ElementId, patch: ElementPatch);

    /// Delete an element.
    fn remove_element(&mut self, id: &ElementId);

    /// Insert a copy of an element.
    fn duplicate_element(&mut self, id: &ElementId);
}

/// Receives "select this element" notifications.
pub trait Selection {
    fn select(&mut self, id: &ElementId);
}

// =============================================================
// DocStore
// =============================================================

/// In-memory store of canvas elements.
pub struct DocStore {
    elements: HashMap<ElementId, Element>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { elements: HashMap::new() }
    }

    /// Insert or replace an element.
    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.id, element);
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        self.elements.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Apply a sparse update. Returns false if the element doesn't exist.
    pub fn apply_patch(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        let Some(el) = self.elements.get_mut(id) else {
            return false;
        };
        if let Some(x) = patch.x {
            el.x = x;
        }
        if let Some(y) = patch.y {
            el.y = y;
        }
        if let Some(w) = patch.width {
            el.width = w;
        }
        if let Some(h) = patch.height {
            el.height = h;
        }
        if let Some(ref content) = patch.content {
            el.kind.set_content(content.clone());
        }
        if let Some(locked) = patch.locked {
            el.locked = locked;
        }
        if let Some(visible) = patch.visible {
            el.visible = visible;
        }
        if let Some(z) = patch.z_index {
            el.z_index = z;
        }
        true
    }

    /// Copy an element under a fresh id, offset down-right and stacked on top.
    ///
    /// The copy is always unlocked. Returns the inserted copy. The copy's
    /// z-index saturates at `i64::MAX`; see [`DocStore::normalize_z_order`].
    pub fn duplicate(&mut self, id: &ElementId) -> Option<Element> {
        let source = self.elements.get(id)?;
        let mut copy = source.clone();
        copy.id = Uuid::new_v4();
        copy.x += DUPLICATE_OFFSET;
        copy.y += DUPLICATE_OFFSET;
        copy.locked = false;
        copy.z_index = self.max_z_index().map_or(0, |z| z.saturating_add(1));
        self.elements.insert(copy.id, copy.clone());
        Some(copy)
    }

    /// Replace all elements with a full snapshot.
    pub fn load_snapshot(&mut self, elements: Vec<Element>) {
        self.elements.clear();
        for el in elements {
            self.elements.insert(el.id, el);
        }
    }

    /// Return all elements sorted by `(z_index, id)` for draw order.
    #[must_use]
    pub fn sorted_elements(&self) -> Vec<&Element> {
        let mut els: Vec<&Element> = self.elements.values().collect();
        els.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        els
    }

    /// Renumber z-indices to `0..len` keeping draw order.
    ///
    /// Returns the `(id, z_index)` of every element whose value changed.
    pub fn normalize_z_order(&mut self) -> Vec<(ElementId, i64)> {
        let order: Vec<ElementId> = self.sorted_elements().iter().map(|el| el.id).collect();
        let mut changed = Vec::new();
        for (z, id) in (0_i64..).zip(order) {
            if let Some(el) = self.elements.get_mut(&id) {
                if el.z_index != z {
                    el.z_index = z;
                    changed.push((id, z));
                }
            }
        }
        changed
    }

    /// Whether the stack has no room above (or below) its extreme element.
    #[must_use]
    pub fn z_order_saturated(&self) -> bool {
        self.max_z_index() == Some(i64::MAX) || self.min_z_index() == Some(i64::MIN)
    }

    /// Highest z-index in the store, if any.
    #[must_use]
    pub fn max_z_index(&self) -> Option<i64> {
        self.elements.values().map(|e| e.z_index).max()
    }

    /// Lowest z-index in the store, if any.
    #[must_use]
    pub fn min_z_index(&self) -> Option<i64> {
        self.elements.values().map(|e| e.z_index).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementStore for DocStore {
    fn element(&self, id: &ElementId) -> Option<&Element> {
        self.get(id)
    }

    fn update_element(&mut self, id: &ElementId, patch: ElementPatch) {
        if !self.apply_patch(id, &patch) {
            tracing::debug!(%id, "update for unknown element ignored");
        }
    }

    fn remove_element(&mut self, id: &ElementId) {
        if self.remove(id).is_none() {
            tracing::debug!(%id, "remove for unknown element ignored");
        }
    }

    fn duplicate_element(&mut self, id: &ElementId) {
        if self.duplicate(id).is_none() {
            tracing::debug!(%id, "duplicate for unknown element ignored");
        }
    }
}
