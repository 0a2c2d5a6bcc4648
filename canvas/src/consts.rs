//! Shared numeric constants for the canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height an element can be resized to, in canvas pixels.
pub const MIN_ELEMENT_SIZE: f64 = 20.0;

/// Offset applied on both axes when an element is duplicated.
pub const DUPLICATE_OFFSET: f64 = 20.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Hit slop in pixels around each corner resize handle.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Rendering ───────────────────────────────────────────────────

/// Line height multiplier applied to the font size for multi-line text.
pub const TEXT_LINE_HEIGHT: f64 = 1.2;
