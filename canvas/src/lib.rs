//! Element interaction core for the canvas design editor.
//!
//! This crate owns everything that happens to an element between the host's
//! raw input events and the element store: translating pointer gestures into
//! geometry updates, the inline text-editing sub-mode, lock handling, z-order
//! commands, hit-testing, and rendering the scene to SVG markup for export.
//! It does not depend on any UI framework; the host wires its events into
//! [`engine::Engine`] and forwards the returned [`engine::Action`]s to
//! whatever persists the document.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Canvas engine: selection, gesture capture, keyboard commands |
//! | [`controller`] | Per-element interaction state machine |
//! | [`doc`] | Element types, sparse patches, the store traits and [`doc::DocStore`] |
//! | [`input`] | Input event types and the interaction state |
//! | [`hit`] | Hit-testing against element bodies and resize handles |
//! | [`render`] | SVG scene rendering |
//! | [`geometry`] | Points, deltas and bounds in canvas coordinates |
//! | [`consts`] | Shared numeric constants (minimum sizes, handle radius, etc.) |

pub mod consts;
pub mod controller;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod render;
