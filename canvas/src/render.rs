//! Rendering: writes the canvas scene as a standalone SVG document.
//!
//! This module receives a read-only view of the document and produces markup;
//! it does not mutate any state. Elements are drawn bottom-first in z-order and
//! hidden elements are skipped. The scene keeps its own coordinate system via
//! `viewBox`, so the same scene can be emitted at any output size.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::consts::TEXT_LINE_HEIGHT;
use crate::doc::{DocStore, Element, ElementKind, Style};

/// Scene and output dimensions for [`scene_svg`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneOptions {
    /// Scene width in canvas pixels (the `viewBox` width).
    pub scene_width: f64,
    /// Scene height in canvas pixels (the `viewBox` height).
    pub scene_height: f64,
    /// Output width in pixels.
    pub output_width: f64,
    /// Output height in pixels.
    pub output_height: f64,
    /// Optional background fill covering the scene.
    pub background: Option<String>,
}

impl SceneOptions {
    /// Options that render the scene at its own size.
    #[must_use]
    pub fn native(width: f64, height: f64) -> Self {
        Self { scene_width: width, scene_height: height, output_width: width, output_height: height, background: None }
    }
}

/// Render all visible elements of `doc` as an SVG document.
#[must_use]
pub fn scene_svg(doc: &DocStore, options: &SceneOptions) -> String {
    elements_svg(doc.sorted_elements(), options)
}

/// Render the given elements (already in draw order) as an SVG document.
#[must_use]
pub fn elements_svg<'a>(elements: impl IntoIterator<Item = &'a Element>, options: &SceneOptions) -> String {
    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{}" height="{}" viewBox="0 0 {} {}" preserveAspectRatio="xMidYMid meet">"#,
        options.output_width, options.output_height, options.scene_width, options.scene_height
    );

    if let Some(bg) = &options.background {
        out.push_str(&format!(
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            options.scene_width,
            options.scene_height,
            escape(bg)
        ));
    }

    for el in elements.into_iter().filter(|el| el.visible) {
        write_element(&mut out, el);
    }

    out.push_str("</svg>");
    out
}

// =============================================================
// Element dispatch
// =============================================================

fn write_element(out: &mut String, el: &Element) {
    let style = Style::new(&el.style);
    let opacity = style.opacity();
    let group = opacity < 1.0;
    if group {
        out.push_str(&format!(r#"<g opacity="{opacity}">"#));
    }

    match &el.kind {
        ElementKind::Text { content } => write_text(out, el, &style, content),
        ElementKind::Rectangle => write_rect(out, el, &style),
        ElementKind::Circle => write_ellipse(out, el, &style),
        ElementKind::Image { url } | ElementKind::SvgEmbed { url } => write_image(out, el, url),
    }

    if group {
        out.push_str("</g>");
    }
}

fn stroke_attrs(style: &Style<'_>) -> String {
    let width = style.border_width();
    if width <= 0.0 {
        return String::new();
    }
    format!(r#" stroke="{}" stroke-width="{width}""#, escape(style.border_color()))
}

fn write_rect(out: &mut String, el: &Element, style: &Style<'_>) {
    let radius = style.radius().min(el.width / 2.0).min(el.height / 2.0).max(0.0);
    let corner = if radius > 0.0 { format!(r#" rx="{radius}" ry="{radius}""#) } else { String::new() };
    out.push_str(&format!(
        r#"<rect x="{}" y="{}" width="{}" height="{}"{corner} fill="{}"{}/>"#,
        el.x,
        el.y,
        el.width,
        el.height,
        escape(style.fill()),
        stroke_attrs(style)
    ));
}

fn write_ellipse(out: &mut String, el: &Element, style: &Style<'_>) {
    let rx = el.width / 2.0;
    let ry = el.height / 2.0;
    out.push_str(&format!(
        r#"<ellipse cx="{}" cy="{}" rx="{rx}" ry="{ry}" fill="{}"{}/>"#,
        el.x + rx,
        el.y + ry,
        escape(style.fill()),
        stroke_attrs(style)
    ));
}

fn write_image(out: &mut String, el: &Element, url: &str) {
    if url.is_empty() {
        return;
    }
    out.push_str(&format!(
        r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid meet" xlink:href="{}"/>"#,
        el.x,
        el.y,
        el.width,
        el.height,
        escape(url)
    ));
}

fn write_text(out: &mut String, el: &Element, style: &Style<'_>, content: &str) {
    if content.is_empty() {
        return;
    }
    let font_size = style.font_size();
    let line_height = font_size * TEXT_LINE_HEIGHT;

    out.push_str(&format!(
        r#"<text xml:space="preserve" font-family="{}" font-size="{font_size}" font-weight="{}" fill="{}">"#,
        escape(style.font_family()),
        escape(&style.font_weight()),
        escape(style.color())
    ));
    let mut baseline = el.y + font_size;
    for line in content.lines() {
        out.push_str(&format!(r#"<tspan x="{}" y="{baseline}">{}</tspan>"#, el.x, escape(line)));
        baseline += line_height;
    }
    out.push_str("</text>");
}

/// Escape text for use in XML attribute values and character data.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
