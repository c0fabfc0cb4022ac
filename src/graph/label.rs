//! Node label rendering
//!
//! Labels are produced from a node's payload at draw time. The HTML label
//! mirrors the node card of the web dashboard: a colored status stripe, a
//! status glyph with the object name, then kind and namespace lines.

use crate::graph::model::NodePayload;
use crate::models::ObjectStatus;

/// Pure mapping from node payload to label markup
pub trait LabelRenderer {
    fn render(&self, payload: &NodePayload) -> String;
}

impl<F> LabelRenderer for F
where
    F: Fn(&NodePayload) -> String,
{
    fn render(&self, payload: &NodePayload) -> String {
        self(payload)
    }
}

/// Colors used for each status, as normalized `#rrggbb` strings
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPalette {
    pub current: String,
    pub in_progress: String,
    pub failed: String,
    pub edge: String,
}

impl StatusPalette {
    /// Build a palette from CSS color strings (names, hex, rgb(), hsl())
    pub fn parse(
        current: &str,
        in_progress: &str,
        failed: &str,
        edge: &str,
    ) -> Result<Self, csscolorparser::ParseColorError> {
        Ok(Self {
            current: normalize_color(current)?,
            in_progress: normalize_color(in_progress)?,
            failed: normalize_color(failed)?,
            edge: normalize_color(edge)?,
        })
    }

    pub fn color_for(&self, status: ObjectStatus) -> &str {
        match status {
            ObjectStatus::Current => &self.current,
            ObjectStatus::InProgress => &self.in_progress,
            ObjectStatus::Failed => &self.failed,
        }
    }
}

impl Default for StatusPalette {
    fn default() -> Self {
        Self {
            current: "#27ae60".to_string(),
            in_progress: "#f2994a".to_string(),
            failed: "#bc381d".to_string(),
            edge: "#737373".to_string(),
        }
    }
}

/// Parse a CSS color and return it as lowercase `#rrggbb`
pub fn normalize_color(color: &str) -> Result<String, csscolorparser::ParseColorError> {
    let [r, g, b, _] = csscolorparser::parse(color.trim())?.to_rgba8();
    Ok(format!("#{:02x}{:02x}{:02x}", r, g, b))
}

/// HTML card label
#[derive(Debug, Clone, Default)]
pub struct HtmlLabel {
    pub palette: StatusPalette,
}

impl HtmlLabel {
    pub fn new(palette: StatusPalette) -> Self {
        Self { palette }
    }
}

impl LabelRenderer for HtmlLabel {
    fn render(&self, payload: &NodePayload) -> String {
        let status = payload.status.as_str();
        let color = self.palette.color_for(payload.status);
        format!(
            concat!(
                r#"<div class="node">"#,
                r#"<div class="status-line {status}" style="background-color:{color}"></div>"#,
                r#"<div class="nodeText">"#,
                r#"<div class="name"><span class="status {status}" style="color:{color}">{glyph}</span> {name}</div>"#,
                r#"<div class="kind">{kind}</div>"#,
                r#"<div class="kind">{namespace}</div>"#,
                "</div></div>"
            ),
            status = status,
            color = color,
            glyph = status_glyph(payload),
            name = escape_html(&payload.name),
            kind = escape_html(&payload.kind),
            namespace = escape_html(&payload.namespace),
        )
    }
}

/// Plain text label: name, kind and namespace on separate lines
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainLabel;

impl LabelRenderer for PlainLabel {
    fn render(&self, payload: &NodePayload) -> String {
        format!(
            "{} {}\n{}\n{}",
            status_glyph(payload),
            payload.name,
            payload.kind,
            payload.namespace
        )
    }
}

fn status_glyph(payload: &NodePayload) -> &'static str {
    if payload.suspended {
        return "⏸";
    }
    match payload.status {
        ObjectStatus::Current => "●",
        ObjectStatus::InProgress => "◐",
        ObjectStatus::Failed => "○",
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
