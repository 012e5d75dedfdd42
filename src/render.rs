//! Markup assembly for frames and previews.

use crate::highlight::MarkedText;
use crate::Frame;

/// Configuration for turning frames into markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// CSS class of the wrapping output box
    pub container_class: String,
    /// Markup appended after the newest revealed text while a session runs
    pub cursor_marker: String,
}

impl RenderConfig {
    /// Create a config with the given container class and the default cursor.
    pub fn new(container_class: impl Into<String>) -> Self {
        Self {
            container_class: container_class.into(),
            ..Self::default()
        }
    }

    /// Replace the cursor marker.
    pub fn with_cursor_marker(mut self, marker: impl Into<String>) -> Self {
        self.cursor_marker = marker.into();
        self
    }

    fn wrap(&self, body: &str) -> String {
        format!(r#"<div class="{}">{}</div>"#, self.container_class, body)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            container_class: "output-box".to_string(),
            cursor_marker: r#"<span class="cursor"></span>"#.to_string(),
        }
    }
}

/// Build the inner markup of a frame: highlighted text plus the cursor
/// marker when the frame still has one.
pub fn frame_body(frame: &Frame, config: &RenderConfig) -> String {
    let marked = &frame.marked().display;
    if frame.has_cursor() {
        let mut body = String::with_capacity(marked.len() + config.cursor_marker.len());
        body.push_str(marked);
        body.push_str(&config.cursor_marker);
        body
    } else {
        marked.clone()
    }
}

/// Render a frame inside the output box.
///
/// ## Example
///
/// ```rust
/// use rapstar_core::render::{render_frame, RenderConfig};
/// use rapstar_core::{PlaybackEngine, PlaybackOptions, TextBuffer, VirtualTimer};
///
/// let buffer = TextBuffer::with_text("ab");
/// let mut engine = PlaybackEngine::new();
/// let task = engine.play(&buffer, PlaybackOptions::default()).unwrap().into_task().unwrap();
///
/// let mut html = Vec::new();
/// let config = RenderConfig::default();
/// pollster::block_on(task.run(&VirtualTimer::new(), |frame| html.push(render_frame(&frame, &config))));
///
/// assert_eq!(html[0], r#"<div class="output-box">a<span class="cursor"></span></div>"#);
/// assert_eq!(html[1], r#"<div class="output-box">ab</div>"#);
/// ```
pub fn render_frame(frame: &Frame, config: &RenderConfig) -> String {
    config.wrap(&frame_body(frame, config))
}

/// Render a static preview inside the output box.
pub fn render_preview(marked: &MarkedText, config: &RenderConfig) -> String {
    config.wrap(&marked.display)
}

/// Web-specific rendering implementation.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use web_sys::Element;

    /// Replace the contents of `target` with the frame markup.
    pub fn render_to_element(frame: &Frame, target: &Element, config: &RenderConfig) {
        target.set_inner_html(&render_frame(frame, config));
    }

    /// Replace the contents of `target` with a static preview.
    pub fn render_preview_to_element(marked: &MarkedText, target: &Element, config: &RenderConfig) {
        target.set_inner_html(&render_preview(marked, config));
    }

    /// Look up an element by id in the current document.
    pub fn element_by_id(id: &str) -> Result<Element, String> {
        let window = web_sys::window().ok_or("No window available")?;
        let document = window.document().ok_or("No document available")?;
        document
            .get_element_by_id(id)
            .ok_or_else(|| format!("No element with id {id:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight;

    #[test]
    fn test_render_preview() {
        let marked = highlight::render("<b>yo</b>", "yo");
        let html = render_preview(&marked, &RenderConfig::new("preview"));
        assert_eq!(
            html,
            r#"<div class="preview">&lt;b&gt;<mark>yo</mark>&lt;/b&gt;</div>"#
        );
    }

    #[test]
    fn test_custom_cursor_marker() {
        let config = RenderConfig::default().with_cursor_marker("▍");
        assert_eq!(config.cursor_marker, "▍");
        assert_eq!(config.container_class, "output-box");
    }
}
