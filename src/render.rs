//! Bar painting, kept deliberately thin: pixel rendering is explicitly
//! out of scope (§1 Non-goals — "rendering backend/drawing primitives").
//! This module only defines the seam `bar.rs` needs to hand off computed
//! layout (segment rectangles, strings, colors) to something that can put
//! pixels on screen; no implementation of that something is provided.

use crate::config::ColorScheme;
use crate::geometry::Rect;

/// One already-laid-out piece of bar content: a tag label, the layout
/// symbol, or the window title. `bar.rs` computes these; a `Drawable`
/// impl decides how to actually paint them.
#[derive(Debug, Clone)]
pub struct Segment {
    pub rect: Rect,
    pub text: String,
    pub scheme: ColorScheme,
    pub inverted: bool,
}

/// The seam between computed bar layout and an actual rendering backend.
/// No implementor ships in this crate; a real one would wrap Xft/fontconfig
/// the way the upstream bar does, which is explicitly not this crate's job.
pub trait Drawable {
    fn text_width(&self, text: &str) -> u32;
    fn paint_bar(&self, window: crate::client::XWindow, segments: &[Segment], bar_rect: Rect);
}

/// A no-op `Drawable` for tests and headless operation: reports a
/// constant-per-character width and records nothing.
pub struct NullDrawable {
    pub char_width: u32,
}

impl Drawable for NullDrawable {
    fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.char_width
    }

    fn paint_bar(&self, _window: crate::client::XWindow, _segments: &[Segment], _bar_rect: Rect) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_drawable_width_is_proportional_to_length() {
        let d = NullDrawable { char_width: 6 };
        assert_eq!(d.text_width("abc"), 18);
        assert_eq!(d.text_width(""), 0);
    }
}
