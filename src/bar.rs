//! Bar layout and click routing (§4.9): which tag/title/symbol segments
//! get drawn, in what order, and which `ClickRegion` a given click-x maps
//! to. Pixel painting itself is delegated to `render::Drawable`.

use crate::arena::Arena;
use crate::client::Client;
use crate::config::{self, ClickRegion};
use crate::geometry::Rect;
use crate::monitor::Monitor;
use crate::render::{Drawable, Segment};

const PAD: u32 = 4;

/// Which tags have at least one client attached, regardless of visibility.
/// Drives the "don't draw a tag nobody's using" rule below.
pub fn occupied_tags(mon: &Monitor, clients: &Arena<Client>) -> u32 {
    mon.clients.iter().fold(0u32, |acc, &id| {
        clients.get(id).map_or(acc, |c| acc | c.tags)
    })
}

pub fn urgent_tags(mon: &Monitor, clients: &Arena<Client>) -> u32 {
    mon.clients.iter().fold(0u32, |acc, &id| {
        clients
            .get(id)
            .filter(|c| c.is_urgent())
            .map_or(acc, |c| acc | c.tags)
    })
}

/// A tag is drawn only if it is occupied, urgent, or the currently active
/// tag — an empty, un-selected tag wastes bar space for nothing (Design
/// Notes §9: vacant-tag omission).
fn tag_should_draw(tag: usize, occupied: u32, urgent: u32, active: u32) -> bool {
    let bit = 1u32 << tag;
    occupied & bit != 0 || urgent & bit != 0 || active & bit != 0
}

/// Lays out the bar's tag segments, layout symbol, and window title into
/// drawable segments, left to right, for the given monitor.
pub fn layout_segments(mon: &Monitor, clients: &Arena<Client>, drawable: &dyn Drawable, bar_rect: Rect) -> Vec<Segment> {
    let occupied = occupied_tags(mon, clients);
    let urgent = urgent_tags(mon, clients);
    let active = mon.active_tagset();

    let mut segments = Vec::new();
    let mut x = bar_rect.x;

    for (tag, &name) in config::TAGS.iter().enumerate() {
        if !tag_should_draw(tag, occupied, urgent, active) {
            continue;
        }
        let w = drawable.text_width(name) + PAD as u32 * 2;
        let selected = active & (1 << tag) != 0;
        let is_urgent = urgent & (1 << tag) != 0;
        let scheme = if selected {
            config::SCHEME_SEL
        } else {
            config::SCHEME_NORM
        };
        segments.push(Segment {
            rect: Rect::new(x, bar_rect.y, w as i32, bar_rect.h),
            text: name.to_string(),
            scheme,
            inverted: is_urgent,
        });
        x += w as i32;
    }

    let ltsymbol = mon.current_layout().symbol;
    let lt_w = drawable.text_width(ltsymbol) + PAD as u32 * 2;
    segments.push(Segment {
        rect: Rect::new(x, bar_rect.y, lt_w as i32, bar_rect.h),
        text: ltsymbol.to_string(),
        scheme: config::SCHEME_NORM,
        inverted: false,
    });
    x += lt_w as i32;

    let title = mon
        .sel
        .and_then(|id| clients.get(id))
        .map(|c| c.name.as_str())
        .unwrap_or("");
    let title_w = (bar_rect.x + bar_rect.w - x).max(0);
    segments.push(Segment {
        rect: Rect::new(x, bar_rect.y, title_w, bar_rect.h),
        text: title.to_string(),
        scheme: config::SCHEME_NORM,
        inverted: mon.sel.is_some(),
    });

    segments
}

/// Maps a click's x coordinate within the bar to the region it landed in
/// and, for `TagBar` clicks, which tag bit. Segment order/geometry must
/// match `layout_segments`'s output for the same monitor state.
pub fn click_region(mon: &Monitor, clients: &Arena<Client>, drawable: &dyn Drawable, bar_rect: Rect, click_x: i32) -> (ClickRegion, u32) {
    let segments = layout_segments(mon, clients, drawable, bar_rect);
    let occupied = occupied_tags(mon, clients);
    let urgent = urgent_tags(mon, clients);
    let active = mon.active_tagset();

    let mut drawn_tags = Vec::new();
    for tag in 0..config::NTAGS {
        if tag_should_draw(tag, occupied, urgent, active) {
            drawn_tags.push(tag);
        }
    }

    let ntags_drawn = drawn_tags.len();
    for (i, seg) in segments.iter().enumerate() {
        if click_x < seg.rect.x || click_x >= seg.rect.x + seg.rect.w {
            continue;
        }
        if i < ntags_drawn {
            return (ClickRegion::TagBar, 1 << drawn_tags[i]);
        }
        if i == ntags_drawn {
            return (ClickRegion::LtSymbol, 0);
        }
        return (ClickRegion::StatusText, 0);
    }
    (ClickRegion::RootWin, 0)
}

/// Truncates a window title for the tab bar when it would overflow its
/// allotted slot width, appending an ellipsis so every tab stays distinct
/// from its neighbor even under crowding.
pub fn truncate_for_tab(drawable: &dyn Drawable, title: &str, max_width: u32) -> String {
    if drawable.text_width(title) <= max_width {
        return title.to_string();
    }
    let mut out = String::new();
    for ch in title.chars() {
        let candidate = format!("{}{}…", out, ch);
        if drawable.text_width(&candidate) > max_width {
            break;
        }
        out.push(ch);
    }
    format!("{}…", out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullDrawable;

    fn drawable() -> NullDrawable {
        NullDrawable { char_width: 6 }
    }

    #[test]
    fn vacant_untagged_tags_are_omitted() {
        let mon = Monitor::new(0, Rect::new(0, 0, 1920, 1080));
        let clients: Arena<Client> = Arena::new();
        let d = drawable();
        let segs = layout_segments(&mon, &clients, &d, Rect::new(0, 0, 1920, 20));
        // Only tag 0 (the active tag) plus ltsymbol plus title.
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].text, "1");
    }

    #[test]
    fn occupied_tag_is_drawn_even_if_inactive() {
        let mut mon = Monitor::new(0, Rect::new(0, 0, 1920, 1080));
        let mut clients: Arena<Client> = Arena::new();
        let id = clients.insert(Client::new(5, Rect::default(), 2, crate::arena::Arena::<Monitor>::new().insert(Monitor::new(0, Rect::default())), 0b10));
        mon.clients.push(id);
        let d = drawable();
        let segs = layout_segments(&mon, &clients, &d, Rect::new(0, 0, 1920, 20));
        assert!(segs.iter().any(|s| s.text == "2"));
    }

    #[test]
    fn truncate_leaves_short_titles_untouched() {
        let d = drawable();
        assert_eq!(truncate_for_tab(&d, "ok", 100), "ok");
    }

    #[test]
    fn truncate_shortens_long_titles_with_ellipsis() {
        let d = drawable();
        let truncated = truncate_for_tab(&d, "a very long window title indeed", 30);
        assert!(truncated.ends_with('…'));
        assert!(d.text_width(&truncated) <= 36);
    }
}
