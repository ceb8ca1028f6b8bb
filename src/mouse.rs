//! Interactive move/resize (§4.10): a private redispatch loop driven by
//! `MotionNotify`, throttled to roughly 60Hz, with edge-snap to neighboring
//! monitor boundaries and a drift-to-floating threshold for tiled clients.
//! Grounded on `movemouse`/`resizemouse` in `original_source/src/dynamd.c`.

use crate::client::{Client, ClientId};
use crate::geometry::{apply_size_hints, Rect};
use crate::monitor::Monitor;

/// ~60Hz in the microsecond resolution `XMotionEvent.time` (ms) arrives in.
const THROTTLE_MS: u64 = 1000 / 60;

/// dwm's `snap`: a dragged/resized edge within this many pixels of a
/// monitor boundary jumps to it exactly.
pub const SNAP_PX: i32 = crate::config::SNAP;

#[derive(Debug, Clone, Copy)]
pub struct DragState {
    pub client: ClientId,
    pub start_pointer: (i32, i32),
    pub start_rect: Rect,
    pub last_event_ms: u64,
}

impl DragState {
    pub fn new(client: ClientId, pointer: (i32, i32), rect: Rect) -> Self {
        DragState {
            client,
            start_pointer: pointer,
            start_rect: rect,
            last_event_ms: 0,
        }
    }

    /// Rejects a `MotionNotify` arriving before the throttle window has
    /// elapsed since the last accepted one.
    pub fn should_throttle(&self, event_ms: u64) -> bool {
        event_ms.saturating_sub(self.last_event_ms) < THROTTLE_MS
    }
}

/// Candidate top-left for a move, snapped to any monitor edge within
/// `SNAP_PX`. `bounds` is the containing monitor's screen rect.
pub fn snap_move(candidate: (i32, i32), size: (i32, i32), bounds: Rect) -> (i32, i32) {
    let (mut x, mut y) = candidate;
    let (w, h) = size;

    if (x - bounds.x).abs() < SNAP_PX {
        x = bounds.x;
    } else if ((bounds.x + bounds.w) - (x + w)).abs() < SNAP_PX {
        x = bounds.x + bounds.w - w;
    }

    if (y - bounds.y).abs() < SNAP_PX {
        y = bounds.y;
    } else if ((bounds.y + bounds.h) - (y + h)).abs() < SNAP_PX {
        y = bounds.y + bounds.h - h;
    }

    (x, y)
}

/// Computes the next rectangle for a move drag: the pointer delta applied
/// to the drag's starting rect, edge-snapped, then clamped through ICCCM
/// size hints exactly as a tiled resize would be (but non-interactive
/// clamping is skipped: `interactive = true`).
pub fn move_candidate(client: &Client, drag: &DragState, pointer_now: (i32, i32), bounds: Rect) -> Rect {
    let dx = pointer_now.0 - drag.start_pointer.0;
    let dy = pointer_now.1 - drag.start_pointer.1;
    let raw = Rect {
        x: drag.start_rect.x + dx,
        y: drag.start_rect.y + dy,
        w: drag.start_rect.w,
        h: drag.start_rect.h,
    };
    let (sx, sy) = snap_move((raw.x, raw.y), (raw.w, raw.h), bounds);
    let snapped = Rect { x: sx, y: sy, ..raw };
    let (result, _) = apply_size_hints(&client.hints, client.rect, snapped, client.bw, bounds, true, true);
    result
}

/// Computes the next rectangle for a resize drag: pointer delta grows
/// width/height from the drag's starting size, clamped to a 1px floor
/// before hints are applied.
pub fn resize_candidate(client: &Client, drag: &DragState, pointer_now: (i32, i32), bounds: Rect) -> Rect {
    let dx = pointer_now.0 - drag.start_pointer.0;
    let dy = pointer_now.1 - drag.start_pointer.1;
    let raw = Rect {
        x: drag.start_rect.x,
        y: drag.start_rect.y,
        w: (drag.start_rect.w + dx).max(1),
        h: (drag.start_rect.h + dy).max(1),
    };
    let (result, _) = apply_size_hints(&client.hints, client.rect, raw, client.bw, bounds, true, true);
    result
}

/// Whether a drag's net displacement should drop a tiled client into
/// floating mode: the original unconditionally floats on `movemouse`, but
/// for `resizemouse` only once past a drift threshold so tiny accidental
/// drags on a tiled border don't detach it. Mirrors the toggle in the
/// original `resizemouse`'s `&& !c->isfloating` branch.
pub fn resize_should_float(client: &Client, drag: &DragState, pointer_now: (i32, i32)) -> bool {
    if client.is_floating() {
        return false;
    }
    let dx = (pointer_now.0 - drag.start_pointer.0).abs();
    let dy = (pointer_now.1 - drag.start_pointer.1).abs();
    dx > SNAP_PX || dy > SNAP_PX
}

/// Picks which monitor a released drag's client centroid now falls in,
/// for `sendmon` when a drag crosses a monitor boundary. Returns the
/// monitor whose screen rect contains the rect's center, if any.
pub fn monitor_under_centroid<'a>(rect: Rect, monitors: impl Iterator<Item = (crate::monitor::MonitorId, &'a Monitor)>) -> Option<crate::monitor::MonitorId> {
    let (cx, cy) = rect.center();
    monitors
        .filter(|(_, m)| m.screen.intersects(Rect::new(cx, cy, 1, 1)))
        .map(|(id, _)| id)
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn snap_move_locks_to_left_edge_within_threshold() {
        let bounds = Rect::new(0, 0, 1920, 1080);
        let (x, y) = snap_move((5, 500), (400, 300), bounds);
        assert_eq!(x, 0);
        assert_eq!(y, 500);
    }

    #[test]
    fn snap_move_locks_to_right_edge_within_threshold() {
        let bounds = Rect::new(0, 0, 1920, 1080);
        let (x, _) = snap_move((1920 - 400 - 5, 0), (400, 300), bounds);
        assert_eq!(x, 1920 - 400);
    }

    #[test]
    fn snap_move_leaves_far_from_edge_untouched() {
        let bounds = Rect::new(0, 0, 1920, 1080);
        let (x, y) = snap_move((500, 500), (400, 300), bounds);
        assert_eq!((x, y), (500, 500));
    }

    #[test]
    fn throttle_rejects_rapid_successive_events() {
        let mut monitors: Arena<Monitor> = Arena::new();
        let mon = monitors.insert(Monitor::new(0, Rect::default()));
        let mut clients: Arena<Client> = Arena::new();
        let cid = clients.insert(Client::new(1, Rect::default(), 2, mon, 1));
        let drag = DragState::new(cid, (0, 0), Rect::default());
        assert!(drag.should_throttle(5));
        assert!(!drag.should_throttle(20));
    }

    #[test]
    fn resize_should_float_requires_crossing_snap_threshold() {
        let mut monitors: Arena<Monitor> = Arena::new();
        let mon = monitors.insert(Monitor::new(0, Rect::default()));
        let mut clients: Arena<Client> = Arena::new();
        let cid = clients.insert(Client::new(1, Rect::default(), 2, mon, 1));
        let client = clients.get(cid).unwrap();
        let drag = DragState::new(cid, (0, 0), Rect::default());
        assert!(!resize_should_float(client, &drag, (5, 5)));
        assert!(resize_should_float(client, &drag, (50, 0)));
    }
}
