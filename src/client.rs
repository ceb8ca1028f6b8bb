//! The managed-window model. A `Client` is the Rust analogue of the ported
//! model's client record, minus its `next`/`snext` pointers: ordering lives
//! on `Monitor::clients` / `Monitor::stack` (see monitor.rs) as `Vec<ClientId>`.

use bitflags::bitflags;

use crate::arena::Id;
use crate::geometry::{Rect, SizeHints};
use crate::monitor::MonitorId;

pub type ClientId = Id<Client>;
pub type XWindow = x11::xlib::Window;

bitflags! {
    #[derive(Default)]
    pub struct ClientFlags: u32 {
        const ISFIXED      = 0b0000_0001;
        const ISFLOATING   = 0b0000_0010;
        const ISURGENT     = 0b0000_0100;
        const NEVERFOCUS   = 0b0000_1000;
        const ISFULLSCREEN = 0b0001_0000;
        const ISTERMINAL   = 0b0010_0000;
        const NOSWALLOW    = 0b0100_0000;
    }
}

/// A snapshot of a swallowed client's identity, taken when a terminal
/// substitutes its window for a spawned child's. Restored verbatim by
/// `unswallow` (invariant 7, §8).
#[derive(Debug, Clone)]
pub struct SwallowedSnapshot {
    pub window: XWindow,
    pub rect: Rect,
    pub bw: i32,
    pub flags: ClientFlags,
}

/// Replaces the raw `swallowing` pointer-and-reused-slot trick: a client is
/// either plain, or it is standing in for a terminal it swallowed, in which
/// case `original` is the terminal's former identity and `concealed` is the
/// id by which the hidden terminal client record can still be found
/// directly (see `swallow::swallowingclient`).
#[derive(Debug, Clone)]
pub enum ClientRole {
    Plain,
    Swallower {
        original: SwallowedSnapshot,
        concealed: ClientId,
    },
}

#[derive(Debug, Clone)]
pub struct Client {
    pub window: XWindow,
    pub name: String,
    pub rect: Rect,
    pub old_rect: Rect,
    pub bw: i32,
    pub old_bw: i32,
    pub hints: SizeHints,
    pub flags: ClientFlags,
    pub old_is_floating: bool,
    pub tags: u32,
    pub mon: MonitorId,
    pub pid: i32,
    pub role: ClientRole,
}

impl Client {
    pub fn new(window: XWindow, rect: Rect, bw: i32, mon: MonitorId, tags: u32) -> Self {
        Client {
            window,
            name: String::new(),
            rect,
            old_rect: rect,
            bw,
            old_bw: bw,
            hints: SizeHints::default(),
            flags: ClientFlags::empty(),
            old_is_floating: false,
            tags,
            mon,
            pid: 0,
            role: ClientRole::Plain,
        }
    }

    pub fn is_floating(&self) -> bool {
        self.flags.contains(ClientFlags::ISFLOATING)
    }
    pub fn set_floating(&mut self, v: bool) {
        self.flags.set(ClientFlags::ISFLOATING, v);
    }
    pub fn is_fixed(&self) -> bool {
        self.flags.contains(ClientFlags::ISFIXED)
    }
    pub fn is_urgent(&self) -> bool {
        self.flags.contains(ClientFlags::ISURGENT)
    }
    pub fn set_urgent(&mut self, v: bool) {
        self.flags.set(ClientFlags::ISURGENT, v);
    }
    pub fn never_focus(&self) -> bool {
        self.flags.contains(ClientFlags::NEVERFOCUS)
    }
    pub fn is_fullscreen(&self) -> bool {
        self.flags.contains(ClientFlags::ISFULLSCREEN)
    }
    pub fn set_fullscreen(&mut self, v: bool) {
        self.flags.set(ClientFlags::ISFULLSCREEN, v);
    }
    pub fn is_terminal(&self) -> bool {
        self.flags.contains(ClientFlags::ISTERMINAL)
    }
    pub fn no_swallow(&self) -> bool {
        self.flags.contains(ClientFlags::NOSWALLOW)
    }

    /// Whether this client is swallowing another window right now.
    pub fn is_swallowing(&self) -> bool {
        matches!(self.role, ClientRole::Swallower { .. })
    }

    /// Invariant 4, §8: visibility is purely a function of the tag overlap
    /// with whichever tagset slot the monitor currently shows.
    pub fn is_visible(&self, monitor_tagset: u32) -> bool {
        self.tags & monitor_tagset != 0
    }

    pub fn width_with_border(&self) -> i32 {
        self.rect.width_with_border(self.bw)
    }
    pub fn height_with_border(&self) -> i32 {
        self.rect.height_with_border(self.bw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn visibility_follows_tag_overlap() {
        let mut monitors: Arena<crate::monitor::Monitor> = Arena::new();
        let mon = monitors.insert(crate::monitor::Monitor::new(0, Rect::new(0, 0, 1920, 1080)));
        let c = Client::new(1, Rect::new(0, 0, 100, 100), 2, mon, 0b001);
        assert!(c.is_visible(0b001));
        assert!(!c.is_visible(0b010));
        assert!(c.is_visible(0b011));
    }

    #[test]
    fn is_fixed_flag_roundtrips() {
        let mut monitors: Arena<crate::monitor::Monitor> = Arena::new();
        let mon = monitors.insert(crate::monitor::Monitor::new(0, Rect::new(0, 0, 1920, 1080)));
        let mut c = Client::new(1, Rect::default(), 2, mon, 1);
        assert!(!c.is_fixed());
        c.flags.insert(ClientFlags::ISFIXED);
        assert!(c.is_fixed());
    }
}
