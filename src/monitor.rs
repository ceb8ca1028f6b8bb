//! The monitor model: client/focus ordering as plain `Vec<ClientId>` rather
//! than intrusive chains, and per-tag sticky state as a fixed-size array
//! (Design Notes §9) instead of a dynamically allocated Pertag list.

use crate::arena::Id;
use crate::client::ClientId;
use crate::config;
use crate::geometry::Rect;

pub type MonitorId = Id<Monitor>;
pub type XWindow = x11::xlib::Window;

pub const TAGMASK: u32 = (1u32 << config::NTAGS) - 1;

/// The six fields the original `Pertag` record remembers per tag so that
/// switching tags restores whatever layout/master/bar settings were last
/// used there.
#[derive(Debug, Clone, Copy)]
pub struct PerTagState {
    pub nmaster: i32,
    pub mfact: f64,
    pub sellt: usize,
    pub lt: [usize; 2],
    pub showbar: bool,
}

impl Default for PerTagState {
    fn default() -> Self {
        PerTagState {
            nmaster: config::NMASTER,
            mfact: config::MFACT,
            sellt: 0,
            lt: [config::DEFAULT_LAYOUT, 1.min(config::LAYOUTS.len() - 1)],
            showbar: config::SHOWBAR,
        }
    }
}

pub struct Monitor {
    pub num: i32,
    /// Screen rectangle: the monitor's full extent.
    pub screen: Rect,
    /// Work area: screen minus bar/tab-bar reservations.
    pub work_area: Rect,
    pub gap_inner: i32,
    pub gap_outer: i32,
    pub sellt: usize,
    pub lt: [usize; 2],
    pub seltags: usize,
    pub tagset: [u32; 2],
    pub mfact: f64,
    pub nmaster: i32,
    pub showbar: bool,
    pub topbar: bool,
    pub bar_win: Option<XWindow>,
    pub tab_win: Option<XWindow>,
    pub clients: Vec<ClientId>,
    pub stack: Vec<ClientId>,
    pub sel: Option<ClientId>,
    /// Index 0 is the "all tags" slot; indices `1..=NTAGS` are per-tag.
    pub pertag: Vec<PerTagState>,
    pub curtag: usize,
    pub prevtag: usize,
}

impl Monitor {
    pub fn new(num: i32, screen: Rect) -> Self {
        Monitor {
            num,
            screen,
            work_area: screen,
            gap_inner: config::GAP_INNER,
            gap_outer: config::GAP_OUTER,
            sellt: 0,
            lt: [config::DEFAULT_LAYOUT, 1.min(config::LAYOUTS.len() - 1)],
            seltags: 0,
            tagset: [1, 1],
            mfact: config::MFACT,
            nmaster: config::NMASTER,
            showbar: config::SHOWBAR,
            topbar: config::TOPBAR,
            bar_win: None,
            tab_win: None,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
            pertag: vec![PerTagState::default(); config::NTAGS + 1],
            curtag: 1,
            prevtag: 1,
        }
    }

    pub fn active_tagset(&self) -> u32 {
        self.tagset[self.seltags]
    }

    pub fn current_layout(&self) -> &'static config::LayoutEntry {
        &config::LAYOUTS[self.lt[self.sellt]]
    }

    pub fn is_floating_layout(&self) -> bool {
        self.current_layout().arrange.is_none()
    }

    pub fn detach(&mut self, id: ClientId) {
        self.clients.retain(|&c| c != id);
    }

    pub fn detach_stack(&mut self, id: ClientId) {
        self.stack.retain(|&c| c != id);
        if self.sel == Some(id) {
            self.sel = self.stack.first().copied();
        }
    }

    pub fn attach(&mut self, id: ClientId) {
        self.clients.insert(0, id);
    }

    pub fn attach_stack(&mut self, id: ClientId) {
        self.stack.insert(0, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_client_id(mons: &mut crate::arena::Arena<Monitor>) -> (MonitorId, crate::arena::Arena<crate::client::Client>, ClientId) {
        let mon_id = mons.insert(Monitor::new(0, Rect::default()));
        let mut clients: crate::arena::Arena<crate::client::Client> = crate::arena::Arena::new();
        let a = clients.insert(crate::client::Client::new(1, Rect::default(), 2, mon_id, 1));
        (mon_id, clients, a)
    }

    #[test]
    fn attach_puts_client_at_head() {
        let mut mons: crate::arena::Arena<Monitor> = crate::arena::Arena::new();
        let (_, _clients, a) = fixture_client_id(&mut mons);
        let mut m = Monitor::new(0, Rect::new(0, 0, 1920, 1080));
        m.attach(a);
        assert_eq!(m.clients[0], a);
    }

    #[test]
    fn detach_removes_and_clears_sel() {
        let mut mons: crate::arena::Arena<Monitor> = crate::arena::Arena::new();
        let (_, _clients, a) = fixture_client_id(&mut mons);
        let mut m = Monitor::new(0, Rect::new(0, 0, 1920, 1080));
        m.attach_stack(a);
        m.sel = Some(a);
        m.detach_stack(a);
        assert!(m.sel.is_none());
        assert!(m.stack.is_empty());
    }

    #[test]
    fn tagmask_matches_tag_count() {
        assert_eq!(TAGMASK, (1u32 << config::NTAGS) - 1);
    }
}
