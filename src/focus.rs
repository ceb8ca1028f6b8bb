//! Focus and restack (§4.4). Grounded on `focus`/`unfocus`/`restack`/
//! `setfocus`/`sendevent` in `original_source/src/dynamd.c`, replacing the
//! `next`/`snext` chain walks with plain `Vec<ClientId>` operations on
//! `Monitor::stack`/`Monitor::clients`.

use crate::atoms::{NetAtoms, WmAtoms};
use crate::arena::Arena;
use crate::client::{Client, ClientId};
use crate::monitor::{Monitor, MonitorId};
use crate::server::XConn;

/// Sends `WM_TAKE_FOCUS` if the client advertises it, then always calls
/// `XSetInputFocus` directly — dwm does both unconditionally so that
/// ICCCM-polite and ICCCM-indifferent clients both end up focused.
pub fn setfocus(conn: &dyn XConn, atoms: &WmAtoms, net: &NetAtoms, client: &Client) {
    if !client.never_focus() {
        conn.set_input_focus(client.window);
        conn.change_property_atom(conn.root(), net.active_window, x11::xlib::XA_WINDOW, &[client.window]);
    }
    conn.send_protocol_event(client.window, atoms.take_focus, 0);
}

/// Reverts focus to the root window and clears `_NET_ACTIVE_WINDOW`
/// (§4.4 edge case: no visible client on any monitor).
pub fn focus_root(conn: &dyn XConn, net: &NetAtoms) {
    conn.set_input_focus(conn.root());
    conn.delete_property(conn.root(), net.active_window);
}

/// Strips the selected border scheme from `client` and, if `set_root`,
/// reverts focus to the root window. Mirrors dwm's `unfocus`.
pub fn unfocus(conn: &dyn XConn, client: &Client, set_root: bool, net: &NetAtoms, unfocused_border: u64) {
    conn.set_window_border(client.window, unfocused_border);
    log::debug!("unfocus: window {} unfocused (set_root={})", client.window, set_root);
    if set_root {
        focus_root(conn, net);
    }
}

/// Selects `target` (or, if `None`, the head of the active monitor's
/// stack restricted to visible clients) as the new focus: unfocuses the
/// previous selection if it differs, moves `target` to the front of
/// `stack`, clears its urgency, paints the selected-scheme border, and
/// calls `setfocus`.
///
/// Returns the id that ended up focused, if any.
pub fn focus(
    conn: &dyn XConn,
    clients: &mut Arena<Client>,
    monitors: &mut Arena<Monitor>,
    atoms: &WmAtoms,
    net: &NetAtoms,
    mon: MonitorId,
    target: Option<ClientId>,
    selected_border: u64,
    unfocused_border: u64,
) -> Option<ClientId> {
    let tagset = monitors.get(mon)?.active_tagset();

    let target = target.or_else(|| {
        monitors.get(mon)?.stack.iter().copied().find(|&id| {
            clients.get(id).map_or(false, |c| c.is_visible(tagset))
        })
    });

    let previous = monitors.get(mon)?.sel;
    if previous != target {
        if let Some(prev_id) = previous {
            if let Some(prev) = clients.get(prev_id) {
                unfocus(conn, prev, false, net, unfocused_border);
            }
        }
    }

    if let Some(id) = target {
        let m = monitors.get_mut(mon)?;
        m.stack.retain(|&c| c != id);
        m.stack.insert(0, id);
        m.sel = Some(id);

        if let Some(c) = clients.get_mut(id) {
            c.set_urgent(false);
        }
        if let Some(c) = clients.get(id) {
            conn.set_window_border(c.window, selected_border);
            setfocus(conn, atoms, net, c);
            log::debug!("focus: monitor {:?} focused {:?} (window {})", mon, id, c.window);
        }
    } else {
        monitors.get_mut(mon)?.sel = None;
        focus_root(conn, net);
        log::debug!("focus: monitor {:?} has no visible client, reverted to root", mon);
    }

    target
}

/// Raises the floating/fullscreen selected client above the tiled stack
/// and keeps the bar/tab-bar above everything else (§4.4's restack note).
pub fn restack(conn: &dyn XConn, clients: &Arena<Client>, monitors: &Arena<Monitor>, mon: MonitorId) {
    let m = match monitors.get(mon) {
        Some(m) => m,
        None => return,
    };

    if let Some(bar) = m.bar_win {
        conn.raise_window(bar);
    }

    let sel = match m.sel.and_then(|id| clients.get(id)) {
        Some(c) => c,
        None => return,
    };
    if sel.is_floating() || m.is_floating_layout() {
        conn.raise_window(sel.window);
    }

    if !m.is_floating_layout() {
        let mut above = m.bar_win.unwrap_or(sel.window);
        for &id in m.stack.iter().rev() {
            if let Some(c) = clients.get(id) {
                if c.is_visible(m.active_tagset()) && !c.is_floating() {
                    conn.restack_below_sibling(c.window, above);
                    above = c.window;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::server::tests::MockConn;

    fn atoms_fixture() -> (WmAtoms, NetAtoms) {
        (
            WmAtoms { protocols: 1, delete_window: 2, state: 3, take_focus: 4 },
            NetAtoms {
                supported: 10,
                wm_name: 11,
                wm_state: 12,
                supporting_wm_check: 13,
                wm_state_fullscreen: 14,
                active_window: 15,
                wm_window_type: 16,
                wm_window_type_dialog: 17,
                client_list: 18,
            },
        )
    }

    #[test]
    fn focus_moves_target_to_stack_head_and_sets_sel() {
        let conn = MockConn::new(vec![Rect::new(0, 0, 1920, 1080)]);
        let (wm_atoms, net_atoms) = atoms_fixture();
        let mut monitors: Arena<Monitor> = Arena::new();
        let mon = monitors.insert(Monitor::new(0, Rect::new(0, 0, 1920, 1080)));
        let mut clients: Arena<Client> = Arena::new();
        let a = clients.insert(Client::new(10, Rect::default(), 2, mon, 1));
        let b = clients.insert(Client::new(20, Rect::default(), 2, mon, 1));
        {
            let m = monitors.get_mut(mon).unwrap();
            m.attach(a);
            m.attach(b);
            m.attach_stack(b);
            m.attach_stack(a);
        }

        let focused = focus(&conn, &mut clients, &mut monitors, &wm_atoms, &net_atoms, mon, Some(b), 0xff0000, 0x000000);
        assert_eq!(focused, Some(b));
        assert_eq!(monitors.get(mon).unwrap().sel, Some(b));
        assert_eq!(monitors.get(mon).unwrap().stack[0], b);
        assert_eq!(*conn.focused.borrow(), Some(20));
    }

    #[test]
    fn focus_with_no_visible_clients_reverts_to_root() {
        let conn = MockConn::new(vec![Rect::new(0, 0, 1920, 1080)]);
        let (wm_atoms, net_atoms) = atoms_fixture();
        let mut monitors: Arena<Monitor> = Arena::new();
        let mon = monitors.insert(Monitor::new(0, Rect::new(0, 0, 1920, 1080)));
        let mut clients: Arena<Client> = Arena::new();

        let focused = focus(&conn, &mut clients, &mut monitors, &wm_atoms, &net_atoms, mon, None, 0xff0000, 0x000000);
        assert_eq!(focused, None);
        assert_eq!(*conn.focused.borrow(), Some(conn.root()));
    }
}
