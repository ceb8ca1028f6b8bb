//! The swallow mechanism: substituting a terminal's window for a child
//! process it spawned, and reversing that substitution when the child
//! exits. Grounded on `swallow`/`unswallow`/`termforwin`/`swallowingclient`
//! in `original_source/src/dynamd.c`.

use crate::arena::Arena;
use crate::client::{Client, ClientFlags, ClientId, ClientRole, SwallowedSnapshot};
use crate::proc;

/// Finds a managed, not-already-swallowing terminal whose process is an
/// ancestor of `child_pid`. §4.8 step 1.
pub fn termforwin(clients: &Arena<Client>, child_pid: i32) -> Option<ClientId> {
    if child_pid <= 0 {
        return None;
    }
    clients
        .iter()
        .find(|(_, c)| {
            c.is_terminal() && !c.is_swallowing() && c.pid != 0 && proc::is_descendant_of(child_pid, c.pid)
        })
        .map(|(id, _)| id)
}

/// The preserved behavior for the ported conditional's dead `&& !1 &&`
/// branch (Design Notes §9, Open Questions): skip swallow only when the
/// child itself is marked `noswallow` or `isterminal`.
fn should_refuse_swallow(child: &Client) -> bool {
    child.no_swallow() || child.is_terminal()
}

/// Substitutes `child`'s window into `terminal`'s slot. The terminal's
/// former identity is captured in `ClientRole::Swallower` so `unswallow`
/// can restore it exactly (invariant 6, §8 property 7).
///
/// `child` is expected to have already been removed from its monitor's
/// `clients`/`stack` by the caller (`manager::manage`), since after
/// swallowing it has no independent slot: the terminal's client record
/// now simply wears the child's window.
pub fn swallow(
    clients: &mut Arena<Client>,
    terminal: ClientId,
    child: ClientId,
    child_record: Client,
) -> Result<(), Client> {
    if should_refuse_swallow(&child_record) {
        return Err(child_record);
    }

    let term = match clients.get_mut(terminal) {
        Some(t) => t,
        None => return Err(child_record),
    };

    let snapshot = SwallowedSnapshot {
        window: term.window,
        rect: term.rect,
        bw: term.bw,
        flags: term.flags,
    };

    let original_window = snapshot.window;
    let new_window = child_record.window;

    term.window = child_record.window;
    term.rect = child_record.rect;
    term.bw = child_record.bw;
    term.hints = child_record.hints;
    term.pid = child_record.pid;
    term.role = ClientRole::Swallower {
        original: snapshot,
        concealed: child,
    };
    log::debug!(
        "swallow: terminal {:?} (formerly window {}) now wears window {}",
        terminal,
        original_window,
        new_window
    );
    Ok(())
}

/// Restores the swallowed child's original window/geometry/flags into a
/// fresh client record and clears the swallower's role, returning that
/// record so the caller can re-attach it to the monitor's lists.
pub fn unswallow(clients: &mut Arena<Client>, swallower: ClientId) -> Option<Client> {
    let client = clients.get_mut(swallower)?;
    let (original, _concealed) = match std::mem::replace(&mut client.role, ClientRole::Plain) {
        ClientRole::Swallower { original, concealed } => (original, concealed),
        ClientRole::Plain => return None,
    };

    let mut restored = client.clone();
    restored.window = original.window;
    restored.rect = original.rect;
    restored.bw = original.bw;
    restored.flags = original.flags;
    restored.flags.remove(ClientFlags::ISFULLSCREEN);
    log::debug!("unswallow: swallower {:?} restored to window {}", swallower, restored.window);
    Some(restored)
}

/// Scans for a client whose swallow snapshot's window equals `window`,
/// letting destruction of the *hidden* original window still clean up the
/// link (§4.8 step 4).
pub fn swallowingclient(clients: &Arena<Client>, window: crate::client::XWindow) -> Option<ClientId> {
    clients
        .iter()
        .find(|(_, c)| matches!(&c.role, ClientRole::Swallower { original, .. } if original.window == window))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::geometry::Rect;
    use crate::monitor::Monitor;

    fn fixture() -> (Arena<Monitor>, crate::monitor::MonitorId) {
        let mut monitors: Arena<Monitor> = Arena::new();
        let mon = monitors.insert(Monitor::new(0, Rect::new(0, 0, 1920, 1080)));
        (monitors, mon)
    }

    #[test]
    fn swallow_then_unswallow_restores_original_window_exactly() {
        let (_, mon) = fixture();
        let mut clients: Arena<Client> = Arena::new();
        let mut term = Client::new(100, Rect::new(0, 0, 800, 600), 2, mon, 1);
        term.flags.insert(ClientFlags::ISTERMINAL);
        term.pid = 10;
        let term_window = term.window;
        let term_rect = term.rect;
        let term_id = clients.insert(term);

        let child = Client::new(200, Rect::new(10, 10, 400, 300), 2, mon, 1);
        let child_window = child.window;
        let child_id = clients.insert(child.clone());
        clients.remove(child_id);

        swallow(&mut clients, term_id, child_id, child).unwrap();
        assert_eq!(clients.get(term_id).unwrap().window, child_window);
        assert!(clients.get(term_id).unwrap().is_swallowing());

        let restored = unswallow(&mut clients, term_id).unwrap();
        assert_eq!(restored.window, term_window);
        assert_eq!(restored.rect, term_rect);
        assert!(!clients.get(term_id).unwrap().is_swallowing());
    }

    #[test]
    fn refuses_swallow_when_child_is_noswallow() {
        let (_, mon) = fixture();
        let mut clients: Arena<Client> = Arena::new();
        let term = Client::new(100, Rect::default(), 2, mon, 1);
        let term_id = clients.insert(term);
        let mut child = Client::new(200, Rect::default(), 2, mon, 1);
        child.flags.insert(ClientFlags::NOSWALLOW);
        let result = swallow(&mut clients, term_id, term_id, child);
        assert!(result.is_err());
    }

    #[test]
    fn termforwin_requires_ancestry() {
        let (_, mon) = fixture();
        let mut clients: Arena<Client> = Arena::new();
        let mut term = Client::new(100, Rect::default(), 2, mon, 1);
        term.flags.insert(ClientFlags::ISTERMINAL);
        term.pid = std::process::id() as i32;
        clients.insert(term);
        // A pid unrelated to this process should not match.
        assert_eq!(termforwin(&clients, 999_999), None);
    }
}
