//! Rule matching: applied once at `manage` time to decide a new client's
//! initial tags/floating/terminal/monitor, grounded on `applyrules` in
//! `original_source/src/dynamd.c` and the static table in `config.rs`.

use crate::arena::Arena;
use crate::client::Client;
use crate::config::{self, Rule};
use crate::monitor::{Monitor, MonitorId, TAGMASK};

/// Window class/instance/title as read from WM_CLASS/title properties at
/// manage time; owned strings because the server adapter hands back copies.
pub struct WindowIdentity {
    pub class: String,
    pub instance: String,
    pub title: String,
}

fn rule_matches(rule: &Rule, id: &WindowIdentity) -> bool {
    rule.class.map_or(true, |c| id.class.contains(c))
        && rule.instance.map_or(true, |i| id.instance.contains(i))
        && rule.title.map_or(true, |t| id.title.contains(t))
}

/// Mutates `client` per the static rule table, then falls back to the
/// current monitor's active tagset if no rule (or only zero-tag rules)
/// applied. Returns the monitor a `monitor >= 0` rule asked to reassign to,
/// if any such monitor exists in `monitors`.
pub fn apply_rules(
    client: &mut Client,
    id: &WindowIdentity,
    monitors: &Arena<Monitor>,
    current_mon: MonitorId,
) -> Option<MonitorId> {
    client.set_floating(false);
    client.tags = 0;

    let mut reassign = None;
    for rule in config::RULES {
        if !rule_matches(rule, id) {
            continue;
        }
        client.flags.set(crate::client::ClientFlags::ISTERMINAL, rule.is_terminal);
        client.flags.set(crate::client::ClientFlags::NOSWALLOW, rule.no_swallow);
        if rule.is_floating {
            client.set_floating(true);
        }
        client.tags |= rule.tags;

        if rule.monitor >= 0 {
            if let Some((id, _)) = monitors.iter().find(|(_, m)| m.num == rule.monitor) {
                reassign = Some(id);
            }
        }
    }

    if client.tags & TAGMASK == 0 {
        if let Some(m) = monitors.get(current_mon) {
            client.tags = m.active_tagset();
        }
    }

    log::debug!(
        "apply_rules: class={:?} instance={:?} title={:?} -> tags={:#b} floating={} reassign={:?}",
        id.class,
        id.instance,
        id.title,
        client.tags,
        client.is_floating(),
        reassign
    );

    reassign
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn ident(class: &str, title: &str) -> WindowIdentity {
        WindowIdentity {
            class: class.to_string(),
            instance: String::new(),
            title: title.to_string(),
        }
    }

    #[test]
    fn terminal_class_rule_sets_isterminal() {
        let mut monitors: Arena<Monitor> = Arena::new();
        let mon = monitors.insert(Monitor::new(0, Rect::new(0, 0, 1920, 1080)));
        let mut c = Client::new(1, Rect::default(), 2, mon, 0);
        apply_rules(&mut c, &ident("Alacritty", ""), &monitors, mon);
        assert!(c.is_terminal());
        assert!(!c.is_floating());
    }

    #[test]
    fn title_rule_sets_noswallow() {
        let mut monitors: Arena<Monitor> = Arena::new();
        let mon = monitors.insert(Monitor::new(0, Rect::new(0, 0, 1920, 1080)));
        let mut c = Client::new(1, Rect::default(), 2, mon, 0);
        apply_rules(&mut c, &ident("whatever", "Event Tester"), &monitors, mon);
        assert!(c.no_swallow());
    }

    #[test]
    fn unmatched_window_inherits_current_tagset() {
        let mut monitors: Arena<Monitor> = Arena::new();
        let mon = monitors.insert(Monitor::new(0, Rect::new(0, 0, 1920, 1080)));
        monitors.get_mut(mon).unwrap().tagset[0] = 0b0100;
        let mut c = Client::new(1, Rect::default(), 2, mon, 0);
        apply_rules(&mut c, &ident("Nothing", "Nothing"), &monitors, mon);
        assert_eq!(c.tags, 0b0100);
    }
}
