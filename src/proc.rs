//! PID ancestry via `/proc/<pid>/stat`, used by the swallow engine's
//! `termforwin` to decide whether a terminal's process tree launched a new
//! window's owning process. A read failure is "no ancestor" (§7), not an
//! error — swallow is simply disabled for that pair.

use std::fs;

/// Parses the parent pid out of `/proc/<pid>/stat`. The `comm` field (2nd,
/// parenthesized) may itself contain spaces or parentheses, so the parse
/// anchors off the *last* `)` rather than splitting naively on whitespace.
pub fn parent_pid(pid: i32) -> Option<i32> {
    let contents = fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
    let close_paren = contents.rfind(')')?;
    let rest = contents.get(close_paren + 2..)?; // skip ") "
    let mut fields = rest.split_whitespace();
    fields.next()?; // state
    fields.next()?.parse::<i32>().ok()
}

/// Walks ancestry from `pid` up to and including the root, stopping when a
/// parent read fails (treated as "no further ancestor").
pub fn is_descendant_of(mut pid: i32, ancestor: i32) -> bool {
    if pid == ancestor {
        return true;
    }
    let mut guard = 0;
    while guard < 4096 {
        match parent_pid(pid) {
            Some(p) if p == ancestor => return true,
            Some(p) if p == pid || p <= 1 => return false,
            Some(p) => pid = p,
            None => return false,
        }
        guard += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_is_trivially_descendant_of_self() {
        assert!(is_descendant_of(1234, 1234));
    }

    #[test]
    fn nonexistent_pid_has_no_ancestor() {
        // PID 0 is never a real process; /proc/0/stat does not exist.
        assert_eq!(parent_pid(0), None);
        assert!(!is_descendant_of(0, 1));
    }

    #[test]
    fn real_current_process_has_a_nonnegative_parent() {
        let pid = std::process::id() as i32;
        if let Some(ppid) = parent_pid(pid) {
            assert!(ppid >= 0);
        }
    }
}
