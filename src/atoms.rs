//! The EWMH/ICCCM atom set the manager advertises and watches (§6). Atoms
//! are interned once at `Context` construction and held as a plain cache —
//! there is no further atom traffic after setup.

use x11::xlib::{Atom, Display};

#[derive(Debug, Clone, Copy)]
pub struct WmAtoms {
    pub protocols: Atom,
    pub delete_window: Atom,
    pub state: Atom,
    pub take_focus: Atom,
}

#[derive(Debug, Clone, Copy)]
pub struct NetAtoms {
    pub supported: Atom,
    pub wm_name: Atom,
    pub wm_state: Atom,
    pub supporting_wm_check: Atom,
    pub wm_state_fullscreen: Atom,
    pub active_window: Atom,
    pub wm_window_type: Atom,
    pub wm_window_type_dialog: Atom,
    pub client_list: Atom,
}

impl NetAtoms {
    /// The `_NET_SUPPORTED` payload, in the fixed order §6 lists them.
    pub fn supported_list(&self) -> [Atom; 9] {
        [
            self.supported,
            self.wm_name,
            self.wm_state,
            self.supporting_wm_check,
            self.wm_state_fullscreen,
            self.active_window,
            self.wm_window_type,
            self.wm_window_type_dialog,
            self.client_list,
        ]
    }
}

fn intern(display: *mut Display, name: &str) -> Atom {
    use std::ffi::CString;
    let c_name = CString::new(name).expect("atom name has no interior NUL");
    unsafe { x11::xlib::XInternAtom(display, c_name.as_ptr(), 0) }
}

impl WmAtoms {
    pub fn intern(display: *mut Display) -> Self {
        WmAtoms {
            protocols: intern(display, "WM_PROTOCOLS"),
            delete_window: intern(display, "WM_DELETE_WINDOW"),
            state: intern(display, "WM_STATE"),
            take_focus: intern(display, "WM_TAKE_FOCUS"),
        }
    }
}

impl NetAtoms {
    pub fn intern(display: *mut Display) -> Self {
        NetAtoms {
            supported: intern(display, "_NET_SUPPORTED"),
            wm_name: intern(display, "_NET_WM_NAME"),
            wm_state: intern(display, "_NET_WM_STATE"),
            supporting_wm_check: intern(display, "_NET_SUPPORTING_WM_CHECK"),
            wm_state_fullscreen: intern(display, "_NET_WM_STATE_FULLSCREEN"),
            active_window: intern(display, "_NET_ACTIVE_WINDOW"),
            wm_window_type: intern(display, "_NET_WM_WINDOW_TYPE"),
            wm_window_type_dialog: intern(display, "_NET_WM_WINDOW_TYPE_DIALOG"),
            client_list: intern(display, "_NET_CLIENT_LIST"),
        }
    }
}
