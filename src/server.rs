//! The server adapter: a thin abstraction over the window-server
//! connection (§2 component 2). The core only ever talks to `dyn XConn`;
//! `XlibConn` is the production implementation over the `x11` crate, and
//! `tests::MockConn` (in the `#[cfg(test)]` submodule) is a bookkeeping
//! stand-in used by model/dispatch tests that would otherwise need a live
//! display.

use std::ffi::CString;
use std::os::raw::{c_int, c_uint};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use lazy_static::lazy_static;
use libc::c_void;
use x11::xlib::{self, Display, XErrorEvent, XWindowAttributes};

use crate::client::XWindow;
use crate::events::{
    ButtonPress, ClientMessage, ConfigureNotify, ConfigureRequest, DestroyNotify, EnterNotify,
    Event, FocusIn, KeyPress, MapRequest, MotionNotify, PropertyNotify, UnmapNotify,
};
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowAttributes {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub border_width: i32,
    pub override_redirect: bool,
    pub viewable: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowChanges {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub border_width: i32,
    pub sibling: XWindow,
    pub stack_mode: i32,
}

/// The minimum surface the core needs from a window-server connection:
/// event polling, property get/set, configure/map/unmap, grabs, and
/// multi-monitor query. Everything else (drawing) is `render::Drawable`.
pub trait XConn {
    fn root(&self) -> XWindow;
    fn next_event(&self) -> Event;
    fn pending(&self) -> i32;
    fn sync(&self, discard: bool);

    fn get_window_attributes(&self, w: XWindow) -> Option<WindowAttributes>;
    fn select_input(&self, w: XWindow, mask: i64);
    fn configure_window(&self, w: XWindow, changes: WindowChanges, mask: u32);
    fn move_resize_window(&self, w: XWindow, r: Rect);
    fn resize_window(&self, w: XWindow, width: u32, height: u32);
    fn set_window_border(&self, w: XWindow, pixel: u64);
    fn set_window_border_width(&self, w: XWindow, width: u32);
    fn map_window(&self, w: XWindow);
    fn unmap_window(&self, w: XWindow);
    fn destroy_window(&self, w: XWindow);
    fn raise_window(&self, w: XWindow);
    fn restack_below_sibling(&self, w: XWindow, sibling: XWindow);
    fn reparent_window(&self, w: XWindow, parent: XWindow, x: i32, y: i32);
    fn add_to_save_set(&self, w: XWindow);
    fn remove_from_save_set(&self, w: XWindow);

    fn set_input_focus(&self, w: XWindow);
    fn grab_key(&self, keycode: i32, modifiers: u32, grab_window: XWindow);
    fn grab_button(&self, button: u32, modifiers: u32, grab_window: XWindow);
    fn ungrab_button(&self, grab_window: XWindow);
    fn grab_pointer(&self, grab_window: XWindow, event_mask: i64) -> bool;
    fn ungrab_pointer(&self);
    fn grab_server(&self);
    fn ungrab_server(&self);

    fn query_tree(&self, w: XWindow) -> Vec<XWindow>;
    fn get_transient_for(&self, w: XWindow) -> Option<XWindow>;
    fn get_class_hint(&self, w: XWindow) -> (String, String);
    fn get_wm_name(&self, w: XWindow) -> Option<String>;
    fn intern_atom(&self, name: &str) -> u64;
    fn get_atom_prop(&self, w: XWindow, atom: u64) -> Option<u64>;
    fn change_property_atom(&self, w: XWindow, prop: u64, atom_type: u64, values: &[u64]);
    fn delete_property(&self, w: XWindow, prop: u64);
    fn send_protocol_event(&self, w: XWindow, protocol_atom: u64, time: u64) -> bool;

    fn query_pointer(&self, w: XWindow) -> Option<(i32, i32, i32, i32)>;
    fn warp_pointer(&self, w: XWindow, x: i32, y: i32);

    fn query_monitors(&self) -> Vec<Rect>;
    fn screen_size(&self) -> (i32, i32);

    fn keysym_to_keycode(&self, keysym: u32) -> i32;
}

/// RAII scoped X error-handler override (Design Notes §9): installs the
/// "absorb known-benign races" handler on construction, restores whatever
/// handler was previously installed on drop — including across a panic
/// inside the guarded region.
pub struct ErrorGuard {
    display: *mut Display,
}

static XERROR_SAW_BADWINDOW_CLASS: AtomicBool = AtomicBool::new(false);

lazy_static! {
    static ref XERROR_LOG: Mutex<Vec<c_int>> = Mutex::new(Vec::new());
}

unsafe extern "C" fn xerror_dummy(_display: *mut Display, _event: *mut XErrorEvent) -> c_int {
    0
}

unsafe extern "C" fn xerror_soft(display: *mut Display, event: *mut XErrorEvent) -> c_int {
    let err = &*event;
    // BadWindow, BadMatch on SetInputFocus/ConfigureWindow, BadDrawable on
    // draw/copy, BadAccess on grabs: absorbed silently (§7).
    match err.error_code as c_int {
        xlib::BadWindow => {}
        xlib::BadMatch
            if err.request_code == xlib::X_SetInputFocus as u8
                || err.request_code == xlib::X_ConfigureWindow as u8 => {}
        xlib::BadDrawable
            if err.request_code == xlib::X_PolyText8 as u8
                || err.request_code == xlib::X_PolyFillRectangle as u8
                || err.request_code == xlib::X_CopyArea as u8 => {}
        xlib::BadAccess if err.request_code == xlib::X_GrabButton as u8 || err.request_code == xlib::X_GrabKey as u8 => {}
        code => {
            log::warn!("absorbed unexpected X error code {} (request {})", code, err.request_code);
            XERROR_LOG.lock().unwrap().push(code as c_int);
        }
    }
    let _ = display;
    0
}

impl ErrorGuard {
    pub fn install(display: *mut Display) -> Self {
        unsafe {
            xlib::XSync(display, xlib::False);
            xlib::XSetErrorHandler(Some(xerror_soft));
        }
        ErrorGuard { display }
    }
}

impl Drop for ErrorGuard {
    fn drop(&mut self) {
        unsafe {
            xlib::XSync(self.display, xlib::False);
            xlib::XSetErrorHandler(None);
        }
    }
}

/// Installed once at startup; if another WM is already running, setting
/// `SubstructureRedirectMask` on root triggers `BadAccess` synchronously.
pub unsafe extern "C" fn xerror_start(_display: *mut Display, event: *mut XErrorEvent) -> c_int {
    let err = &*event;
    if err.error_code == xlib::BadAccess {
        XERROR_SAW_BADWINDOW_CLASS.store(true, Ordering::SeqCst);
    }
    0
}

pub fn other_wm_detected() -> bool {
    XERROR_SAW_BADWINDOW_CLASS.load(Ordering::SeqCst)
}

pub struct XlibConn {
    display: *mut Display,
    root: XWindow,
    screen: c_int,
}

// The display pointer is only ever touched from the single-threaded main
// loop (§5); we never share it across real threads. Marking it Send lets
// it live inside the `Context` without an `Arc<Mutex<_>>` for something
// that is, by construction, never contended.
unsafe impl Send for XlibConn {}

impl XlibConn {
    pub fn open() -> Option<Self> {
        let display = unsafe { xlib::XOpenDisplay(std::ptr::null()) };
        if display.is_null() {
            return None;
        }
        let screen = unsafe { xlib::XDefaultScreen(display) };
        let root = unsafe { xlib::XRootWindow(display, screen) };
        Some(XlibConn { display, root, screen })
    }

    pub fn display(&self) -> *mut Display {
        self.display
    }

    /// Confirms an XCB sidecar connection is obtainable from the Xlib
    /// display, as the pid-ancestry machinery this port reimplements over
    /// `/proc` originally depended on.
    pub fn has_xcb_sidecar(&self) -> bool {
        let conn = unsafe { x11::xlib_xcb::XGetXCBConnection(self.display) };
        !conn.is_null()
    }
}

impl Drop for XlibConn {
    fn drop(&mut self) {
        unsafe {
            xlib::XCloseDisplay(self.display);
        }
    }
}

fn cstring(s: &str) -> CString {
    CString::new(s).unwrap_or_else(|_| CString::new("").unwrap())
}

impl XConn for XlibConn {
    fn root(&self) -> XWindow {
        self.root
    }

    fn next_event(&self) -> Event {
        let mut ev: xlib::XEvent = unsafe { std::mem::zeroed() };
        unsafe { xlib::XNextEvent(self.display, &mut ev) };
        translate_event(&ev)
    }

    fn pending(&self) -> i32 {
        unsafe { xlib::XPending(self.display) }
    }

    fn sync(&self, discard: bool) {
        unsafe { xlib::XSync(self.display, discard as c_int) };
    }

    fn get_window_attributes(&self, w: XWindow) -> Option<WindowAttributes> {
        let mut attrs: XWindowAttributes = unsafe { std::mem::zeroed() };
        let ok = unsafe { xlib::XGetWindowAttributes(self.display, w, &mut attrs) };
        if ok == 0 {
            return None;
        }
        Some(WindowAttributes {
            x: attrs.x,
            y: attrs.y,
            width: attrs.width,
            height: attrs.height,
            border_width: attrs.border_width,
            override_redirect: attrs.override_redirect != 0,
            viewable: attrs.map_state == xlib::IsViewable,
        })
    }

    fn select_input(&self, w: XWindow, mask: i64) {
        unsafe { xlib::XSelectInput(self.display, w, mask) };
    }

    fn configure_window(&self, w: XWindow, changes: WindowChanges, mask: u32) {
        let mut c = xlib::XWindowChanges {
            x: changes.x,
            y: changes.y,
            width: changes.width,
            height: changes.height,
            border_width: changes.border_width,
            sibling: changes.sibling,
            stack_mode: changes.stack_mode,
        };
        unsafe { xlib::XConfigureWindow(self.display, w, mask, &mut c) };
    }

    fn move_resize_window(&self, w: XWindow, r: Rect) {
        unsafe {
            xlib::XMoveResizeWindow(self.display, w, r.x, r.y, r.w.max(1) as c_uint, r.h.max(1) as c_uint)
        };
    }

    fn resize_window(&self, w: XWindow, width: u32, height: u32) {
        unsafe { xlib::XResizeWindow(self.display, w, width.max(1), height.max(1)) };
    }

    fn set_window_border(&self, w: XWindow, pixel: u64) {
        unsafe { xlib::XSetWindowBorder(self.display, w, pixel) };
    }

    fn set_window_border_width(&self, w: XWindow, width: u32) {
        let mut c: xlib::XWindowChanges = unsafe { std::mem::zeroed() };
        c.border_width = width as c_int;
        unsafe { xlib::XConfigureWindow(self.display, w, xlib::CWBorderWidth as u32, &mut c) };
    }

    fn map_window(&self, w: XWindow) {
        unsafe { xlib::XMapWindow(self.display, w) };
    }
    fn unmap_window(&self, w: XWindow) {
        unsafe { xlib::XUnmapWindow(self.display, w) };
    }
    fn destroy_window(&self, w: XWindow) {
        unsafe { xlib::XDestroyWindow(self.display, w) };
    }
    fn raise_window(&self, w: XWindow) {
        unsafe { xlib::XRaiseWindow(self.display, w) };
    }

    fn restack_below_sibling(&self, w: XWindow, sibling: XWindow) {
        let mut c = xlib::XWindowChanges {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            border_width: 0,
            sibling,
            stack_mode: xlib::Below,
        };
        unsafe {
            xlib::XConfigureWindow(
                self.display,
                w,
                (xlib::CWSibling | xlib::CWStackMode) as u32,
                &mut c,
            )
        };
    }

    fn reparent_window(&self, w: XWindow, parent: XWindow, x: i32, y: i32) {
        unsafe { xlib::XReparentWindow(self.display, w, parent, x, y) };
    }

    fn add_to_save_set(&self, w: XWindow) {
        unsafe { xlib::XAddToSaveSet(self.display, w) };
    }
    fn remove_from_save_set(&self, w: XWindow) {
        unsafe { xlib::XRemoveFromSaveSet(self.display, w) };
    }

    fn set_input_focus(&self, w: XWindow) {
        unsafe {
            xlib::XSetInputFocus(self.display, w, xlib::RevertToPointerRoot, xlib::CurrentTime)
        };
    }

    fn grab_key(&self, keycode: i32, modifiers: u32, grab_window: XWindow) {
        unsafe {
            xlib::XGrabKey(
                self.display,
                keycode,
                modifiers,
                grab_window,
                xlib::True,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
            );
        }
    }

    fn grab_button(&self, button: u32, modifiers: u32, grab_window: XWindow) {
        unsafe {
            xlib::XGrabButton(
                self.display,
                button,
                modifiers,
                grab_window,
                xlib::False,
                (xlib::ButtonPressMask | xlib::ButtonReleaseMask) as u32,
                xlib::GrabModeAsync,
                xlib::GrabModeSync,
                0,
                0,
            );
        }
    }

    fn ungrab_button(&self, grab_window: XWindow) {
        unsafe { xlib::XUngrabButton(self.display, xlib::AnyButton as u32, xlib::AnyModifier, grab_window) };
    }

    fn grab_pointer(&self, grab_window: XWindow, event_mask: i64) -> bool {
        let status = unsafe {
            xlib::XGrabPointer(
                self.display,
                grab_window,
                xlib::False,
                event_mask as u32,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
                0,
                0,
                xlib::CurrentTime,
            )
        };
        status == xlib::GrabSuccess
    }

    fn ungrab_pointer(&self) {
        unsafe { xlib::XUngrabPointer(self.display, xlib::CurrentTime) };
    }

    fn grab_server(&self) {
        unsafe { xlib::XGrabServer(self.display) };
    }
    fn ungrab_server(&self) {
        unsafe { xlib::XUngrabServer(self.display) };
    }

    fn query_tree(&self, w: XWindow) -> Vec<XWindow> {
        let mut root: XWindow = 0;
        let mut parent: XWindow = 0;
        let mut children: *mut XWindow = std::ptr::null_mut();
        let mut nchildren: c_uint = 0;
        let ok = unsafe {
            xlib::XQueryTree(self.display, w, &mut root, &mut parent, &mut children, &mut nchildren)
        };
        if ok == 0 || children.is_null() {
            return Vec::new();
        }
        let slice = unsafe { std::slice::from_raw_parts(children, nchildren as usize) };
        let result = slice.to_vec();
        unsafe { xlib::XFree(children as *mut c_void) };
        result
    }

    fn get_transient_for(&self, w: XWindow) -> Option<XWindow> {
        let mut transient: XWindow = 0;
        let ok = unsafe { xlib::XGetTransientForHint(self.display, w, &mut transient) };
        if ok != 0 && transient != 0 {
            Some(transient)
        } else {
            None
        }
    }

    fn get_class_hint(&self, w: XWindow) -> (String, String) {
        let mut hint: xlib::XClassHint = unsafe { std::mem::zeroed() };
        let ok = unsafe { xlib::XGetClassHint(self.display, w, &mut hint) };
        if ok == 0 {
            return (String::new(), String::new());
        }
        let class = unsafe { c_str_to_string(hint.res_class) };
        let instance = unsafe { c_str_to_string(hint.res_name) };
        unsafe {
            if !hint.res_class.is_null() {
                xlib::XFree(hint.res_class as *mut c_void);
            }
            if !hint.res_name.is_null() {
                xlib::XFree(hint.res_name as *mut c_void);
            }
        }
        (class, instance)
    }

    fn get_wm_name(&self, w: XWindow) -> Option<String> {
        let mut prop: xlib::XTextProperty = unsafe { std::mem::zeroed() };
        let ok = unsafe { xlib::XGetWMName(self.display, w, &mut prop) };
        if ok == 0 || prop.value.is_null() {
            return None;
        }
        let s = unsafe { c_str_to_string(prop.value as *mut i8) };
        unsafe { xlib::XFree(prop.value as *mut c_void) };
        Some(s)
    }

    fn intern_atom(&self, name: &str) -> u64 {
        let c = cstring(name);
        unsafe { xlib::XInternAtom(self.display, c.as_ptr(), xlib::False) }
    }

    fn get_atom_prop(&self, w: XWindow, atom: u64) -> Option<u64> {
        let mut actual_type: xlib::Atom = 0;
        let mut actual_format: c_int = 0;
        let mut nitems: libc::c_ulong = 0;
        let mut bytes_after: libc::c_ulong = 0;
        let mut data: *mut u8 = std::ptr::null_mut();
        let status = unsafe {
            xlib::XGetWindowProperty(
                self.display,
                w,
                atom,
                0,
                !0,
                xlib::False,
                xlib::XA_ATOM,
                &mut actual_type,
                &mut actual_format,
                &mut nitems,
                &mut bytes_after,
                &mut data,
            )
        };
        if status != 0 || data.is_null() || nitems == 0 {
            return None;
        }
        let value = unsafe { *(data as *mut xlib::Atom) };
        unsafe { xlib::XFree(data as *mut c_void) };
        Some(value)
    }

    fn change_property_atom(&self, w: XWindow, prop: u64, atom_type: u64, values: &[u64]) {
        let data: Vec<xlib::Atom> = values.to_vec();
        unsafe {
            xlib::XChangeProperty(
                self.display,
                w,
                prop,
                atom_type,
                32,
                xlib::PropModeReplace,
                data.as_ptr() as *const u8,
                data.len() as c_int,
            );
        }
    }

    fn delete_property(&self, w: XWindow, prop: u64) {
        unsafe { xlib::XDeleteProperty(self.display, w, prop) };
    }

    fn send_protocol_event(&self, w: XWindow, protocol_atom: u64, time: u64) -> bool {
        let mut exists = false;
        let mut protocols: *mut xlib::Atom = std::ptr::null_mut();
        let mut count: c_int = 0;
        unsafe {
            if xlib::XGetWMProtocols(self.display, w, &mut protocols, &mut count) != 0 {
                let slice = std::slice::from_raw_parts(protocols, count as usize);
                exists = slice.contains(&protocol_atom);
                xlib::XFree(protocols as *mut c_void);
            }
        }
        if !exists {
            return false;
        }
        let mut ev: xlib::XClientMessageEvent = unsafe { std::mem::zeroed() };
        ev.type_ = xlib::ClientMessage;
        ev.window = w;
        ev.message_type = unsafe { xlib::XInternAtom(self.display, cstring("WM_PROTOCOLS").as_ptr(), xlib::False) };
        ev.format = 32;
        ev.data.as_longs_mut()[0] = protocol_atom as i64;
        ev.data.as_longs_mut()[1] = time as i64;
        let mut generic: xlib::XEvent = ev.into();
        let sent = unsafe { xlib::XSendEvent(self.display, w, xlib::False, xlib::NoEventMask, &mut generic) };
        sent != 0
    }

    fn query_pointer(&self, w: XWindow) -> Option<(i32, i32, i32, i32)> {
        let mut root_ret: XWindow = 0;
        let mut child_ret: XWindow = 0;
        let (mut root_x, mut root_y, mut win_x, mut win_y) = (0, 0, 0, 0);
        let mut mask: c_uint = 0;
        let ok = unsafe {
            xlib::XQueryPointer(
                self.display,
                w,
                &mut root_ret,
                &mut child_ret,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            )
        };
        if ok == 0 {
            return None;
        }
        Some((root_x, root_y, win_x, win_y))
    }

    fn warp_pointer(&self, w: XWindow, x: i32, y: i32) {
        unsafe { xlib::XWarpPointer(self.display, 0, w, 0, 0, 0, 0, x, y) };
    }

    fn query_monitors(&self) -> Vec<Rect> {
        let mut count: c_int = 0;
        let infos = unsafe { x11::xinerama::XineramaQueryScreens(self.display, &mut count) };
        if infos.is_null() || count == 0 {
            let (w, h) = self.screen_size();
            return vec![Rect::new(0, 0, w, h)];
        }
        let slice = unsafe { std::slice::from_raw_parts(infos, count as usize) };
        let rects = slice
            .iter()
            .map(|s| Rect::new(s.x_org as i32, s.y_org as i32, s.width as i32, s.height as i32))
            .collect();
        unsafe { xlib::XFree(infos as *mut c_void) };
        rects
    }

    fn screen_size(&self) -> (i32, i32) {
        unsafe {
            (
                xlib::XDisplayWidth(self.display, self.screen),
                xlib::XDisplayHeight(self.display, self.screen),
            )
        }
    }

    fn keysym_to_keycode(&self, keysym: u32) -> i32 {
        unsafe { xlib::XKeysymToKeycode(self.display, keysym as u64) as i32 }
    }
}

unsafe fn c_str_to_string(ptr: *mut i8) -> String {
    if ptr.is_null() {
        return String::new();
    }
    std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

fn translate_event(ev: &xlib::XEvent) -> Event {
    unsafe {
        match ev.get_type() {
            xlib::ButtonPress => {
                let e = ev.button;
                Event::ButtonPress(ButtonPress {
                    window: e.window,
                    subwindow: e.subwindow,
                    root: e.root,
                    state: e.state,
                    button: e.button,
                    x_root: e.x_root,
                    y_root: e.y_root,
                    time: e.time as u64,
                })
            }
            xlib::KeyPress => {
                let e = ev.key;
                Event::KeyPress(KeyPress {
                    window: e.window,
                    state: e.state,
                    keycode: e.keycode,
                })
            }
            xlib::ConfigureRequest => {
                let e = ev.configure_request;
                Event::ConfigureRequest(ConfigureRequest {
                    window: e.window,
                    x: e.x,
                    y: e.y,
                    w: e.width,
                    h: e.height,
                    border_width: e.border_width,
                    value_mask: e.value_mask,
                    above: e.above,
                    detail: e.detail,
                })
            }
            xlib::ConfigureNotify => {
                let e = ev.configure;
                Event::ConfigureNotify(ConfigureNotify {
                    window: e.window,
                    width: e.width,
                    height: e.height,
                })
            }
            xlib::DestroyNotify => {
                let e = ev.destroy_window;
                Event::DestroyNotify(DestroyNotify { window: e.window })
            }
            xlib::EnterNotify => {
                let e = ev.crossing;
                Event::EnterNotify(EnterNotify {
                    window: e.window,
                    mode: e.mode,
                    detail: e.detail,
                })
            }
            xlib::Expose => Event::Expose(ev.expose.window),
            xlib::FocusIn => Event::FocusIn(FocusIn { window: ev.focus_change.window }),
            xlib::MappingNotify => Event::MappingNotify,
            xlib::MapRequest => Event::MapRequest(MapRequest { window: ev.map_request.window }),
            xlib::MotionNotify => {
                let e = ev.motion;
                Event::MotionNotify(MotionNotify {
                    window: e.window,
                    x_root: e.x_root,
                    y_root: e.y_root,
                    time: e.time as u64,
                })
            }
            xlib::PropertyNotify => {
                let e = ev.property;
                Event::PropertyNotify(PropertyNotify { window: e.window, atom: e.atom })
            }
            xlib::UnmapNotify => {
                let e = ev.unmap;
                Event::UnmapNotify(UnmapNotify {
                    window: e.window,
                    event: e.event,
                    send_event: e.send_event != 0,
                })
            }
            xlib::ClientMessage => {
                let e = ev.client_message;
                let data = e.data.as_longs();
                Event::ClientMessage(ClientMessage {
                    window: e.window,
                    message_type: e.message_type,
                    data: [data[0], data[1], data[2], data[3], data[4]],
                })
            }
            _ => Event::Other,
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// An in-memory stand-in for `XConn`, recording calls and serving
    /// a scripted queue of events, for dispatcher/model tests that don't
    /// need a live X server.
    pub struct MockConn {
        pub events: RefCell<VecDeque<Event>>,
        pub configured: RefCell<Vec<(XWindow, Rect)>>,
        pub mapped: RefCell<Vec<XWindow>>,
        pub focused: RefCell<Option<XWindow>>,
        pub monitors: Vec<Rect>,
    }

    impl MockConn {
        pub fn new(monitors: Vec<Rect>) -> Self {
            MockConn {
                events: RefCell::new(VecDeque::new()),
                configured: RefCell::new(Vec::new()),
                mapped: RefCell::new(Vec::new()),
                focused: RefCell::new(None),
                monitors,
            }
        }

        pub fn push_event(&self, ev: Event) {
            self.events.borrow_mut().push_back(ev);
        }
    }

    impl XConn for MockConn {
        fn root(&self) -> XWindow {
            1
        }
        fn next_event(&self) -> Event {
            self.events.borrow_mut().pop_front().unwrap_or(Event::Other)
        }
        fn pending(&self) -> i32 {
            self.events.borrow().len() as i32
        }
        fn sync(&self, _discard: bool) {}

        fn get_window_attributes(&self, _w: XWindow) -> Option<WindowAttributes> {
            Some(WindowAttributes {
                viewable: true,
                ..Default::default()
            })
        }
        fn select_input(&self, _w: XWindow, _mask: i64) {}
        fn configure_window(&self, _w: XWindow, _changes: WindowChanges, _mask: u32) {}
        fn move_resize_window(&self, w: XWindow, r: Rect) {
            self.configured.borrow_mut().push((w, r));
        }
        fn resize_window(&self, _w: XWindow, _width: u32, _height: u32) {}
        fn set_window_border(&self, _w: XWindow, _pixel: u64) {}
        fn set_window_border_width(&self, _w: XWindow, _width: u32) {}
        fn map_window(&self, w: XWindow) {
            self.mapped.borrow_mut().push(w);
        }
        fn unmap_window(&self, w: XWindow) {
            self.mapped.borrow_mut().retain(|&x| x != w);
        }
        fn destroy_window(&self, _w: XWindow) {}
        fn raise_window(&self, _w: XWindow) {}
        fn restack_below_sibling(&self, _w: XWindow, _sibling: XWindow) {}
        fn reparent_window(&self, _w: XWindow, _parent: XWindow, _x: i32, _y: i32) {}
        fn add_to_save_set(&self, _w: XWindow) {}
        fn remove_from_save_set(&self, _w: XWindow) {}

        fn set_input_focus(&self, w: XWindow) {
            *self.focused.borrow_mut() = Some(w);
        }
        fn grab_key(&self, _keycode: i32, _modifiers: u32, _grab_window: XWindow) {}
        fn grab_button(&self, _button: u32, _modifiers: u32, _grab_window: XWindow) {}
        fn ungrab_button(&self, _grab_window: XWindow) {}
        fn grab_pointer(&self, _grab_window: XWindow, _event_mask: i64) -> bool {
            true
        }
        fn ungrab_pointer(&self) {}
        fn grab_server(&self) {}
        fn ungrab_server(&self) {}

        fn query_tree(&self, _w: XWindow) -> Vec<XWindow> {
            Vec::new()
        }
        fn get_transient_for(&self, _w: XWindow) -> Option<XWindow> {
            None
        }
        fn get_class_hint(&self, _w: XWindow) -> (String, String) {
            (String::new(), String::new())
        }
        fn get_wm_name(&self, _w: XWindow) -> Option<String> {
            None
        }
        fn intern_atom(&self, _name: &str) -> u64 {
            0
        }
        fn get_atom_prop(&self, _w: XWindow, _atom: u64) -> Option<u64> {
            None
        }
        fn change_property_atom(&self, _w: XWindow, _prop: u64, _atom_type: u64, _values: &[u64]) {}
        fn delete_property(&self, _w: XWindow, _prop: u64) {}
        fn send_protocol_event(&self, _w: XWindow, _protocol_atom: u64, _time: u64) -> bool {
            false
        }

        fn query_pointer(&self, _w: XWindow) -> Option<(i32, i32, i32, i32)> {
            None
        }
        fn warp_pointer(&self, _w: XWindow, _x: i32, _y: i32) {}

        fn query_monitors(&self) -> Vec<Rect> {
            self.monitors.clone()
        }
        fn screen_size(&self) -> (i32, i32) {
            (1920, 1080)
        }
        fn keysym_to_keycode(&self, keysym: u32) -> i32 {
            keysym as i32
        }
    }

    #[test]
    fn mock_conn_records_move_resize() {
        let conn = MockConn::new(vec![Rect::new(0, 0, 1920, 1080)]);
        conn.move_resize_window(5, Rect::new(1, 2, 3, 4));
        assert_eq!(conn.configured.borrow()[0], (5, Rect::new(1, 2, 3, 4)));
    }

    #[test]
    fn mock_conn_drains_scripted_events_in_order() {
        let conn = MockConn::new(vec![]);
        conn.push_event(Event::MappingNotify);
        conn.push_event(Event::Expose(1));
        assert!(matches!(conn.next_event(), Event::MappingNotify));
        assert!(matches!(conn.next_event(), Event::Expose(1)));
        assert!(matches!(conn.next_event(), Event::Other));
    }
}
