//! The event dispatcher's tagged variant (Design Notes §9: "a dispatch
//! match over a tagged event variant"), plus `manager::run`'s match over it.
//! Handler bodies live in `manager.rs` next to the model they mutate;
//! keeping the translation here keeps `server.rs` ignorant of WM policy.

use crate::client::XWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateOp {
    Remove = 0,
    Add = 1,
    Toggle = 2,
}

impl StateOp {
    pub fn from_code(code: i64) -> Option<StateOp> {
        match code {
            0 => Some(StateOp::Remove),
            1 => Some(StateOp::Add),
            2 => Some(StateOp::Toggle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ButtonPress {
    pub window: XWindow,
    pub subwindow: XWindow,
    pub root: XWindow,
    pub state: u32,
    pub button: u32,
    pub x_root: i32,
    pub y_root: i32,
    pub time: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct KeyPress {
    pub window: XWindow,
    pub state: u32,
    pub keycode: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigureRequest {
    pub window: XWindow,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub border_width: i32,
    pub value_mask: u64,
    pub above: XWindow,
    pub detail: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigureNotify {
    pub window: XWindow,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct DestroyNotify {
    pub window: XWindow,
}

#[derive(Debug, Clone, Copy)]
pub struct UnmapNotify {
    pub window: XWindow,
    pub event: XWindow,
    pub send_event: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct EnterNotify {
    pub window: XWindow,
    pub mode: i32,
    pub detail: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct MapRequest {
    pub window: XWindow,
}

#[derive(Debug, Clone, Copy)]
pub struct MotionNotify {
    pub window: XWindow,
    pub x_root: i32,
    pub y_root: i32,
    pub time: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct PropertyNotify {
    pub window: XWindow,
    pub atom: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct ClientMessage {
    pub window: XWindow,
    pub message_type: u64,
    pub data: [i64; 5],
}

#[derive(Debug, Clone, Copy)]
pub struct FocusIn {
    pub window: XWindow,
}

/// The tagged event variant. `Other` covers the in-spec "unknown kinds are
/// ignored" clause (§4.1): any raw event kind not in the thirteen handled
/// here translates to it and the dispatcher drops it on the floor.
#[derive(Debug, Clone, Copy)]
pub enum Event {
    ButtonPress(ButtonPress),
    ClientMessage(ClientMessage),
    ConfigureRequest(ConfigureRequest),
    ConfigureNotify(ConfigureNotify),
    DestroyNotify(DestroyNotify),
    EnterNotify(EnterNotify),
    Expose(XWindow),
    FocusIn(FocusIn),
    KeyPress(KeyPress),
    MappingNotify,
    MapRequest(MapRequest),
    MotionNotify(MotionNotify),
    PropertyNotify(PropertyNotify),
    UnmapNotify(UnmapNotify),
    Other,
}
