//! Static, compile-time configuration: the only place fonts, colors, tag
//! names, rules, layouts, and key/button bindings are named. There is no
//! runtime configuration file — this module *is* the config, in the spirit
//! of the suckless `config.h` it's ported from.

use lazy_static::lazy_static;
use x11::keysym::*;
use x11::xlib::{Button1, Button2, Button3, ControlMask, Mod1Mask, Mod4Mask, ShiftMask};

use crate::layouts::{self, ArrangeFn};

pub const ALT: u32 = Mod1Mask;
pub const SUPER: u32 = Mod4Mask;
pub const CTRL: u32 = ControlMask;
pub const SHIFT: u32 = ShiftMask;

pub const FONTS: &[&str] = &["MonoLisa:size=15"];

#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub fg: &'static str,
    pub bg: &'static str,
    pub border: &'static str,
}

pub const SCHEME_NORM: ColorScheme = ColorScheme {
    fg: "#ababab",
    bg: "#222222",
    border: "#222222",
};
pub const SCHEME_SEL: ColorScheme = ColorScheme {
    fg: "#eeeeee",
    bg: "#222222",
    border: "#ff4545",
};

pub const MFACT: f64 = 0.56;
pub const NMASTER: i32 = 1;
pub const BORDERPX: i32 = 2;
pub const SNAP: i32 = 32;
pub const SHOWBAR: bool = true;
pub const TOPBAR: bool = true;

/// Inner/outer gap defaults, in pixels, all sides equal.
pub const GAP_INNER: i32 = 10;
pub const GAP_OUTER: i32 = 10;

/// Tag names. `tags().len()` must not exceed 25 — enforced in `assert_tag_count`
/// rather than at compile time, since `&[&str]` length isn't usable in a
/// `const` assertion on this edition.
pub const TAGS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "23", "24", "25",
];

pub const NTAGS: usize = TAGS.len();

pub fn assert_tag_count() {
    assert!(
        TAGS.len() <= 25,
        "tag table exceeds the 25-tag bitmask budget"
    );
}

pub const AUTOSTART: &[&[&str]] = &[&["sh", "-c", "/home/uniminin/dynamd/startup/startup.sh"]];

/// A window rule: `None` patterns match unconditionally.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub class: Option<&'static str>,
    pub instance: Option<&'static str>,
    pub title: Option<&'static str>,
    pub tags: u32,
    pub is_floating: bool,
    pub is_terminal: bool,
    pub no_swallow: bool,
    pub monitor: i32,
}

pub const RULES: &[Rule] = &[
    Rule {
        class: Some("Alacritty"),
        instance: None,
        title: None,
        tags: 0,
        is_floating: false,
        is_terminal: true,
        no_swallow: false,
        monitor: -1,
    },
    Rule {
        class: None,
        instance: None,
        title: Some("Event Tester"),
        tags: 0,
        is_floating: false,
        is_terminal: false,
        no_swallow: true,
        monitor: -1,
    },
];

/// A layout table entry. `arrange == None` is the floating sentinel; the
/// final `{symbol: "", arrange: None}` entry with an empty symbol is the
/// cycle-boundary sentinel `cyclelayout` relies on (see DESIGN.md / §9).
#[derive(Debug, Clone, Copy)]
pub struct LayoutEntry {
    pub symbol: &'static str,
    pub arrange: Option<ArrangeFn>,
}

pub const LAYOUTS: &[LayoutEntry] = &[
    LayoutEntry {
        symbol: "[|W|]",
        arrange: Some(layouts::centeredmaster),
    },
    LayoutEntry {
        symbol: "[M]",
        arrange: Some(layouts::monocle),
    },
    LayoutEntry {
        symbol: "[T]",
        arrange: Some(layouts::tile),
    },
    LayoutEntry {
        symbol: "[D]",
        arrange: Some(layouts::deck),
    },
    LayoutEntry {
        symbol: "[@~]",
        arrange: Some(layouts::dwindle),
    },
    LayoutEntry {
        symbol: "[~@]",
        arrange: Some(layouts::spiral),
    },
    LayoutEntry {
        symbol: "[G]",
        arrange: Some(layouts::grid),
    },
    LayoutEntry {
        symbol: "[GH]",
        arrange: Some(layouts::horizgrid),
    },
    LayoutEntry {
        symbol: "[:G:]",
        arrange: Some(layouts::gaplessgrid),
    },
    LayoutEntry {
        symbol: "[TTT]",
        arrange: Some(layouts::bstack),
    },
    LayoutEntry {
        symbol: "[===]",
        arrange: Some(layouts::bstackhoriz),
    },
    LayoutEntry {
        symbol: "[|=|]",
        arrange: Some(layouts::centeredfloatingmaster),
    },
    LayoutEntry {
        symbol: "[=]",
        arrange: None,
    },
    // Cycle-boundary sentinel. `cyclelayout` stops rotating past this slot.
    LayoutEntry {
        symbol: "",
        arrange: None,
    },
];

pub const DEFAULT_LAYOUT: usize = 0;
/// Index of the floating-only layout, used by the layout-symbol buttons.
pub const FLOATING_LAYOUT: usize = 12;

/// Replaces the C `Arg` union: the payload carried by a key/button binding.
#[derive(Debug, Clone, Copy)]
pub enum Arg {
    Int(i32),
    UInt(u32),
    Float(f32),
    Tags(u32),
    Layout(usize),
    Spawn(&'static [&'static str]),
    None,
}

/// Replaces the C function-pointer binding target with a closed enum the
/// dispatcher matches over; see `manager::dispatch_action`.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    Spawn,
    FocusStack,
    MoveStack,
    SetMfact,
    Gaps,
    FocusMon,
    TagMon,
    Zoom,
    ToggleFullscreen,
    KillClient,
    ToggleBar,
    ToggleGaps,
    ToggleFloating,
    ShiftView,
    OrganizeTags,
    CycleLayout,
    View,
    Tag,
    ToggleTag,
    ToggleView,
    SetLayout,
    MoveMouse,
    ResizeMouse,
    FocusWin,
}

#[derive(Debug, Clone, Copy)]
pub struct Key {
    pub modifier: u32,
    pub keysym: u32,
    pub action: Action,
    pub arg: Arg,
}

/// Expands to the pair of bindings the original `TAGKEYS` preprocessor
/// macro generated per digit key: view that tag, or move the focused
/// client to it. Written out as a `const fn` rather than a `macro_rules!`
/// because a declarative macro can't expand to two array elements in a
/// single expression position.
const fn tagkeys(keysym: u32, tag: u32) -> [Key; 2] {
    [
        Key {
            modifier: SUPER,
            keysym,
            action: Action::View,
            arg: Arg::Tags(1 << tag),
        },
        Key {
            modifier: SUPER | SHIFT,
            keysym,
            action: Action::Tag,
            arg: Arg::Tags(1 << tag),
        },
    ]
}

pub const ALACRITTY: &[&str] = &["alacritty"];
pub const FLAMESHOT: &[&str] = &["flameshot", "gui"];
pub const DMENU: &[&str] = &[
    "dmenu_run", "-nb", "black", "-sb", "white", "-nf", "#858585", "-sf", "black", "-fn",
    "MonoLisa-18",
];
pub const ROFI: &[&str] = &[
    "rofi", "-modi", "drun", "-show", "drun", "-theme", "sidetab", "-matching", "fuzzy",
];
pub const PCMANFM: &[&str] = &["pcmanfm"];

const STATIC_KEYS: &[Key] = &[
    Key {
        modifier: SUPER,
        keysym: XK_Return,
        action: Action::Spawn,
        arg: Arg::Spawn(ALACRITTY),
    },
    Key {
        modifier: SUPER,
        keysym: XK_space,
        action: Action::Spawn,
        arg: Arg::Spawn(FLAMESHOT),
    },
    Key {
        modifier: SUPER,
        keysym: XK_d,
        action: Action::Spawn,
        arg: Arg::Spawn(DMENU),
    },
    Key {
        modifier: SUPER,
        keysym: XK_r,
        action: Action::Spawn,
        arg: Arg::Spawn(ROFI),
    },
    Key {
        modifier: SUPER,
        keysym: XK_e,
        action: Action::Spawn,
        arg: Arg::Spawn(PCMANFM),
    },
    Key {
        modifier: SUPER,
        keysym: XK_Right,
        action: Action::FocusStack,
        arg: Arg::Int(1),
    },
    Key {
        modifier: SUPER,
        keysym: XK_Left,
        action: Action::FocusStack,
        arg: Arg::Int(-1),
    },
    Key {
        modifier: SUPER | SHIFT,
        keysym: XK_Right,
        action: Action::MoveStack,
        arg: Arg::Int(1),
    },
    Key {
        modifier: SUPER | SHIFT,
        keysym: XK_Left,
        action: Action::MoveStack,
        arg: Arg::Int(-1),
    },
    Key {
        modifier: SUPER | CTRL,
        keysym: XK_Right,
        action: Action::SetMfact,
        arg: Arg::Float(0.05),
    },
    Key {
        modifier: SUPER | CTRL,
        keysym: XK_Left,
        action: Action::SetMfact,
        arg: Arg::Float(-0.05),
    },
    Key {
        modifier: SUPER,
        keysym: XK_equal,
        action: Action::Gaps,
        arg: Arg::Int(1),
    },
    Key {
        modifier: SUPER,
        keysym: XK_minus,
        action: Action::Gaps,
        arg: Arg::Int(-1),
    },
    Key {
        modifier: SUPER | CTRL,
        keysym: XK_period,
        action: Action::FocusMon,
        arg: Arg::Int(1),
    },
    Key {
        modifier: SUPER | CTRL,
        keysym: XK_comma,
        action: Action::FocusMon,
        arg: Arg::Int(-1),
    },
    Key {
        modifier: SUPER | SHIFT,
        keysym: XK_period,
        action: Action::TagMon,
        arg: Arg::Int(1),
    },
    Key {
        modifier: SUPER | SHIFT,
        keysym: XK_comma,
        action: Action::TagMon,
        arg: Arg::Int(-1),
    },
    Key {
        modifier: SUPER | SHIFT,
        keysym: XK_Return,
        action: Action::Zoom,
        arg: Arg::None,
    },
    Key {
        modifier: SUPER,
        keysym: XK_f,
        action: Action::ToggleFullscreen,
        arg: Arg::None,
    },
    Key {
        modifier: SUPER,
        keysym: XK_q,
        action: Action::KillClient,
        arg: Arg::None,
    },
    Key {
        modifier: SUPER,
        keysym: XK_b,
        action: Action::ToggleBar,
        arg: Arg::None,
    },
    Key {
        modifier: SUPER,
        keysym: XK_g,
        action: Action::ToggleGaps,
        arg: Arg::None,
    },
    Key {
        modifier: SUPER | SHIFT,
        keysym: XK_f,
        action: Action::ToggleFloating,
        arg: Arg::None,
    },
    Key {
        modifier: SUPER,
        keysym: XK_s,
        action: Action::ShiftView,
        arg: Arg::Int(1),
    },
    Key {
        modifier: SUPER,
        keysym: XK_a,
        action: Action::ShiftView,
        arg: Arg::Int(-1),
    },
    Key {
        modifier: SUPER | SHIFT,
        keysym: XK_r,
        action: Action::OrganizeTags,
        arg: Arg::None,
    },
    Key {
        modifier: SUPER,
        keysym: XK_x,
        action: Action::CycleLayout,
        arg: Arg::Int(1),
    },
    Key {
        modifier: SUPER,
        keysym: XK_z,
        action: Action::CycleLayout,
        arg: Arg::Int(-1),
    },
    Key {
        modifier: SUPER,
        keysym: XK_Tab,
        action: Action::View,
        arg: Arg::Tags(0),
    },
    Key {
        modifier: SUPER,
        keysym: XK_0,
        action: Action::View,
        arg: Arg::Tags(!0u32),
    },
];

const TAG_KEYSYMS: [u32; 9] = [
    XK_1, XK_2, XK_3, XK_4, XK_5, XK_6, XK_7, XK_8, XK_9,
];

lazy_static! {
    /// `STATIC_KEYS` followed by the generated view/tag pair for each of
    /// the first nine tags, matching the `TAGKEYS` macro expansion order.
    pub static ref KEYS: Vec<Key> = {
        let mut keys = STATIC_KEYS.to_vec();
        for (tag, keysym) in TAG_KEYSYMS.iter().enumerate() {
            keys.extend_from_slice(&tagkeys(*keysym, tag as u32));
        }
        keys
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickRegion {
    LtSymbol,
    TagBar,
    TabBar,
    StatusText,
    ClientWin,
    RootWin,
}

#[derive(Debug, Clone, Copy)]
pub struct ButtonBinding {
    pub click: ClickRegion,
    pub modifier: u32,
    pub button: u32,
    pub action: Action,
    pub arg: Arg,
}

pub const BUTTONS: &[ButtonBinding] = &[
    ButtonBinding {
        click: ClickRegion::LtSymbol,
        modifier: 0,
        button: Button1,
        action: Action::SetLayout,
        arg: Arg::Layout(DEFAULT_LAYOUT),
    },
    ButtonBinding {
        click: ClickRegion::LtSymbol,
        modifier: 0,
        button: Button3,
        action: Action::SetLayout,
        arg: Arg::Layout(FLOATING_LAYOUT),
    },
    ButtonBinding {
        click: ClickRegion::ClientWin,
        modifier: SUPER,
        button: Button1,
        action: Action::MoveMouse,
        arg: Arg::None,
    },
    ButtonBinding {
        click: ClickRegion::ClientWin,
        modifier: SUPER,
        button: Button2,
        action: Action::ToggleFloating,
        arg: Arg::None,
    },
    ButtonBinding {
        click: ClickRegion::ClientWin,
        modifier: SUPER,
        button: Button3,
        action: Action::ResizeMouse,
        arg: Arg::None,
    },
    ButtonBinding {
        click: ClickRegion::TagBar,
        modifier: 0,
        button: Button1,
        action: Action::View,
        arg: Arg::None,
    },
    ButtonBinding {
        click: ClickRegion::TagBar,
        modifier: 0,
        button: Button3,
        action: Action::ToggleView,
        arg: Arg::None,
    },
    ButtonBinding {
        click: ClickRegion::TagBar,
        modifier: SUPER,
        button: Button1,
        action: Action::Tag,
        arg: Arg::None,
    },
    ButtonBinding {
        click: ClickRegion::TagBar,
        modifier: SUPER,
        button: Button3,
        action: Action::ToggleTag,
        arg: Arg::None,
    },
    ButtonBinding {
        click: ClickRegion::TabBar,
        modifier: 0,
        button: Button1,
        action: Action::FocusWin,
        arg: Arg::None,
    },
];

/// CLEANMASK: strips NumLock and the locked CapsLock bit so bindings match
/// regardless of which lock modifiers happen to be engaged.
pub fn clean_mask(mask: u32, numlockmask: u32) -> u32 {
    !(numlockmask | x11::xlib::LockMask)
        & (x11::xlib::ShiftMask
            | x11::xlib::ControlMask
            | x11::xlib::Mod1Mask
            | x11::xlib::Mod2Mask
            | x11::xlib::Mod3Mask
            | x11::xlib::Mod4Mask
            | x11::xlib::Mod5Mask)
        & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_count_within_budget() {
        assert_tag_count();
    }

    #[test]
    fn layout_table_ends_with_cycle_sentinel() {
        let last = LAYOUTS.last().unwrap();
        assert!(last.symbol.is_empty() && last.arrange.is_none());
    }

    #[test]
    fn clean_mask_strips_lock_bits() {
        let numlock = x11::xlib::Mod2Mask;
        let raw = SUPER | numlock | x11::xlib::LockMask;
        assert_eq!(clean_mask(raw, numlock), SUPER);
    }
}
