//! Process entry point (§2 item 10): locale check, display connection,
//! other-WM detection, atom interning, autostart, `setup`/`scan`/`run`/
//! `cleanup`, and mapping a fatal `WmError` to a distinct process exit code.

mod arena;
mod atoms;
mod bar;
mod client;
mod config;
mod error;
mod events;
mod focus;
mod geometry;
mod layouts;
mod manager;
mod monitor;
mod mouse;
mod proc;
mod render;
mod rules;
mod server;
mod swallow;

use std::ffi::CString;
use std::os::raw::c_int;

use error::{Result, WmError};
use manager::Context;
use server::{ErrorGuard, XConn, XlibConn};

fn check_locale() -> Result<()> {
    unsafe {
        let empty = CString::new("").unwrap();
        if libc::setlocale(libc::LC_CTYPE, empty.as_ptr()).is_null() {
            return Err(WmError::LocaleUnavailable);
        }
    }
    Ok(())
}

unsafe extern "C" fn sigchld_handler(_sig: c_int) {
    loop {
        let pid = libc::waitpid(-1, std::ptr::null_mut(), libc::WNOHANG);
        if pid <= 0 {
            break;
        }
    }
}

fn install_sigchld_handler() {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = sigchld_handler as usize;
        libc::sigemptyset(&mut action.sa_mask);
        action.sa_flags = libc::SA_RESTART | libc::SA_NOCLDSTOP;
        libc::sigaction(libc::SIGCHLD, &action, std::ptr::null_mut());
    }
}

fn run_autostart() {
    for argv in config::AUTOSTART {
        if let Err(err) = manager::spawn(argv) {
            log::warn!("autostart command {:?} failed: {}", argv, err);
        }
    }
}

/// Briefly installs a handler that only watches for `BadAccess`, per the
/// ICCCM convention for detecting a pre-existing window manager: setting
/// `SubstructureRedirectMask` on root fails synchronously if one is
/// already selecting those events.
fn detect_other_wm(conn: &XlibConn) -> Result<()> {
    unsafe {
        x11::xlib::XSetErrorHandler(Some(server::xerror_start));
    }
    conn.select_input(
        conn.root(),
        x11::xlib::SubstructureRedirectMask,
    );
    conn.sync(false);
    unsafe {
        x11::xlib::XSetErrorHandler(None);
    }
    if server::other_wm_detected() {
        return Err(WmError::OtherWmRunning);
    }
    Ok(())
}

fn run() -> Result<i32> {
    env_logger::init();
    config::assert_tag_count();

    check_locale()?;

    let conn = XlibConn::open().ok_or(WmError::DisplayOpenFailed)?;
    if !conn.has_xcb_sidecar() {
        return Err(WmError::XcbUnavailable);
    }

    detect_other_wm(&conn)?;
    let _guard = ErrorGuard::install(conn.display());

    let display = conn.display();
    let wm_atoms = atoms::WmAtoms::intern(display);
    let net_atoms = atoms::NetAtoms::intern(display);

    let selected_border = 0xff4545;
    let unfocused_border = 0x222222;

    let mut ctx = Context::new(conn, wm_atoms, net_atoms, selected_border, unfocused_border)?;
    ctx.setup();
    ctx.scan();

    install_sigchld_handler();
    run_autostart();

    ctx.run();
    ctx.cleanup();

    Ok(0)
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(err.exit_code());
        }
    }
}
