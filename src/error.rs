use thiserror::Error;

/// Crate-wide error type. Only the fatal-at-startup class and a handful of
/// fallible boundary calls return this; mid-operation X errors are absorbed
/// procedurally by the scoped error-handler guard (see `server::ErrorGuard`)
/// and never surface here.
#[derive(Debug, Error)]
pub enum WmError {
    #[error("could not set a UTF-8 locale")]
    LocaleUnavailable,

    #[error("could not open connection to the display server")]
    DisplayOpenFailed,

    #[error("could not obtain an XCB connection from the Xlib display")]
    XcbUnavailable,

    #[error("another window manager is already running")]
    OtherWmRunning,

    #[error("could not intern required atom: {0}")]
    AtomInternFailed(&'static str),

    #[error("could not load any configured font")]
    NoFontsLoadable,

    #[error("failed to spawn process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("out of memory allocating {0}")]
    OutOfMemory(&'static str),
}

pub type Result<T> = std::result::Result<T, WmError>;

/// Exit codes, per the CLI contract: 0 on clean shutdown, a distinct nonzero
/// code per fatal-startup condition so a diagnostic can be correlated with
/// its cause from the shell alone.
impl WmError {
    pub fn exit_code(&self) -> i32 {
        match self {
            WmError::LocaleUnavailable => 1,
            WmError::DisplayOpenFailed => 2,
            WmError::XcbUnavailable => 3,
            WmError::OtherWmRunning => 4,
            WmError::AtomInternFailed(_) => 5,
            WmError::NoFontsLoadable => 6,
            WmError::SpawnFailed(_) => 7,
            WmError::OutOfMemory(_) => 8,
        }
    }
}
