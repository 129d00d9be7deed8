//! Signal dispositions for the shell and its children, and the
//! foreground-only mode flipped by SIGTSTP.
//!
//! The shell ignores SIGINT so that Ctrl-C at the prompt does not kill it.
//! Foreground children restore the default SIGINT action; background
//! children keep it ignored. SIGTSTP toggles foreground-only mode in the
//! shell and is ignored by every child.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd;

/// Only ever written by `toggle_foreground_only`.
static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

/// Pid of the process that registered the toggle. A forked child keeps the
/// shell's handler until `prepare_child` (or `exec`) replaces it, and must
/// not act on a SIGTSTP that arrives in that window.
static SHELL_PID: AtomicI32 = AtomicI32::new(0);

const ENTER_FOREGROUND_ONLY: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n";
const EXIT_FOREGROUND_ONLY: &[u8] = b"\nExiting foreground-only mode\n";

/// Installs the shell's own dispositions: SIGINT ignored, SIGTSTP toggles
/// foreground-only mode.
pub fn initialize() -> nix::Result<()> {
    ignore_interrupt()?;
    register_mode_toggle()
}

/// Returns `true` while a trailing `&` must not put commands in the background.
pub fn is_foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

pub fn ignore_interrupt() -> nix::Result<()> {
    set_disposition(Signal::SIGINT, SigHandler::SigIgn)
}

pub fn default_interrupt() -> nix::Result<()> {
    set_disposition(Signal::SIGINT, SigHandler::SigDfl)
}

/// Routes SIGTSTP to `toggle_foreground_only`. `SA_RESTART` keeps a pending
/// read of the next line (or a wait on a foreground child) from failing
/// with `EINTR` when the signal arrives.
pub fn register_mode_toggle() -> nix::Result<()> {
    SHELL_PID.store(unistd::getpid().as_raw(), Ordering::SeqCst);
    let action = SigAction::new(
        SigHandler::Handler(toggle_foreground_only),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );
    unsafe { signal::sigaction(Signal::SIGTSTP, &action) }.map(drop)
}

/// Sets the dispositions of a freshly forked child. Only async-signal-safe
/// calls are made here, as this runs between `fork` and `exec`.
pub(crate) fn prepare_child(background: bool) -> nix::Result<()> {
    if background {
        ignore_interrupt()?;
    } else {
        default_interrupt()?;
    }
    set_disposition(Signal::SIGTSTP, SigHandler::SigIgn)
}

extern "C" fn toggle_foreground_only(_: libc::c_int) {
    if unistd::getpid().as_raw() != SHELL_PID.load(Ordering::SeqCst) {
        return;
    }

    let was_foreground_only = FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
    let notice = if was_foreground_only {
        EXIT_FOREGROUND_ONLY
    } else {
        ENTER_FOREGROUND_ONLY
    };
    // Nothing can be done about a failed write from inside a handler.
    let _ = unistd::write(libc::STDOUT_FILENO, notice);
}

fn set_disposition(signal: Signal, handler: SigHandler) -> nix::Result<()> {
    let action = SigAction::new(handler, SaFlags::empty(), SigSet::all());
    unsafe { signal::sigaction(signal, &action) }.map(drop)
}
