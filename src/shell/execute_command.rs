//! Runs external programs.
//!
//! Redirections and signal dispositions are applied in the child after
//! `fork` and before `exec`, so a bad redirection path only costs the child
//! (it reports the problem and exits with status 1) and never the shell.

use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::io::RawFd;
use std::os::unix::process::CommandExt;
use std::process;

use failure::{Fail, ResultExt};
use log::{debug, info, warn};
use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{self, Pid};

use crate::core::{parser::Command, status::TerminationStatus, suggestion};
use crate::errors::{Error, ErrorKind, Result};
use crate::shell::job_control::{self, JobTable};
use crate::shell::signals;

/// Exit status of a child whose redirection could not be set up, also
/// recorded for a program that could not be executed at all.
pub const NOT_STARTED_EXIT_STATUS: i32 = 1;

/// What became of a launched command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran in the foreground and has terminated.
    Foreground(TerminationStatus),
    /// The command is running in the background with this pid.
    Background(Pid),
    /// The program could not be executed; the failure has been reported.
    NotStarted,
}

/// Opens a file in the child and installs it as one of its standard streams.
#[derive(Debug)]
struct Redirect {
    path: CString,
    target: RawFd,
    flags: OFlag,
    /// Written to stderr if `path` cannot be opened.
    failure_message: Vec<u8>,
}

impl Redirect {
    fn input(path: &str) -> Redirect {
        Redirect::new(path, libc::STDIN_FILENO, OFlag::O_RDONLY, "input")
    }

    fn output(path: &str) -> Redirect {
        Redirect::new(
            path,
            libc::STDOUT_FILENO,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            "output",
        )
    }

    fn new(path: &str, target: RawFd, flags: OFlag, direction: &str) -> Redirect {
        // A path with an interior NUL cannot name a file; an empty path fails
        // to open just the same.
        let path = CString::new(path).unwrap_or_default();
        Redirect {
            failure_message: format!("cannot open {} for {}\n", path.to_string_lossy(), direction)
                .into_bytes(),
            path,
            target,
            flags,
        }
    }

    /// Runs in the forked child. Exits the child if the file cannot be
    /// opened or installed.
    fn apply(&self) {
        let mode = Mode::from_bits_truncate(0o644);
        let installed = fcntl::open(self.path.as_c_str(), self.flags, mode).and_then(|fd| {
            if fd == self.target {
                return Ok(());
            }
            unistd::dup2(fd, self.target)?;
            unistd::close(fd)
        });

        if installed.is_err() {
            let _ = unistd::write(libc::STDERR_FILENO, &self.failure_message);
            unsafe { libc::_exit(NOT_STARTED_EXIT_STATUS) };
        }
    }
}

/// Runs `command`, in the background if it asked for that, foreground-only
/// mode is off and the job table has room; otherwise in the foreground.
///
/// Messages for the user (the pid of a background job, a foreground job
/// killed by a signal, a suggestion for an unknown program) go to `stdout`.
pub fn launch(command: &Command, jobs: &mut JobTable, stdout: &mut dyn Write) -> Result<Outcome> {
    let mut background = command.background && !signals::is_foreground_only();
    if background && !jobs.has_capacity() {
        eprintln!("tsh: job table full, running {} in foreground", command.name);
        background = false;
    }

    let pid = match spawn(command, background) {
        Ok(pid) => pid,
        Err(e) => {
            if e.is_fatal() {
                return Err(e);
            }
            eprintln!("tsh: {}", e);
            if let Some(candidate) = suggestion::suggest(&command.name) {
                writeln!(stdout, "Did you mean: {}?", candidate).context(ErrorKind::Io)?;
            }
            return Ok(Outcome::NotStarted);
        }
    };

    if background {
        writeln!(stdout, "background pid is {}", pid).context(ErrorKind::Io)?;
        if !jobs.insert(pid, &command.name) {
            warn!("{} ({}) is running untracked", pid, command.name);
        }
        return Ok(Outcome::Background(pid));
    }

    let status = job_control::wait_for_process(pid)?;
    debug!("{} ({}) finished with {}", pid, command.name, status);
    if let TerminationStatus::Signaled(_) = status {
        writeln!(stdout, "{}", status).context(ErrorKind::Io)?;
    }
    Ok(Outcome::Foreground(status))
}

fn spawn(command: &Command, background: bool) -> Result<Pid> {
    let input = command.input_path.as_ref().map(|path| Redirect::input(path));
    let output = command.output_path.as_ref().map(|path| Redirect::output(path));

    let mut process = process::Command::new(&command.name);
    process.args(&command.args[1..]);
    unsafe {
        process.pre_exec(move || {
            if let Some(ref input) = input {
                input.apply();
            }
            if let Some(ref output) = output {
                output.apply();
            }
            signals::prepare_child(background)
                .map_err(|errno| io::Error::from_raw_os_error(errno as i32))
        });
    }

    let child = match process.spawn() {
        Ok(child) => child,
        Err(e) => return Err(classify_spawn_error(&command.name, e)),
    };

    let pid = Pid::from_raw(child.id() as libc::pid_t);
    info!(
        "started {} ({}) in the {}",
        pid,
        command.args.join(" "),
        if background { "background" } else { "foreground" }
    );
    Ok(pid)
}

/// Running out of processes or memory is fatal to the shell; anything else
/// (no such program, permission denied, ...) only fails this command.
fn classify_spawn_error(name: &str, e: io::Error) -> Error {
    match e.raw_os_error() {
        Some(libc::EAGAIN) | Some(libc::ENOMEM) => e.context(ErrorKind::Spawn).into(),
        _ if e.kind() == io::ErrorKind::NotFound => Error::command_not_found(name),
        _ => Error::builtin_command(format!("{}: {}", name, e), NOT_STARTED_EXIT_STATUS),
    }
}
