//! How a waited-for process ended, and how that is shown to the user.

use std::fmt;

use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

/// Result of waiting on a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationStatus {
    /// The process called `exit` with this code.
    Exited(i32),
    /// The process was killed by this signal number.
    Signaled(i32),
}

impl TerminationStatus {
    /// Converts the result of `waitpid(2)` into the pid it describes and how
    /// that process ended. Returns `None` for stop/continue notifications and
    /// `WNOHANG` polls that found nothing.
    pub fn from_wait_status(status: WaitStatus) -> Option<(Pid, TerminationStatus)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, TerminationStatus::Exited(code))),
            WaitStatus::Signaled(pid, signal, _) => {
                Some((pid, TerminationStatus::Signaled(signal as i32)))
            }
            _ => None,
        }
    }
}

impl Default for TerminationStatus {
    fn default() -> Self {
        TerminationStatus::Exited(0)
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TerminationStatus::Exited(code) => write!(f, "exit value {}", code),
            TerminationStatus::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use nix::sys::signal::Signal;

    use super::*;

    #[test]
    fn display() {
        assert_eq!(TerminationStatus::Exited(7).to_string(), "exit value 7");
        assert_eq!(
            TerminationStatus::Signaled(9).to_string(),
            "terminated by signal 9"
        );
        assert_eq!(TerminationStatus::default().to_string(), "exit value 0");
    }

    #[test]
    fn from_wait_status() {
        let pid = Pid::from_raw(1234);
        assert_eq!(
            TerminationStatus::from_wait_status(WaitStatus::Exited(pid, 3)),
            Some((pid, TerminationStatus::Exited(3)))
        );
        assert_eq!(
            TerminationStatus::from_wait_status(WaitStatus::Signaled(pid, Signal::SIGTERM, false)),
            Some((pid, TerminationStatus::Signaled(15)))
        );
        assert_eq!(
            TerminationStatus::from_wait_status(WaitStatus::Stopped(pid, Signal::SIGSTOP)),
            None
        );
        assert_eq!(TerminationStatus::from_wait_status(WaitStatus::StillAlive), None);
    }
}
