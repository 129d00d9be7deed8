//! Tsh builtins
//!
//! Builtins run inside the shell process. Redirections and a trailing `&`
//! on a builtin line are ignored.

use std::io::Write;

use self::dirs::Cd;
use self::exit::Exit;
use self::jobs::{Bg, Fg, Jobs};
use self::status::Status;
use crate::errors::Result;
use crate::shell::Shell;

mod dirs;
mod exit;
mod jobs;
mod status;

const BG_NAME: &str = "bg";
const CD_NAME: &str = "cd";
const EXIT_NAME: &str = "exit";
const FG_NAME: &str = "fg";
const JOBS_NAME: &str = "jobs";
const STATUS_NAME: &str = "status";

/// Represents a Tsh builtin command such as cd or jobs.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// The usage string to display to the user.
    const USAGE: &'static str;
    /// Runs the command with the given arguments in the `shell` environment.
    fn run<T: AsRef<str>>(shell: &mut Shell, args: &[T], stdout: &mut dyn Write) -> Result<()>;
}

pub fn is_builtin<T: AsRef<str>>(program: T) -> bool {
    [BG_NAME, CD_NAME, EXIT_NAME, FG_NAME, JOBS_NAME, STATUS_NAME].contains(&program.as_ref())
}

/// precondition: command is a builtin.
///
/// `args` excludes the program name.
pub fn run<S1, S2>(shell: &mut Shell, program: S1, args: &[S2], stdout: &mut dyn Write) -> Result<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    debug_assert!(is_builtin(&program));

    match program.as_ref() {
        BG_NAME => Bg::run(shell, args, stdout),
        CD_NAME => Cd::run(shell, args, stdout),
        EXIT_NAME => Exit::run(shell, args, stdout),
        FG_NAME => Fg::run(shell, args, stdout),
        JOBS_NAME => Jobs::run(shell, args, stdout),
        STATUS_NAME => Status::run(shell, args, stdout),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_recognized() {
        for name in &["bg", "cd", "exit", "fg", "jobs", "status"] {
            assert!(is_builtin(name), "{} should be a builtin", name);
        }
        assert!(!is_builtin("ls"));
        assert!(!is_builtin("history"));
        assert!(!is_builtin("Exit"));
    }
}
