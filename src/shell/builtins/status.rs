use std::io::Write;

use failure::ResultExt;

use crate::errors::{ErrorKind, Result};
use crate::shell::builtins::{self, BuiltinCommand};
use crate::shell::Shell;

pub struct Status;

impl BuiltinCommand for Status {
    const NAME: &'static str = builtins::STATUS_NAME;

    const USAGE: &'static str = "status";

    /// Prints how the last foreground program ended; `exit value 0` before
    /// any has run.
    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], stdout: &mut dyn Write) -> Result<()> {
        writeln!(stdout, "{}", shell.last_status()).context(ErrorKind::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::shell::ShellConfig;

    #[test]
    #[serial]
    fn reports_last_foreground_status() {
        let mut shell = Shell::new(ShellConfig::noninteractive()).unwrap();
        let mut stdout = Vec::new();
        Status::run::<&str>(&mut shell, &[], &mut stdout).unwrap();
        assert_eq!(String::from_utf8(stdout).unwrap(), "exit value 0\n");

        shell.execute_command_string("false").unwrap();
        let mut stdout = Vec::new();
        Status::run::<&str>(&mut shell, &[], &mut stdout).unwrap();
        assert_eq!(String::from_utf8(stdout).unwrap(), "exit value 1\n");
    }

    #[test]
    #[serial]
    fn builtins_do_not_change_status() {
        let mut shell = Shell::new(ShellConfig::noninteractive()).unwrap();
        shell.execute_command_string("false").unwrap();
        shell.execute_command_string("jobs").unwrap();

        let mut stdout = Vec::new();
        Status::run::<&str>(&mut shell, &[], &mut stdout).unwrap();
        assert_eq!(String::from_utf8(stdout).unwrap(), "exit value 1\n");
    }
}
