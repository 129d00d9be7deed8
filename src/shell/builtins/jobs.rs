use std::io::Write;

use failure::ResultExt;

use crate::errors::{Error, ErrorKind, Result};
use crate::shell::builtins::{self, BuiltinCommand};
use crate::shell::Shell;

pub struct Jobs;

impl BuiltinCommand for Jobs {
    const NAME: &'static str = builtins::JOBS_NAME;

    const USAGE: &'static str = "jobs";

    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], stdout: &mut dyn Write) -> Result<()> {
        let mut any_jobs = false;
        for (index, job) in shell.jobs().list() {
            writeln!(stdout, "[{}] {}", index, job).context(ErrorKind::Io)?;
            any_jobs = true;
        }

        if !any_jobs {
            writeln!(stdout, "No background jobs running.").context(ErrorKind::Io)?;
        }

        Ok(())
    }
}

pub struct Fg;

impl BuiltinCommand for Fg {
    const NAME: &'static str = builtins::FG_NAME;

    const USAGE: &'static str = "fg <job>";

    /// Continues a background job and waits for it, printing how it ended.
    fn run<T: AsRef<str>>(shell: &mut Shell, args: &[T], stdout: &mut dyn Write) -> Result<()> {
        let index = parse_job_index::<Self, T>(shell, args)?;
        let label = shell.jobs().get(index).map(|job| job.label().to_string());
        if let Some(label) = label {
            writeln!(stdout, "Bringing [{}] {} to foreground", index, label)
                .context(ErrorKind::Io)?;
        }

        let status = shell
            .jobs_mut()
            .bring_to_foreground(index)
            .map_err(|e| prefixed::<Self>(e))?;
        writeln!(stdout, "{}", status).context(ErrorKind::Io)?;
        Ok(())
    }
}

pub struct Bg;

impl BuiltinCommand for Bg {
    const NAME: &'static str = builtins::BG_NAME;

    const USAGE: &'static str = "bg <job>";

    /// Continues a stopped background job without waiting for it.
    fn run<T: AsRef<str>>(shell: &mut Shell, args: &[T], stdout: &mut dyn Write) -> Result<()> {
        let index = parse_job_index::<Self, T>(shell, args)?;
        let label = shell.jobs().get(index).map(|job| job.label().to_string());
        if let Some(label) = label {
            writeln!(stdout, "Continuing [{}] {} in background", index, label)
                .context(ErrorKind::Io)?;
        }

        shell
            .jobs_mut()
            .continue_in_background(index)
            .map_err(|e| prefixed::<Self>(e))
    }
}

/// Reads the job index argument, rejecting anything that does not name a
/// live job.
fn parse_job_index<B: BuiltinCommand, T: AsRef<str>>(shell: &Shell, args: &[T]) -> Result<usize> {
    let arg = args
        .first()
        .map(AsRef::as_ref)
        .ok_or_else(|| Error::builtin_command(format!("usage: {}", B::USAGE), 2))?;

    match arg.parse::<usize>() {
        Ok(index) if shell.jobs().get(index).is_some() => Ok(index),
        _ => Err(Error::no_such_job(format!("{}: {}", B::NAME, arg))),
    }
}

fn prefixed<B: BuiltinCommand>(e: Error) -> Error {
    match *e.kind() {
        ErrorKind::NoSuchJob(ref job) => Error::no_such_job(format!("{}: {}", B::NAME, job)),
        _ => e,
    }
}
