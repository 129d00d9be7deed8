//! Tsh - Shell Module
//!
//! The Shell reads one line at a time, runs it as a builtin or an external
//! program, and after every line reports background jobs that have finished.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use failure::ResultExt;
use log::{debug, error, info};

use crate::core::{expansion, parser::Command, status::TerminationStatus};
use crate::editor::Editor;
use crate::errors::{ErrorKind, Result};

use self::execute_command::Outcome;
use self::job_control::JobTable;

pub mod builtins;
pub mod execute_command;
pub mod job_control;
pub mod signals;

const PROMPT: &str = ": ";

/// Policy object controlling how chatty the shell is.
#[derive(Debug, Copy, Clone)]
pub struct ShellConfig {
    /// Number of entries kept in the in-memory command history; 0 disables it.
    command_history_capacity: usize,

    /// Determines if some messages (e.g. "exit" at end of input) are displayed.
    display_messages: bool,
}

impl ShellConfig {
    /// Creates an interactive shell: command history and extra messages.
    pub fn interactive(command_history_capacity: usize) -> Self {
        Self {
            command_history_capacity,
            display_messages: true,
        }
    }

    /// Creates a noninteractive shell, e.g. for `-c` or a script file: no
    /// command history and fewer messages.
    pub fn noninteractive() -> Self {
        Default::default()
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            command_history_capacity: 0,
            display_messages: false,
        }
    }
}

/// Tsh Shell
pub struct Shell {
    editor: Editor,
    jobs: JobTable,
    /// How the last foreground program ended, shown by `status`.
    last_status: TerminationStatus,
    config: ShellConfig,
}

impl Shell {
    /// Installs the shell's signal dispositions and constructs a Shell with
    /// an empty job table.
    pub fn new(config: ShellConfig) -> Result<Shell> {
        signals::initialize().context(ErrorKind::Nix)?;

        let shell = Shell {
            editor: Editor::with_capacity(config.command_history_capacity),
            jobs: JobTable::default(),
            last_status: TerminationStatus::default(),
            config,
        };

        info!("tsh started up");
        Ok(shell)
    }

    pub fn last_status(&self) -> TerminationStatus {
        self.last_status
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut JobTable {
        &mut self.jobs
    }

    /// Runs one input line, then reports any background jobs that finished.
    ///
    /// Only a failure to create a process is returned as an error; every
    /// other problem is reported to the user and the shell carries on.
    pub fn execute_command_string(&mut self, input: &str) -> Result<()> {
        let line = expansion::expand_pid(input, process::id());
        let result = match Command::parse(&line, signals::is_foreground_only()) {
            Some(command) => self.execute_command(&command),
            None => Ok(()),
        };

        let result = match result {
            Err(ref e) if !e.is_fatal() => {
                eprintln!("tsh: {}", e);
                error!("{}: {}", line, e);
                Ok(())
            }
            other => other,
        };

        self.report_finished_jobs();
        result
    }

    /// Runs each line of a script file.
    pub fn execute_commands_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let buffer = fs::read_to_string(path).context(ErrorKind::Io)?;
        for line in buffer.lines() {
            self.execute_command_string(line)?;
        }

        Ok(())
    }

    /// Runs lines from stdin until end of input.
    pub fn execute_from_stdin(&mut self) -> Result<()> {
        while let Some(line) = self.editor.readline(PROMPT) {
            if self.config.command_history_capacity > 0 && !line.trim().is_empty() {
                self.editor.add_history_entry(&line);
            }

            self.execute_command_string(&line)?;
        }

        if self.config.display_messages {
            println!("exit");
        }
        Ok(())
    }

    /// Asks every background job to terminate, then exits with status 0.
    pub fn exit(&mut self) -> ! {
        self.jobs.terminate_all();
        let temp_result = io::stdout().flush();
        log_if_err!(temp_result, "failed to flush stdout");

        info!("tsh has shut down");
        process::exit(0);
    }

    fn execute_command(&mut self, command: &Command) -> Result<()> {
        if builtins::is_builtin(&command.name) {
            debug!("running builtin {:?}", command.args);
            return builtins::run(self, &command.name, &command.args[1..], &mut io::stdout());
        }

        let stdout = io::stdout();
        let outcome = execute_command::launch(command, &mut self.jobs, &mut stdout.lock())?;
        match outcome {
            Outcome::Foreground(status) => self.last_status = status,
            Outcome::NotStarted => {
                self.last_status = TerminationStatus::Exited(execute_command::NOT_STARTED_EXIT_STATUS)
            }
            Outcome::Background(_) => {}
        }

        Ok(())
    }

    /// Reaps finished children without blocking and prints how each ended.
    fn report_finished_jobs(&mut self) {
        match self.jobs.sweep() {
            Ok(finished) => {
                for (pid, status) in finished {
                    println!("background pid {} is done: {}", pid, status);
                }
            }
            Err(e) => error!("failed to check background jobs: {}", e),
        }
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}\nlast status: {}\nhistory: {:?}",
            self.jobs, self.last_status, self.editor
        )
    }
}
