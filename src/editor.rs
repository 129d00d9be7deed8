use std::fmt;
use std::io;

use failure::Fail;
use log::{debug, error, warn};
use rustyline::{
    self,
    completion::{Completer, FilenameCompleter, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    validate::Validator,
    CompletionType, Config, Helper,
};

use crate::errors::{Error, ErrorKind};

struct EditorHelper(FilenameCompleter);

impl Completer for EditorHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> ::std::result::Result<(usize, Vec<Pair>), ReadlineError> {
        self.0.complete(line, pos, ctx)
    }
}

impl Hinter for EditorHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Highlighter for EditorHelper {}

impl Helper for EditorHelper {}

impl Validator for EditorHelper {}

/// Reads input lines, with filename completion and an in-memory history.
pub struct Editor {
    internal: rustyline::Editor<EditorHelper>,
    /// The total number of history items ever saved
    history_count: usize,
    history_capacity: usize,
}

impl Editor {
    pub fn with_capacity(history_capacity: usize) -> Editor {
        let config = Config::builder()
            .max_history_size(history_capacity)
            .history_ignore_space(true)
            .completion_type(CompletionType::Circular)
            .build();

        let mut internal = rustyline::Editor::with_config(config);
        internal.set_helper(Some(EditorHelper(FilenameCompleter::new())));

        Editor {
            internal,
            history_count: 0,
            history_capacity,
        }
    }

    /// Returns the next line, or `None` at end of input.
    ///
    /// A read interrupted by a signal (Ctrl-C at the prompt, or SIGTSTP
    /// toggling foreground-only mode) is retried with a fresh prompt. A line
    /// that is not valid UTF-8 is reported and skipped. Any other read error
    /// is reported and ends the input, so the shell still shuts down its
    /// background jobs.
    pub fn readline(&mut self, prompt: &str) -> Option<String> {
        loop {
            match self.internal.readline(prompt) {
                Ok(line) => return Some(line),
                Err(ReadlineError::Eof) => return None,
                Err(ReadlineError::Interrupted) => debug!("readline interrupted, retrying"),
                Err(ReadlineError::Io(ref e)) if e.kind() == io::ErrorKind::Interrupted => {
                    debug!("readline interrupted by a signal, retrying")
                }
                Err(ReadlineError::Io(ref e)) if e.kind() == io::ErrorKind::InvalidData => {
                    eprintln!("tsh: skipping unreadable line: {}", e);
                    warn!("skipping unreadable line: {}", e);
                }
                Err(ReadlineError::Utf8Error) => {
                    eprintln!("tsh: skipping unreadable line: invalid UTF-8");
                    warn!("skipping unreadable line: invalid UTF-8");
                }
                Err(e) => {
                    let e = Error::from(e.context(ErrorKind::Readline));
                    eprintln!("tsh: {}", e);
                    error!("giving up on input: {}", e);
                    return None;
                }
            }
        }
    }

    pub fn add_history_entry(&mut self, line: &str) {
        if self.internal.add_history_entry(line) {
            self.history_count += 1;
        }
    }

    pub fn get_history_count(&self) -> usize {
        self.history_count
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count: {}", self.get_history_count())?;
        write!(f, "capacity: {}", self.history_capacity)
    }
}
