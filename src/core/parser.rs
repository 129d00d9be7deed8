//! Tsh Parser
//!
//! Input lines are split on single spaces; there is no quoting or escaping.
//! A line is `program [args...] [< infile] [> outfile] [&]`.

use log::debug;

const INPUT_REDIRECT: &str = "<";
const OUTPUT_REDIRECT: &str = ">";
const BACKGROUND: &str = "&";
const COMMENT: char = '#';

/// One parsed input line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Command {
    /// The program to run, also `argv[0]`.
    pub name: String,
    /// The argument vector, starting with `name`.
    pub args: Vec<String>,
    /// File to connect to stdin, if one is specified.
    pub input_path: Option<String>,
    /// File to connect to stdout, if one is specified.
    pub output_path: Option<String>,
    /// Run the command in the background.
    pub background: bool,
}

impl Command {
    /// Parses an input line with its trailing newline already removed.
    ///
    /// Returns `None` for blank lines and comments. A trailing `&` is always
    /// consumed, but only requests the background when `foreground_only` is
    /// unset. Once a redirection token is seen, remaining tokens other than a
    /// redirection are dropped, and a later redirection of the same stream
    /// replaces an earlier one.
    ///
    /// # Examples
    ///
    /// ```
    /// use tsh::core::parser::Command;
    ///
    /// let command = Command::parse("wc -l < in.txt > out.txt", false).unwrap();
    /// assert_eq!(command.args, vec!["wc", "-l"]);
    /// assert_eq!(command.input_path.as_deref(), Some("in.txt"));
    /// assert_eq!(command.output_path.as_deref(), Some("out.txt"));
    /// assert!(!command.background);
    /// ```
    pub fn parse(line: &str, foreground_only: bool) -> Option<Command> {
        if line.trim().is_empty() || line.starts_with(COMMENT) {
            return None;
        }

        let mut tokens: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
        let mut background = false;
        if tokens.len() > 1 && tokens.last() == Some(&BACKGROUND) {
            tokens.pop();
            background = !foreground_only;
        }

        let mut tokens = tokens.into_iter();
        let name = tokens.next()?.to_string();
        let mut command = Command {
            args: vec![name.clone()],
            name,
            background,
            ..Default::default()
        };

        let mut accept_args = true;
        while let Some(token) = tokens.next() {
            match token {
                INPUT_REDIRECT => {
                    command.input_path = Some(tokens.next().unwrap_or_default().to_string());
                    accept_args = false;
                }
                OUTPUT_REDIRECT => {
                    command.output_path = Some(tokens.next().unwrap_or_default().to_string());
                    accept_args = false;
                }
                arg if accept_args => command.args.push(arg.to_string()),
                ignored => debug!("ignoring '{}' after redirection", ignored),
            }
        }

        debug!("parsed Command: {:?}", command);
        Some(command)
    }
}
