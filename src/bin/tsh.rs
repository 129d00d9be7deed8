use std::path::PathBuf;
use std::process;

use docopt::Docopt;
use log::{debug, error};
use nix::unistd::Pid;
use serde::Deserialize;
use tsh::errors::Error;
use tsh::{Shell, ShellConfig};

const COMMAND_HISTORY_CAPACITY: usize = 10;
const LOG_FILE_NAME: &str = ".tsh_log";

const USAGE: &str = "
tsh.

Usage:
    tsh [options]
    tsh [options] -c <command>
    tsh [options] <file>
    tsh (-h | --help)
    tsh --version

Options:
    -h --help       Show this screen.
    --version       Show version.
    -c              If the -c option is present, then commands are read from the first non-option
                        argument command_string.
    --log=<path>    File to write log to, defaults to ~/.tsh_log
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    arg_file: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_log: Option<String>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    init_logger(&args.flag_log);
    debug!("{:?}", args);

    if args.flag_version {
        println!("tsh version {}", env!("CARGO_PKG_VERSION"));
    } else if args.flag_c || args.arg_file.is_some() {
        execute_from_command_string_or_file(&args);
    } else {
        execute_from_stdin();
    }
}

/// Sends log records to a file. The shell still runs if the file cannot be
/// opened, just without a log.
fn init_logger(path: &Option<String>) {
    let log_path = match path.clone().map(PathBuf::from).or_else(default_log_path) {
        Some(log_path) => log_path,
        None => return,
    };

    let log_file = match fern::log_file(&log_path) {
        Ok(log_file) => log_file,
        Err(e) => {
            eprintln!("tsh: unable to open log file {}: {}", log_path.display(), e);
            return;
        }
    };

    let pid = Pid::this();
    let result = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .level_for("rustyline", log::LevelFilter::Warn)
        .chain(log_file)
        .apply();
    if let Err(e) = result {
        eprintln!("tsh: unable to start logging: {}", e);
    }
}

fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_FILE_NAME))
}

fn execute_from_command_string_or_file(args: &Args) -> ! {
    let mut shell = Shell::new(ShellConfig::noninteractive())
        .unwrap_or_else(|e| display_error_and_exit(&e));

    let result = if let Some(ref command) = args.arg_command {
        shell.execute_command_string(command)
    } else if let Some(ref file_path) = args.arg_file {
        shell.execute_commands_from_file(file_path)
    } else {
        unreachable!();
    };

    exit(result, &mut shell);
}

fn execute_from_stdin() -> ! {
    let interactive = tsh::isatty();
    let config = if interactive {
        ShellConfig::interactive(COMMAND_HISTORY_CAPACITY)
    } else {
        ShellConfig::noninteractive()
    };

    let mut shell = Shell::new(config).unwrap_or_else(|e| display_error_and_exit(&e));
    if interactive {
        print_welcome();
    }

    let result = shell.execute_from_stdin();
    exit(result, &mut shell);
}

fn print_welcome() {
    println!();
    println!("==============================");
    println!("  tsh {}", env!("CARGO_PKG_VERSION"));
    println!("==============================");
    println!();
}

fn display_error_and_exit(error: &Error) -> ! {
    error!("failed to create shell: {}", error);
    eprintln!("tsh: {}", error);
    process::exit(1);
}

/// A fatal error ends the shell with status 1 without waiting on anything;
/// otherwise the shell exits as the `exit` builtin does.
fn exit(result: Result<(), Error>, shell: &mut Shell) -> ! {
    if let Err(e) = result {
        error!("fatal: {}", e);
        eprintln!("tsh: {}", e);
        process::exit(1);
    }

    shell.exit();
}
