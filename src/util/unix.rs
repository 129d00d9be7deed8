use atty::{self, Stream};

/// Returns `true` if the shell is reading commands from a terminal.
pub fn isatty() -> bool {
    atty::is(Stream::Stdin)
}
