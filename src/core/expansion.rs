//! `$$` expansion.

/// Replaced by the shell's own process id wherever it appears in a line.
pub const PID_MARKER: &str = "$$";

/// Replaces every `$$` in `line` with `pid`, scanning left to right so that
/// `$$$` becomes the pid followed by a single `$`.
pub fn expand_pid(line: &str, pid: u32) -> String {
    if !line.contains(PID_MARKER) {
        return line.to_string();
    }

    line.replace(PID_MARKER, &pid.to_string())
}
