//! "Did you mean" hints for programs that could not be found.

const CANDIDATES: &[&str] = &["ls", "cd", "pwd", "echo", "exit", "status"];

/// Guesses which common command a mistyped `name` was meant to be.
///
/// Candidates are tried in order and the first one that matches wins: an
/// exact match ignoring case, a strictly shorter prefix ignoring case, or a
/// name made of one repeated letter that starts the candidate (`ll` -> `ls`).
pub fn suggest(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    CANDIDATES.iter().cloned().find(|candidate| {
        name == *candidate
            || (name.len() < candidate.len() && candidate.starts_with(name.as_str()))
            || is_repeated_initial(&name, candidate)
    })
}

fn is_repeated_initial(name: &str, candidate: &str) -> bool {
    let mut chars = name.chars();
    match (chars.next(), candidate.chars().next()) {
        (Some(first), Some(initial)) => first == initial && chars.all(|c| c == first),
        _ => false,
    }
}
