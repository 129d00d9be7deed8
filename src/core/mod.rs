//! Line-level building blocks that do not touch processes: tokenizing,
//! `$$` substitution, status formatting and command suggestions.

pub mod expansion;
pub mod parser;
pub mod status;
pub mod suggestion;
