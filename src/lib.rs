//! Tsh - Tiny Shell
//!
//! A small interactive command interpreter: one line in, one command out,
//! with `<`/`>` redirection, `&` background jobs and a signal-driven
//! foreground-only mode.

#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

#[macro_use]
mod util;

pub mod core;
mod editor;
pub mod errors;
pub mod shell;

pub use crate::shell::{Shell, ShellConfig};
pub use crate::util::isatty;
