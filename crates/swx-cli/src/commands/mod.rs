//! CLI subcommand implementations.

pub mod print;
pub mod rename;
pub mod status;
pub mod switch;
pub mod util;
