//! CLI subcommand implementations.

pub mod convert;
pub mod inspect;
pub mod program;
pub mod resolve;
pub mod util;
