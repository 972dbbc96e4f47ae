//! Lane timer CLI library.
//!
//! This crate provides the `lt` command-line interface over `lt-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::Config;
