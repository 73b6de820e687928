//! Command-line interface

pub mod args;
pub mod post;

pub use args::Cli;
