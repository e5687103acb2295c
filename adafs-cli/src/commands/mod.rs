//! CLI subcommands.

pub mod mount;
pub mod tree;
