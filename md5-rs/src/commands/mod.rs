//! Subcommand implementations

pub mod info;
pub mod pose;
pub mod tree;
pub mod validate;
