//! md5-rs library
//!
//! Command implementations for the md5-rs binary, kept in a library so the
//! integration tests and the binary share them.

pub mod cli;
pub mod commands;
pub mod utils;
