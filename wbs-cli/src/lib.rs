//! Shared pieces of the `wbs` command line tool

pub mod cli;
pub mod commands;
pub mod utils;
