//! Shared utilities for the wbs CLI

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
