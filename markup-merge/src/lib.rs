//! Command-line plumbing around `markup-tree`.
//!
//! - [`rules`] loads comparator rules from TOML and folds in command-line
//!   overrides.
//! - [`report`] renders merge outcomes for the terminal.

pub mod report;
pub mod rules;
