//! Subcommand modules for the `hspsyn` binary.

pub mod block;
pub mod score;
