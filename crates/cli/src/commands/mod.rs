//! Subcommand implementations

pub mod analysis;
pub mod herd;
pub mod predict;
