//! CLI library components for Tabula.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
