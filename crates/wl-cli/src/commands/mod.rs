//! CLI subcommand implementations.

pub mod awards;
pub mod delete;
pub mod evaluate;
pub mod export;
pub mod import;
pub mod list;
pub mod log;
pub mod status;
pub mod util;
