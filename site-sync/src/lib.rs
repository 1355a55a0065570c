pub mod cli;
pub mod load_config;
pub mod report;
pub mod upload;

pub use cli::{run, Cli, Commands};
