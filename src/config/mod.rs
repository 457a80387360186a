mod config;
mod project;

pub use config::Config;
pub use project::*;
