//! Configuration management module

pub mod parser;
pub mod env;

pub use parser::{ConfigParser, load_config, display_config_summary};
pub use env::EnvManager;

pub use crate::models::Config;
