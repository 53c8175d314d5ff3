//! Configuration management for pimctl

mod paths;
mod settings;

pub use paths::{ConfigPaths, CONFIG_DIR_ENV};
pub use settings::Config;
