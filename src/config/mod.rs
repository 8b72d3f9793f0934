#[cfg(feature = "cli")]
pub mod cli;
pub mod rest;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use rest::RestConfig;
pub use toml_config::DataSourceConfig;
