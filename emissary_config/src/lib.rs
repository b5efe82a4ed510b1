mod actors;
mod config;
mod environment;
mod federation;
mod instance;
mod loader;

pub use actors::{
    SearchDomainConfig,
    SearchQueryConfig,
    StreamConfig,
    UserConfig,
};
pub use config::Config;
pub use environment::Environment;
pub use federation::FederationConfig;
pub use instance::{parse_instance_url, Instance};
pub use loader::{parse_config, validate_config};

pub const SOFTWARE_NAME: &str = "Emissary";
pub const SOFTWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub struct ConfigError(&'static str);

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
