use std::net::Ipv6Addr;

use log::{Level as LogLevel};
use serde::Deserialize;

use super::actors::{
    SearchDomainConfig,
    SearchQueryConfig,
    StreamConfig,
    UserConfig,
};
use super::environment::Environment;
use super::federation::FederationConfig;
use super::instance::Instance;

fn default_log_level() -> LogLevel { LogLevel::Info }

#[derive(Clone, Deserialize)]
pub struct Config {
    // Properties auto-populated from the environment
    #[serde(skip)]
    pub environment: Environment,

    #[serde(skip)]
    pub config_path: String,

    // Core settings
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    pub http_host: Option<String>,
    pub http_port: Option<u32>,

    // Domain name or <IP address>:<port>
    // URI scheme is optional
    pub(super) instance_url: String,

    #[serde(default)]
    pub federation: FederationConfig,

    // Domain-wide block rules
    #[serde(default)]
    pub blocked_instances: Vec<String>,

    #[serde(default)]
    pub users: Vec<UserConfig>,
    #[serde(default)]
    pub streams: Vec<StreamConfig>,
    #[serde(default)]
    pub search_queries: Vec<SearchQueryConfig>,
    #[serde(default)]
    pub search_domain: SearchDomainConfig,
}

impl Config {
    pub fn http_socket(&self) -> Option<String> {
        match (&self.http_host, self.http_port) {
            (Some(http_host), Some(http_port)) => {
                let socket = if http_host.parse::<Ipv6Addr>().is_ok() {
                    format!("[{http_host}]:{http_port}")
                } else {
                    format!("{http_host}:{http_port}")
                };
                Some(socket)
            },
            _ => None,
        }
    }

    pub fn try_instance(&self) -> Result<Instance, &'static str> {
        Instance::from_config(self)
    }

    /// Panics if instance URL has not been validated
    pub fn instance(&self) -> Instance {
        self.try_instance()
            .expect("instance URL should be already validated")
    }

    pub fn instance_url(&self) -> String {
        self.instance().url()
    }

    pub fn find_user(&self, username: &str) -> Option<&UserConfig> {
        self.users.iter().find(|user| user.username == username)
    }
}
