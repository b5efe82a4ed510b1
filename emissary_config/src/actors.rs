//! Local actors declared in the configuration file.
//!
//! Account management screens are not part of the federation core,
//! so users, streams and search actors are provisioned from here.
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub display_name: Option<String>,
    pub summary: Option<String>,
    pub icon_url: Option<String>,
    // Bearer token for client-to-server outbox requests
    pub access_token: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StreamConfig {
    pub token: String,
    // Username of the owner
    pub owner: String,
    pub name: String,
    pub summary: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SearchQueryConfig {
    pub token: String,
    pub query: String,
}

const fn default_search_domain_enabled() -> bool { true }

fn default_search_domain_name() -> String { "Search".to_string() }

#[derive(Clone, Debug, Deserialize)]
pub struct SearchDomainConfig {
    #[serde(default = "default_search_domain_enabled")]
    pub enabled: bool,
    #[serde(default = "default_search_domain_name")]
    pub name: String,
}

impl Default for SearchDomainConfig {
    fn default() -> Self {
        Self {
            enabled: default_search_domain_enabled(),
            name: default_search_domain_name(),
        }
    }
}
