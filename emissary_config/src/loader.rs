use std::collections::HashSet;
use std::str::FromStr;

use regex::Regex;

use super::config::Config;
use super::environment::Environment;

struct EnvConfig {
    config_path: String,
    environment: Option<Environment>,
}

#[cfg(feature = "production")]
const DEFAULT_CONFIG_PATH: &str = "/etc/emissary/config.yaml";
#[cfg(not(feature = "production"))]
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

// Usernames and tokens appear in actor URLs
const LOCAL_NAME_RE: &str = r"^[A-Za-z0-9_\-]{1,100}$";

fn parse_env() -> EnvConfig {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
    let config_path = std::env::var("CONFIG_PATH")
        .unwrap_or(DEFAULT_CONFIG_PATH.to_string());
    let environment = std::env::var("ENVIRONMENT").ok()
        .map(|val| Environment::from_str(&val).expect("invalid environment type"));
    EnvConfig {
        config_path,
        environment,
    }
}

/// Returns list of warnings, or an error if config can't be used
pub fn validate_config(config: &Config) -> Result<Vec<String>, String> {
    let mut warnings = vec![];
    config.try_instance()
        .map_err(|error| format!("invalid instance URL: {error}"))?;
    if config.http_socket().is_none() {
        return Err("http_host and http_port must be specified".to_string());
    };
    if config.federation.collection_page_size == 0 {
        return Err("collection_page_size must be greater than zero".to_string());
    };
    let name_re = Regex::new(LOCAL_NAME_RE).expect("regexp should be valid");
    let mut usernames = HashSet::new();
    for user in config.users.iter() {
        if !name_re.is_match(&user.username) {
            return Err(format!("invalid username: {}", user.username));
        };
        if !usernames.insert(user.username.as_str()) {
            return Err(format!("duplicate username: {}", user.username));
        };
        if user.access_token.len() < 16 {
            warnings.push(format!("access token of {} is too short", user.username));
        };
    };
    let mut stream_tokens = HashSet::new();
    for stream in config.streams.iter() {
        if !name_re.is_match(&stream.token) {
            return Err(format!("invalid stream token: {}", stream.token));
        };
        if !stream_tokens.insert(stream.token.as_str()) {
            return Err(format!("duplicate stream token: {}", stream.token));
        };
        if !usernames.contains(stream.owner.as_str()) {
            return Err(format!("unknown stream owner: {}", stream.owner));
        };
    };
    let mut search_tokens = HashSet::new();
    for search_query in config.search_queries.iter() {
        if !name_re.is_match(&search_query.token) {
            return Err(format!("invalid search token: {}", search_query.token));
        };
        if !search_tokens.insert(search_query.token.as_str()) {
            return Err(format!("duplicate search token: {}", search_query.token));
        };
    };
    if !config.federation.enabled {
        warnings.push("federation is disabled".to_string());
    } else if !config.federation.require_signatures {
        warnings.push("unsigned inbox deliveries are accepted".to_string());
    };
    Ok(warnings)
}

pub fn parse_config() -> (Config, Vec<String>) {
    let env = parse_env();
    let config_yaml = std::fs::read_to_string(&env.config_path)
        .expect("failed to load config file");
    let mut config = serde_yaml::from_str::<Config>(&config_yaml)
        .expect("invalid yaml data");

    // Set parameters from environment
    config.config_path = env.config_path;
    if let Some(environment) = env.environment {
        // Overwrite default only if ENVIRONMENT variable is set
        config.environment = environment;
    };

    let warnings = match validate_config(&config) {
        Ok(warnings) => warnings,
        Err(error) => panic!("{error}"),
    };
    (config, warnings)
}
