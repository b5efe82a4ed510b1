use super::{
    Config,
    Environment,
    FederationConfig,
    SearchDomainConfig,
    SearchQueryConfig,
    StreamConfig,
    UserConfig,
};

pub const TEST_INSTANCE_URL: &str = "https://local.example";

pub fn create_test_config() -> Config {
    Config {
        environment: Environment::Development,
        config_path: "config.yaml".to_string(),
        log_level: log::Level::Debug,
        http_host: Some("127.0.0.1".to_string()),
        http_port: Some(8380),
        instance_url: TEST_INSTANCE_URL.to_string(),
        federation: FederationConfig::default(),
        blocked_instances: vec![],
        users: vec![UserConfig {
            username: "alice".to_string(),
            display_name: Some("Alice".to_string()),
            summary: None,
            icon_url: None,
            access_token: "alice-access-token-0001".to_string(),
        }],
        streams: vec![StreamConfig {
            token: "news".to_string(),
            owner: "alice".to_string(),
            name: "News".to_string(),
            summary: None,
        }],
        search_queries: vec![SearchQueryConfig {
            token: "rust".to_string(),
            query: "#rust".to_string(),
        }],
        search_domain: SearchDomainConfig::default(),
    }
}
