use log::Level;

use emissary_config::{
    parse_config,
    Config,
    SOFTWARE_NAME,
    SOFTWARE_VERSION,
};
use emissary_models::{
    database::{DatabaseClient, DatabaseError},
    rules::queries::create_rule,
    rules::types::{RuleData, RuleType},
    searches::queries::{create_search_query, get_search_query_by_token},
    streams::queries::{create_stream, get_stream_by_token},
    streams::types::StreamCreateData,
    users::queries::{create_user, get_user_by_name, update_user},
    users::types::UserCreateData,
};

use crate::logger::configure_logger;

pub fn initialize_app(
    override_log_level: Option<Level>,
) -> Config {
    let (config, config_warnings) = parse_config();
    let log_level = override_log_level.unwrap_or(config.log_level);
    configure_logger(log_level);
    log::info!(
        "{} v{}, environment = '{:?}'",
        SOFTWARE_NAME,
        SOFTWARE_VERSION,
        config.environment,
    );
    log::info!("config loaded from {}", config.config_path);
    for warning in config_warnings {
        log::warn!("{}", warning);
    };
    config
}

/// Creates local actors and domain-wide rules listed in config.
/// Existing users are updated, other records are left as is.
pub async fn seed_database(
    db_client: &DatabaseClient,
    config: &Config,
) -> Result<(), DatabaseError> {
    for user_config in config.users.iter() {
        let user_data = UserCreateData {
            username: user_config.username.clone(),
            display_name: user_config.display_name.clone(),
            summary: user_config.summary.clone(),
            icon_url: user_config.icon_url.clone(),
            access_token: user_config.access_token.clone(),
        };
        match get_user_by_name(db_client, &user_config.username).await {
            Ok(user) => {
                update_user(db_client, user.id, user_data).await?;
            },
            Err(DatabaseError::NotFound(_)) => {
                let user = create_user(db_client, user_data).await?;
                log::info!("created user {}", user.username);
            },
            Err(other_error) => return Err(other_error),
        };
    };
    for stream_config in config.streams.iter() {
        match get_stream_by_token(db_client, &stream_config.token).await {
            Ok(_) => continue,
            Err(DatabaseError::NotFound(_)) => (),
            Err(other_error) => return Err(other_error),
        };
        let owner = get_user_by_name(db_client, &stream_config.owner).await?;
        let stream_data = StreamCreateData {
            token: stream_config.token.clone(),
            owner_id: owner.id,
            name: stream_config.name.clone(),
            summary: stream_config.summary.clone(),
        };
        let stream = create_stream(db_client, stream_data).await?;
        log::info!("created stream {}", stream.token);
    };
    for search_config in config.search_queries.iter() {
        match get_search_query_by_token(db_client, &search_config.token).await {
            Ok(_) => continue,
            Err(DatabaseError::NotFound(_)) => (),
            Err(other_error) => return Err(other_error),
        };
        create_search_query(
            db_client,
            &search_config.token,
            &search_config.query,
        ).await?;
        log::info!("created search query {}", search_config.token);
    };
    for hostname in config.blocked_instances.iter() {
        let rule_data = RuleData::block(RuleType::Domain, hostname);
        let (_, is_new) = create_rule(db_client, rule_data).await?;
        if is_new {
            log::info!("blocked instance {}", hostname);
        };
    };
    Ok(())
}
