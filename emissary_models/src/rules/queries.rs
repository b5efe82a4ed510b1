use chrono::Utc;
use uuid::Uuid;

use crate::database::{
    utils::{datetime_to_cursor, paginate},
    DatabaseClient,
    DatabaseError,
};

use super::types::{Rule, RuleData, RuleType};

fn is_same_rule(
    rule: &Rule,
    user_id: Option<Uuid>,
    following_id: Option<Uuid>,
    rule_type: RuleType,
    trigger: &str,
) -> bool {
    rule.user_id == user_id &&
        rule.following_id == following_id &&
        rule.rule_type == rule_type &&
        rule.trigger == trigger
}

/// Saves rule unless an identical one exists.
/// Returns `true` if a new rule was added.
pub async fn create_rule(
    db_client: &DatabaseClient,
    rule_data: RuleData,
) -> Result<(Rule, bool), DatabaseError> {
    let mut tables = db_client.write().await;
    let maybe_rule = tables.rules.iter()
        .find(|rule| is_same_rule(
            rule,
            rule_data.user_id,
            rule_data.following_id,
            rule_data.rule_type,
            &rule_data.trigger,
        ));
    if let Some(rule) = maybe_rule {
        return Ok((rule.clone(), false));
    };
    let rule = Rule {
        id: Uuid::new_v4(),
        user_id: rule_data.user_id,
        following_id: rule_data.following_id,
        rule_type: rule_data.rule_type,
        trigger: rule_data.trigger,
        action: rule_data.action,
        label: rule_data.label,
        origin_url: rule_data.origin_url,
        is_public: rule_data.is_public,
        created_at: Utc::now(),
    };
    tables.rules.push(rule.clone());
    Ok((rule, true))
}

pub async fn find_rule(
    db_client: &DatabaseClient,
    user_id: Option<Uuid>,
    following_id: Option<Uuid>,
    rule_type: RuleType,
    trigger: &str,
) -> Result<Rule, DatabaseError> {
    let tables = db_client.read().await;
    tables.rules.iter()
        .find(|rule| is_same_rule(rule, user_id, following_id, rule_type, trigger))
        .cloned()
        .ok_or(DatabaseError::NotFound("rule"))
}

pub async fn delete_rule(
    db_client: &DatabaseClient,
    rule_id: Uuid,
) -> Result<(), DatabaseError> {
    let mut tables = db_client.write().await;
    let index = tables.rules.iter()
        .position(|rule| rule.id == rule_id)
        .ok_or(DatabaseError::NotFound("rule"))?;
    tables.rules.remove(index);
    Ok(())
}

/// Returns rules that apply to the given user.
/// Domain-wide rules are always included.
pub async fn get_rules(
    db_client: &DatabaseClient,
    maybe_user_id: Option<Uuid>,
) -> Result<Vec<Rule>, DatabaseError> {
    let tables = db_client.read().await;
    let rules = tables.rules.iter()
        .filter(|rule| rule.user_id.is_none() || rule.user_id == maybe_user_id)
        .cloned()
        .collect();
    Ok(rules)
}

/// Rules published by user (`blocked` collection)
pub async fn get_public_rules_page(
    db_client: &DatabaseClient,
    user_id: Uuid,
    before: i64,
    limit: u16,
) -> Result<Vec<Rule>, DatabaseError> {
    let tables = db_client.read().await;
    let rules = tables.rules.iter()
        .filter(|rule| {
            rule.user_id == Some(user_id) &&
                rule.following_id.is_none() &&
                rule.is_public
        })
        .cloned();
    let page = paginate(
        rules,
        |rule| datetime_to_cursor(&rule.created_at),
        before,
        limit,
    );
    Ok(page)
}

pub async fn get_public_rule_by_id(
    db_client: &DatabaseClient,
    user_id: Uuid,
    rule_id: Uuid,
) -> Result<Rule, DatabaseError> {
    let tables = db_client.read().await;
    tables.rules.iter()
        .find(|rule| {
            rule.id == rule_id &&
                rule.user_id == Some(user_id) &&
                rule.is_public
        })
        .cloned()
        .ok_or(DatabaseError::NotFound("rule"))
}
