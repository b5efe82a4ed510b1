use emissary_models::{
    database::DatabaseError,
    following::queries::get_following_by_profile_url,
    following::types::Following,
    rules::queries::{create_rule, delete_rule, find_rule},
    rules::types::{RuleAction, RuleData},
};

use crate::{
    document::Document,
    errors::HandlerError,
    handlers::objects::rule_from_blocked_object,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, UserContext},
};

/// Returns following record if rules from the sender are accepted
async fn get_rule_source(
    context: &UserContext,
    activity: &Document,
) -> Result<Option<Following>, HandlerError> {
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    let following = match get_following_by_profile_url(
        context.factory().db_client(),
        context.user.id,
        &actor_id,
    ).await {
        Ok(following) => following,
        Err(DatabaseError::NotFound(_)) => return Ok(None),
        Err(other_error) => return Err(other_error.into()),
    };
    if following.rule_action == RuleAction::Ignore {
        return Ok(None);
    };
    Ok(Some(following))
}

pub async fn handle_block(
    context: &UserContext,
    activity: Document,
) -> HandlerResult {
    let Some(following) = get_rule_source(context, &activity).await? else {
        return Ok(Outcome::Ignored("rules from sender are not accepted"));
    };
    if activity.object().is_empty() {
        return Ok(Outcome::Ignored("block object is missing"));
    };
    let (rule_type, trigger) = rule_from_blocked_object(&activity.object())?;
    let (_, is_new) = create_rule(context.factory().db_client(), RuleData {
        user_id: Some(context.user.id),
        following_id: Some(following.id),
        rule_type,
        trigger,
        action: following.rule_action,
        label: following.name.clone(),
        origin_url: Some(following.profile_url.clone()),
        is_public: false,
    }).await?;
    if !is_new {
        return Ok(Outcome::Ignored("rule already exists"));
    };
    Ok(Outcome::Processed(Descriptor::object(format!("{rule_type:?}"))))
}

pub async fn handle_undo_block(
    context: &UserContext,
    activity: Document,
) -> HandlerResult {
    let block = context.factory().activity_cache()
        .load_document(&activity.object()).await?;
    if block.actor().id() != activity.actor().id() {
        return Err(HandlerError::Unauthorized("only author can undo block".to_string()));
    };
    let Some(following) = get_rule_source(context, &activity).await? else {
        return Ok(Outcome::Ignored("rules from sender are not accepted"));
    };
    if block.object().is_empty() {
        return Ok(Outcome::Ignored("block object is missing"));
    };
    let (rule_type, trigger) = rule_from_blocked_object(&block.object())?;
    let rule = match find_rule(
        context.factory().db_client(),
        Some(context.user.id),
        Some(following.id),
        rule_type,
        &trigger,
    ).await {
        Ok(rule) => rule,
        Err(DatabaseError::NotFound(_)) => return Ok(Outcome::Ignored("rule not found")),
        Err(other_error) => return Err(other_error.into()),
    };
    delete_rule(context.factory().db_client(), rule.id).await?;
    Ok(Outcome::Processed(Descriptor::object(format!("{rule_type:?}"))))
}
