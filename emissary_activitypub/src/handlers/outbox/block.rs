//! Blocks published by a local user
use emissary_models::{
    database::DatabaseError,
    rules::queries::{create_rule, delete_rule, find_rule, get_public_rule_by_id},
    rules::types::{Rule, RuleAction, RuleData},
};

use crate::{
    builders::block::build_block,
    builders::undo::build_undo,
    deliverer::send_activity,
    document::Document,
    errors::HandlerError,
    handlers::objects::rule_from_blocked_object,
    identifiers::{parse_local_object_id, LocalActorCollection},
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, OutboxContext},
};

/// Block creates a public rule. Followers receive the block.
pub async fn handle_block(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let local_actor = context.activitypub_actor()?;
    let (rule_type, trigger) = rule_from_blocked_object(&activity.object())?;
    let (rule, is_new) = create_rule(factory.db_client(), RuleData {
        user_id: Some(context.user.id),
        following_id: None,
        rule_type,
        trigger,
        action: RuleAction::Block,
        label: None,
        origin_url: None,
        is_public: true,
    }).await?;
    if !is_new {
        return Ok(Outcome::Ignored("rule already exists"));
    };
    let block = build_block(
        &local_actor.id,
        &local_actor.collection(LocalActorCollection::Blocked),
        &rule,
        vec![local_actor.followers()],
    );
    let block_id = block.id.clone();
    send_activity(factory, &local_actor, block).await?;
    Ok(Outcome::Created {
        descriptor: Descriptor::object(format!("{rule_type:?}")),
        location: block_id,
    })
}

async fn find_block_rule(
    context: &OutboxContext,
    block: &Document,
) -> Result<Rule, HandlerError> {
    let db_client = context.factory().db_client();
    let local_actor = context.activitypub_actor()?;
    let collection_id = local_actor.collection(LocalActorCollection::Blocked);
    let maybe_rule_id = block.id()
        .and_then(|block_id| parse_local_object_id(&collection_id, &block_id));
    let rule = if let Some(rule_id) = maybe_rule_id {
        get_public_rule_by_id(db_client, context.user.id, rule_id).await?
    } else {
        let (rule_type, trigger) = rule_from_blocked_object(&block.object())?;
        find_rule(db_client, Some(context.user.id), None, rule_type, &trigger).await?
    };
    Ok(rule)
}

/// Undo(Block). Block can be referenced by ID or described by its object.
pub async fn handle_undo_block(
    context: &OutboxContext,
    activity: Document,
) -> HandlerResult {
    let factory = context.factory();
    let local_actor = context.activitypub_actor()?;
    let rule = match find_block_rule(context, &activity.object()).await {
        Ok(rule) => rule,
        Err(HandlerError::DatabaseError(DatabaseError::NotFound(_))) => {
            return Ok(Outcome::Ignored("rule not found"));
        },
        Err(other_error) => return Err(other_error),
    };
    delete_rule(factory.db_client(), rule.id).await?;
    let followers = vec![local_actor.followers()];
    let block = build_block(
        &local_actor.id,
        &local_actor.collection(LocalActorCollection::Blocked),
        &rule,
        followers.clone(),
    );
    let undo = build_undo(
        &local_actor.id,
        &block.id,
        serde_json::to_value(&block)?,
        followers,
    );
    send_activity(factory, &local_actor, undo).await?;
    Ok(Outcome::Processed(Descriptor::object(format!("{:?}", rule.rule_type))))
}
