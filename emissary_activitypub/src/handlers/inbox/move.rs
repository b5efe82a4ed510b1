use emissary_models::{
    database::DatabaseError,
    following::queries::get_following_by_profile_url,
};

use crate::{
    document::Document,
    errors::HandlerError,
    queues::FollowingMigrationJobData,
    router::{Descriptor, HandlerResult, Outcome},
    scopes::{ActorContext, UserContext},
    vocabulary::PERSON,
};

/// Move(Person). Migration is performed by a background job.
pub async fn handle_move(
    context: &UserContext,
    activity: Document,
) -> HandlerResult {
    let db_client = context.factory().db_client();
    let actor_id = activity.actor().id()
        .ok_or(HandlerError::ValidationError("actor is missing".to_string()))?;
    if activity.object().id().as_ref() != Some(&actor_id) {
        return Err(HandlerError::Forbidden("actor can only move itself".to_string()));
    };
    let target_id = activity.target().id()
        .ok_or(HandlerError::ValidationError("target is missing".to_string()))?;
    match get_following_by_profile_url(db_client, context.user.id, &actor_id).await {
        Ok(_) => (),
        Err(DatabaseError::NotFound(_)) => return Ok(Outcome::Ignored("sender is not followed")),
        Err(other_error) => return Err(other_error.into()),
    };
    FollowingMigrationJobData {
        user_id: context.user.id,
        old_actor_id: actor_id,
        new_actor_id: target_id,
    }.into_job(db_client, 0).await?;
    Ok(Outcome::Queued(Descriptor::object(PERSON)))
}
