//! Undo with an object that could not be routed by type
use crate::{
    document::Document,
    router::{HandlerResult, Outcome},
    scopes::{ActorContext, UserContext},
    vocabulary::{ANNOUNCE, BLOCK, DISLIKE, FOLLOW, LIKE},
};

use super::{
    block::handle_undo_block,
    follow::handle_undo_follow,
    response::handle_undo_response,
};

/// Dereferences the undone activity and routes by its type
pub async fn handle_undo<C: ActorContext>(
    context: &C,
    activity: Document,
) -> HandlerResult {
    let original = context.factory().activity_cache()
        .load_document(&activity.object()).await?;
    let activity = activity.with_property("object", original.into_value());
    match activity.object().document_type() {
        Some(FOLLOW) => handle_undo_follow(context, activity).await,
        Some(LIKE | DISLIKE | ANNOUNCE) => handle_undo_response(context, activity).await,
        _ => Ok(Outcome::Ignored("undone activity is not supported")),
    }
}

pub async fn handle_user_undo(
    context: &UserContext,
    activity: Document,
) -> HandlerResult {
    let original = context.factory().activity_cache()
        .load_document(&activity.object()).await?;
    if original.document_type() == Some(BLOCK) {
        let activity = activity.with_property("object", original.into_value());
        return handle_undo_block(context, activity).await;
    };
    handle_undo(context, activity).await
}
