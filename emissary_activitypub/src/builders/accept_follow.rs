use serde::Serialize;
use serde_json::{Value as JsonValue};
use uuid::Uuid;

use crate::{
    actors::LocalActor,
    contexts::{build_default_context, Context},
    identifiers::local_accept_activity_id,
    vocabulary::ACCEPT,
};

#[derive(Serialize)]
pub struct AcceptFollow {
    #[serde(rename = "@context")]
    pub context: Context,

    #[serde(rename = "type")]
    pub activity_type: String,

    pub id: String,
    pub actor: String,
    // Original Follow activity
    pub object: JsonValue,

    pub to: Vec<String>,
}

pub fn build_accept_follow(
    local_actor: &LocalActor,
    follower_id: Uuid,
    follower_actor_id: &str,
    follow_activity: &JsonValue,
) -> AcceptFollow {
    // Accept(Follow) ID depends only on the follower record
    let activity_id = local_accept_activity_id(&local_actor.id, follower_id);
    AcceptFollow {
        context: build_default_context(),
        activity_type: ACCEPT.to_string(),
        id: activity_id,
        actor: local_actor.id.clone(),
        object: follow_activity.clone(),
        to: vec![follower_actor_id.to_string()],
    }
}
