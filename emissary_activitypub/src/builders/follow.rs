use serde::Serialize;
use uuid::Uuid;

use crate::{
    contexts::{build_default_context, Context},
    identifiers::local_follow_activity_id,
    vocabulary::FOLLOW,
};

#[derive(Serialize)]
pub struct Follow {
    #[serde(rename = "@context")]
    pub _context: Context,

    #[serde(rename = "type")]
    pub activity_type: String,

    pub id: String,
    pub actor: String,
    pub object: String,

    pub to: Vec<String>,
}

pub fn build_follow(
    actor_id: &str,
    following_id: Uuid,
    target_actor_id: &str,
) -> Follow {
    Follow {
        _context: build_default_context(),
        activity_type: FOLLOW.to_string(),
        id: local_follow_activity_id(actor_id, following_id),
        actor: actor_id.to_string(),
        object: target_actor_id.to_string(),
        to: vec![target_actor_id.to_string()],
    }
}
