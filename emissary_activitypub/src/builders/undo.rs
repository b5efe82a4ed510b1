use serde::Serialize;
use serde_json::{Value as JsonValue};

use crate::{
    contexts::{build_default_context, Context},
    vocabulary::UNDO,
};

#[derive(Serialize)]
pub struct Undo {
    #[serde(rename = "@context")]
    pub _context: Context,

    #[serde(rename = "type")]
    pub activity_type: String,

    pub id: String,
    pub actor: String,
    pub object: JsonValue,

    pub to: Vec<String>,
}

/// Undo ID is derived from the ID of the undone activity
pub fn build_undo(
    actor_id: &str,
    activity_id: &str,
    activity: JsonValue,
    to: Vec<String>,
) -> Undo {
    Undo {
        _context: build_default_context(),
        activity_type: UNDO.to_string(),
        id: format!("{activity_id}/undo"),
        actor: actor_id.to_string(),
        object: activity,
        to: to,
    }
}
