use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use emissary_models::rules::types::{Rule, RuleType};

use crate::{
    contexts::{build_default_context, Context},
    identifiers::local_object_id,
    vocabulary::{APPLICATION, BLOCK, NOTE},
};

#[derive(Serialize)]
pub struct Block {
    #[serde(rename = "@context")]
    pub _context: Context,

    #[serde(rename = "type")]
    pub activity_type: String,

    pub id: String,
    pub actor: String,
    pub object: JsonValue,

    pub to: Vec<String>,
}

/// Object of a Block activity that reproduces the rule
/// when received by another server
fn blocked_object(rule: &Rule) -> JsonValue {
    match rule.rule_type {
        RuleType::Actor => json!(rule.trigger),
        RuleType::Domain => json!({
            "type": APPLICATION,
            "id": format!("https://{}", rule.trigger),
        }),
        RuleType::Content => json!({
            "type": NOTE,
            "content": rule.trigger,
        }),
    }
}

/// Builds Block activity from a public rule.
/// Activity ID is the ID of the rule in the "blocked" collection.
pub fn build_block(
    actor_id: &str,
    blocked_collection_id: &str,
    rule: &Rule,
    to: Vec<String>,
) -> Block {
    Block {
        _context: build_default_context(),
        activity_type: BLOCK.to_string(),
        id: local_object_id(blocked_collection_id, rule.id),
        actor: actor_id.to_string(),
        object: blocked_object(rule),
        to: to,
    }
}
