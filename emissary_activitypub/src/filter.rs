use url::Url;
use uuid::Uuid;
use wildmatch::WildMatch;

use emissary_models::{
    database::{DatabaseClient, DatabaseError},
    rules::queries::get_rules,
    rules::types::{Rule, RuleAction, RuleType},
};

use crate::document::Document;

#[derive(Clone, Debug, PartialEq)]
pub enum FilterResult {
    Allow,
    Label(String),
    Mute,
    Block,
}

fn get_hostname(url: &str) -> Option<String> {
    Url::parse(url).ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()))
}

/// Evaluates moderation rules against inbound activities.
/// Rules are loaded once, when the filter is created.
pub struct RuleFilter {
    rules: Vec<Rule>,
}

impl RuleFilter {
    /// Creates filter for a user, or domain-wide filter if user is not set.
    /// In "blocks only" mode, rules with other actions are not loaded.
    pub async fn new(
        db_client: &DatabaseClient,
        maybe_user_id: Option<Uuid>,
        blocks_only: bool,
    ) -> Result<Self, DatabaseError> {
        let rules = get_rules(db_client, maybe_user_id).await?
            .into_iter()
            .filter(|rule| match rule.action {
                RuleAction::Ignore => false,
                RuleAction::Block => true,
                RuleAction::Label | RuleAction::Mute => !blocks_only,
            })
            .collect();
        Ok(Self { rules })
    }

    fn matches(rule: &Rule, activity: &Document) -> bool {
        let actor = activity.actor();
        let object = activity.object();
        let mut actor_ids = vec![];
        actor_ids.extend(actor.id());
        actor_ids.extend(object.attributed_to().id());
        match rule.rule_type {
            RuleType::Actor => {
                actor_ids.iter().any(|actor_id| *actor_id == rule.trigger)
            },
            RuleType::Domain => {
                let pattern = WildMatch::new(&rule.trigger);
                actor_ids.iter()
                    .chain(object.id().iter())
                    .filter_map(|url| get_hostname(url))
                    .any(|hostname| pattern.matches(&hostname))
            },
            RuleType::Content => {
                let trigger = rule.trigger.to_lowercase();
                [object.content(), object.name()].into_iter()
                    .flatten()
                    .any(|text| text.to_lowercase().contains(&trigger))
            },
        }
    }

    /// Returns the strictest action among matching rules
    pub fn check(&self, activity: &Document) -> FilterResult {
        let mut result = FilterResult::Allow;
        for rule in self.rules.iter() {
            if !Self::matches(rule, activity) {
                continue;
            };
            match rule.action {
                RuleAction::Block => return FilterResult::Block,
                RuleAction::Mute => result = FilterResult::Mute,
                RuleAction::Label if result == FilterResult::Allow => {
                    let label = rule.label.clone()
                        .unwrap_or(rule.trigger.clone());
                    result = FilterResult::Label(label);
                },
                _ => (),
            };
        };
        result
    }

    pub fn disallow(&self, activity: &Document) -> bool {
        self.check(activity) == FilterResult::Block
    }
}
