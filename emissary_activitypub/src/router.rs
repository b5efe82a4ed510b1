//! Dispatch of activities by (activity type, object type) pairs.
use std::collections::HashMap;
use std::fmt;

use futures::future::LocalBoxFuture;
use serde_json::{Value as JsonValue};

use crate::{
    document::Document,
    errors::HandlerError,
    vocabulary::*,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Accept,
    Announce,
    Block,
    Create,
    Delete,
    Dislike,
    Follow,
    Like,
    Move,
    Undo,
    Update,
    Any,
}

impl ActivityKind {
    fn from_type(activity_type: &str) -> Option<Self> {
        let kind = match activity_type {
            ACCEPT => Self::Accept,
            ANNOUNCE => Self::Announce,
            BLOCK => Self::Block,
            CREATE => Self::Create,
            DELETE => Self::Delete,
            DISLIKE => Self::Dislike,
            FOLLOW => Self::Follow,
            LIKE => Self::Like,
            MOVE => Self::Move,
            UNDO => Self::Undo,
            UPDATE => Self::Update,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    // Activities
    Announce,
    Block,
    Dislike,
    Follow,
    Like,
    // Actors
    Application,
    Group,
    Organization,
    Person,
    Service,
    // Content
    Article,
    Note,
    Page,
    // MLS
    GroupInfo,
    KeyPackage,
    PrivateMessage,
    PublicMessage,
    Welcome,
    Any,
}

impl ObjectKind {
    fn from_type(object_type: &str) -> Option<Self> {
        let kind = match object_type {
            ANNOUNCE => Self::Announce,
            BLOCK => Self::Block,
            DISLIKE => Self::Dislike,
            FOLLOW => Self::Follow,
            LIKE => Self::Like,
            APPLICATION => Self::Application,
            GROUP => Self::Group,
            ORGANIZATION => Self::Organization,
            PERSON => Self::Person,
            SERVICE => Self::Service,
            ARTICLE => Self::Article,
            NOTE => Self::Note,
            PAGE => Self::Page,
            GROUP_INFO => Self::GroupInfo,
            KEY_PACKAGE => Self::KeyPackage,
            PRIVATE_MESSAGE => Self::PrivateMessage,
            PUBLIC_MESSAGE => Self::PublicMessage,
            WELCOME => Self::Welcome,
            _ => return None,
        };
        Some(kind)
    }
}

pub enum Descriptor {
    Object(String),
    Target(String),
}

impl Descriptor {
    pub fn object(object_type: impl ToString) -> Self {
        Self::Object(object_type.to_string())
    }

    pub fn target(target_prop: &'static str) -> Self {
        Self::Target(target_prop.to_string())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(object) => write!(formatter, "{object}"),
            Self::Target(target) => write!(formatter, "target: {target}"),
        }
    }
}

/// Result of successful dispatch
pub enum Outcome {
    Processed(Descriptor),
    /// New object was created at the given location
    Created {
        descriptor: Descriptor,
        location: String,
    },
    /// Processing will continue in background
    Queued(Descriptor),
    /// Activity was recognized but intentionally not processed
    Ignored(&'static str),
}

impl Outcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

pub type HandlerResult = Result<Outcome, HandlerError>;

pub type HandlerFn<C> = for<'a> fn(&'a C, Document) -> LocalBoxFuture<'a, HandlerResult>;

/// Check performed before dispatch
pub trait ActivityValidator {
    fn validate(&self, activity: &Document) -> Result<(), HandlerError>;
}

pub struct Router<C> {
    handlers: HashMap<(ActivityKind, ObjectKind), (&'static str, HandlerFn<C>)>,
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self { handlers: HashMap::new() }
    }
}

impl<C> Router<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers handler. Later registration for the same pair replaces
    /// the earlier one.
    pub fn add(
        &mut self,
        activity_kind: ActivityKind,
        object_kind: ObjectKind,
        name: &'static str,
        handler: HandlerFn<C>,
    ) -> () {
        let previous = self.handlers.insert(
            (activity_kind, object_kind),
            (name, handler),
        );
        if let Some((previous_name, _)) = previous {
            log::warn!("handler {previous_name} replaced by {name}");
        };
    }

    pub fn is_registered(
        &self,
        activity_kind: ActivityKind,
        object_kind: ObjectKind,
    ) -> bool {
        self.handlers.contains_key(&(activity_kind, object_kind))
    }

    fn resolve(
        &self,
        activity: &Document,
    ) -> Option<&(&'static str, HandlerFn<C>)> {
        let activity_kind = activity.document_type()
            .and_then(ActivityKind::from_type);
        let object_kind = activity.object().document_type()
            .and_then(ObjectKind::from_type);
        let mut candidates = vec![];
        if let Some(activity_kind) = activity_kind {
            if let Some(object_kind) = object_kind {
                candidates.push((activity_kind, object_kind));
            };
            candidates.push((activity_kind, ObjectKind::Any));
        };
        candidates.push((ActivityKind::Any, ObjectKind::Any));
        candidates.into_iter()
            .find_map(|key| self.handlers.get(&key))
    }

    /// Executes the most specific handler registered for the activity
    pub async fn handle(
        &self,
        context: &C,
        activity: Document,
    ) -> HandlerResult {
        let activity_type = activity.document_type()
            .ok_or(HandlerError::ValidationError("type property is missing".to_string()))?
            .to_string();
        let actor_id = activity.actor().id().unwrap_or_default();
        let Some((name, handler)) = self.resolve(&activity) else {
            log::warn!(
                "activity type is not supported: {}({})",
                activity_type,
                activity.object().document_type().unwrap_or("-"),
            );
            return Ok(Outcome::Ignored("unknown activity"));
        };
        let outcome = handler(context, activity).await
            .map_err(|error| error.within(name))?;
        match outcome {
            Outcome::Processed(ref descriptor) |
                Outcome::Created { ref descriptor, .. } |
                Outcome::Queued(ref descriptor) =>
            {
                log::info!(
                    "processed {}({}) from {}",
                    activity_type,
                    descriptor,
                    actor_id,
                );
            },
            Outcome::Ignored(reason) => {
                log::info!(
                    "ignored {} from {}: {}",
                    activity_type,
                    actor_id,
                    reason,
                );
            },
        };
        Ok(outcome)
    }

    /// Parses request body, runs validators and dispatches activity
    pub async fn receive_and_handle(
        &self,
        context: &C,
        request_body: &[u8],
        validators: &[&dyn ActivityValidator],
    ) -> HandlerResult {
        let activity_json: JsonValue = serde_json::from_slice(request_body)?;
        if !activity_json.is_object() {
            return Err(HandlerError::ValidationError("activity is not an object".to_string()));
        };
        let activity = Document::new(activity_json);
        for validator in validators {
            validator.validate(&activity)?;
        };
        self.handle(context, activity).await
    }
}

#[cfg(test)]
mod tests {
    use futures::future::FutureExt;
    use serde_json::json;
    use super::*;

    struct TestContext;

    async fn handle_follow(_context: &TestContext, _activity: Document) -> HandlerResult {
        Ok(Outcome::Processed(Descriptor::object("follow")))
    }

    async fn handle_undo(_context: &TestContext, _activity: Document) -> HandlerResult {
        Ok(Outcome::Processed(Descriptor::object("undo")))
    }

    async fn handle_undo_follow(_context: &TestContext, _activity: Document) -> HandlerResult {
        Ok(Outcome::Processed(Descriptor::object("undo follow")))
    }

    async fn handle_any(_context: &TestContext, _activity: Document) -> HandlerResult {
        Ok(Outcome::Ignored("wildcard"))
    }

    async fn handle_failure(_context: &TestContext, _activity: Document) -> HandlerResult {
        Err(HandlerError::Forbidden("blocked".to_string()))
    }

    fn build_test_router() -> Router<TestContext> {
        let mut router = Router::new();
        router.add(ActivityKind::Follow, ObjectKind::Any, "follow",
            |context, activity| handle_follow(context, activity).boxed_local());
        router.add(ActivityKind::Undo, ObjectKind::Any, "undo",
            |context, activity| handle_undo(context, activity).boxed_local());
        router.add(ActivityKind::Undo, ObjectKind::Follow, "undo_follow",
            |context, activity| handle_undo_follow(context, activity).boxed_local());
        router.add(ActivityKind::Block, ObjectKind::Any, "block",
            |context, activity| handle_failure(context, activity).boxed_local());
        router
    }

    fn descriptor_of(outcome: Outcome) -> String {
        match outcome {
            Outcome::Processed(descriptor) => descriptor.to_string(),
            _ => panic!("unexpected outcome"),
        }
    }

    #[tokio::test]
    async fn test_router_exact_match() {
        let router = build_test_router();
        let activity = Document::new(json!({
            "type": "Undo",
            "actor": "https://remote.example/users/1",
            "object": {"type": "Follow"},
        }));
        let outcome = router.handle(&TestContext, activity).await.unwrap();
        assert_eq!(descriptor_of(outcome), "undo follow");
    }

    #[tokio::test]
    async fn test_router_object_wildcard() {
        let router = build_test_router();
        let activity = Document::new(json!({
            "type": "Undo",
            "actor": "https://remote.example/users/1",
            "object": {"type": "Like"},
        }));
        let outcome = router.handle(&TestContext, activity).await.unwrap();
        assert_eq!(descriptor_of(outcome), "undo");

        // Object is a reference
        let activity = Document::new(json!({
            "type": "Undo",
            "actor": "https://remote.example/users/1",
            "object": "https://remote.example/activities/1",
        }));
        let outcome = router.handle(&TestContext, activity).await.unwrap();
        assert_eq!(descriptor_of(outcome), "undo");
    }

    #[tokio::test]
    async fn test_router_unknown_activity() {
        let router = build_test_router();
        let activity = Document::new(json!({
            "type": "Listen",
            "actor": "https://remote.example/users/1",
        }));
        let outcome = router.handle(&TestContext, activity).await.unwrap();
        assert!(matches!(outcome, Outcome::Ignored("unknown activity")));
    }

    #[tokio::test]
    async fn test_router_any_any_fallback() {
        let mut router = build_test_router();
        router.add(ActivityKind::Any, ObjectKind::Any, "any",
            |context, activity| handle_any(context, activity).boxed_local());
        let activity = Document::new(json!({
            "type": "Listen",
            "actor": "https://remote.example/users/1",
        }));
        let outcome = router.handle(&TestContext, activity).await.unwrap();
        assert!(matches!(outcome, Outcome::Ignored("wildcard")));
    }

    #[tokio::test]
    async fn test_router_error_wrapped() {
        let router = build_test_router();
        let activity = Document::new(json!({
            "type": "Block",
            "actor": "https://remote.example/users/1",
            "object": "https://social.example/users/1",
        }));
        let error = router.handle(&TestContext, activity).await.err().unwrap();
        assert_eq!(error.to_string(), "block: blocked");
        assert_eq!(error.kind(), crate::errors::ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_receive_and_handle_invalid_json() {
        let router = build_test_router();
        let error = router.receive_and_handle(&TestContext, b"{", &[])
            .await.err().unwrap();
        assert_eq!(error.kind(), crate::errors::ErrorKind::BadRequest);
    }
}
