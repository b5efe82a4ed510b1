//! Inbox routers, one per federation scope
use futures::future::FutureExt;

use crate::{
    router::{ActivityKind, ObjectKind, Router},
    scopes::{
        ActorContext,
        SearchDomainContext,
        SearchQueryContext,
        StreamContext,
        UserContext,
    },
};

mod accept;
mod block;
mod create;
mod delete;
mod follow;
mod mls;
mod r#move;
mod response;
mod undo;

use accept::handle_accept_follow;
use block::{handle_block, handle_undo_block};
use create::handle_create;
use delete::{handle_delete, handle_delete_actor};
use follow::{handle_follow, handle_undo_follow};
use mls::handle_mls_message;
use r#move::handle_move;
use response::{handle_stream_response, handle_undo_response, handle_user_response};
use undo::{handle_undo, handle_user_undo};

const RESPONSE_KINDS: [ObjectKind; 3] = [
    ObjectKind::Like,
    ObjectKind::Dislike,
    ObjectKind::Announce,
];

/// Handlers shared by all scopes
fn add_common_handlers<C: ActorContext + 'static>(router: &mut Router<C>) -> () {
    router.add(ActivityKind::Follow, ObjectKind::Any, "follow",
        |context, activity| handle_follow(context, activity).boxed_local());
    router.add(ActivityKind::Undo, ObjectKind::Follow, "undo_follow",
        |context, activity| handle_undo_follow(context, activity).boxed_local());
    router.add(ActivityKind::Delete, ObjectKind::Follow, "undo_follow",
        |context, activity| handle_undo_follow(context, activity).boxed_local());
    router.add(ActivityKind::Delete, ObjectKind::Any, "delete",
        |context, activity| handle_delete(context, activity).boxed_local());
    router.add(ActivityKind::Delete, ObjectKind::Person, "delete_actor",
        |context, activity| handle_delete_actor(context, activity).boxed_local());
}

pub fn build_user_inbox_router() -> Router<UserContext> {
    let mut router = Router::new();
    add_common_handlers(&mut router);
    router.add(ActivityKind::Accept, ObjectKind::Follow, "accept_follow",
        |context, activity| handle_accept_follow(context, activity).boxed_local());
    router.add(ActivityKind::Accept, ObjectKind::Any, "accept_follow",
        |context, activity| handle_accept_follow(context, activity).boxed_local());
    router.add(ActivityKind::Create, ObjectKind::Any, "create",
        |context, activity| handle_create(context, activity).boxed_local());
    router.add(ActivityKind::Update, ObjectKind::Any, "update",
        |context, activity| handle_create(context, activity).boxed_local());
    for object_kind in [
        ObjectKind::PrivateMessage,
        ObjectKind::PublicMessage,
        ObjectKind::Welcome,
        ObjectKind::GroupInfo,
    ] {
        router.add(ActivityKind::Create, object_kind, "mls_message",
            |context, activity| handle_mls_message(context, activity).boxed_local());
    };
    for activity_kind in [ActivityKind::Like, ActivityKind::Dislike, ActivityKind::Announce] {
        router.add(activity_kind, ObjectKind::Any, "response",
            |context, activity| handle_user_response(context, activity).boxed_local());
    };
    for object_kind in RESPONSE_KINDS {
        router.add(ActivityKind::Undo, object_kind, "undo_response",
            |context, activity| handle_undo_response(context, activity).boxed_local());
        router.add(ActivityKind::Delete, object_kind, "undo_response",
            |context, activity| handle_undo_response(context, activity).boxed_local());
    };
    router.add(ActivityKind::Block, ObjectKind::Any, "block",
        |context, activity| handle_block(context, activity).boxed_local());
    router.add(ActivityKind::Undo, ObjectKind::Block, "undo_block",
        |context, activity| handle_undo_block(context, activity).boxed_local());
    router.add(ActivityKind::Undo, ObjectKind::Any, "undo",
        |context, activity| handle_user_undo(context, activity).boxed_local());
    router.add(ActivityKind::Move, ObjectKind::Any, "move",
        |context, activity| handle_move(context, activity).boxed_local());
    router
}

pub fn build_stream_inbox_router() -> Router<StreamContext> {
    let mut router = Router::new();
    add_common_handlers(&mut router);
    for activity_kind in [ActivityKind::Like, ActivityKind::Dislike, ActivityKind::Announce] {
        router.add(activity_kind, ObjectKind::Any, "response",
            |context, activity| handle_stream_response(context, activity).boxed_local());
    };
    for object_kind in RESPONSE_KINDS {
        router.add(ActivityKind::Undo, object_kind, "undo_response",
            |context, activity| handle_undo_response(context, activity).boxed_local());
        router.add(ActivityKind::Delete, object_kind, "undo_response",
            |context, activity| handle_undo_response(context, activity).boxed_local());
    };
    router.add(ActivityKind::Undo, ObjectKind::Any, "undo",
        |context, activity| handle_undo(context, activity).boxed_local());
    router
}

pub fn build_search_domain_inbox_router() -> Router<SearchDomainContext> {
    let mut router = Router::new();
    add_common_handlers(&mut router);
    router.add(ActivityKind::Undo, ObjectKind::Any, "undo",
        |context, activity| handle_undo(context, activity).boxed_local());
    router
}

pub fn build_search_query_inbox_router() -> Router<SearchQueryContext> {
    let mut router = Router::new();
    add_common_handlers(&mut router);
    router.add(ActivityKind::Undo, ObjectKind::Any, "undo",
        |context, activity| handle_undo(context, activity).boxed_local());
    router
}
