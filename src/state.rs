use emissary_activitypub::{
    factory::Factory,
    handlers::inbox::{
        build_search_domain_inbox_router,
        build_search_query_inbox_router,
        build_stream_inbox_router,
        build_user_inbox_router,
    },
    handlers::outbox::build_user_outbox_router,
    router::Router,
    scopes::{
        OutboxContext,
        SearchDomainContext,
        SearchQueryContext,
        StreamContext,
        UserContext,
    },
};

/// Shared state of HTTP workers.
/// Routers are built once, at startup.
pub struct AppState {
    pub factory: Factory,
    pub user_inbox: Router<UserContext>,
    pub user_outbox: Router<OutboxContext>,
    pub stream_inbox: Router<StreamContext>,
    pub search_domain_inbox: Router<SearchDomainContext>,
    pub search_query_inbox: Router<SearchQueryContext>,
}

impl AppState {
    pub fn new(factory: Factory) -> Self {
        Self {
            factory,
            user_inbox: build_user_inbox_router(),
            user_outbox: build_user_outbox_router(),
            stream_inbox: build_stream_inbox_router(),
            search_domain_inbox: build_search_domain_inbox_router(),
            search_query_inbox: build_search_query_inbox_router(),
        }
    }
}
