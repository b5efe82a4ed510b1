use actix_web::{
    get,
    post,
    web,
    http::header as http_header,
    HttpRequest,
    HttpResponse,
    Scope,
};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use log::Level;
use serde::Deserialize;
use serde_json::{Value as JsonValue};
use uuid::Uuid;

use emissary_activitypub::{
    actors::LocalActor,
    authentication::verify_signed_request,
    builders::actor::build_local_actor,
    collections::{
        get_collection,
        get_collection_item,
        get_collection_page,
    },
    errors::ErrorKind,
    factory::Factory,
    identifiers::LocalActorCollection,
    router::{ActivityValidator, Outcome, Router},
    scopes::{
        ActorContext,
        OutboxContext,
        SearchDomainContext,
        SearchQueryContext,
        StreamContext,
        UserContext,
    },
    validators::{
        ActorMatchValidator,
        RequiredFieldsValidator,
        SignatureKeyValidator,
    },
};
use emissary_models::{
    searches::queries::get_search_query_by_token,
    streams::queries::get_stream_by_token,
    users::queries::get_user_by_name,
};

use crate::{
    errors::HttpError,
    http::{activitypub_response, to_signed_request, tokens_match},
    state::AppState,
};

#[derive(Deserialize)]
pub struct CollectionQueryParams {
    #[serde(rename = "publishDate")]
    publish_date: Option<i64>,
}

fn parse_collection(name: &str) -> Result<LocalActorCollection, HttpError> {
    LocalActorCollection::from_name(name)
        .ok_or(HttpError::NotFoundError("collection not found".to_string()))
}

/// Parses, validates and dispatches activity delivered to an inbox
async fn receive_activity<C>(
    router: &Router<C>,
    context: &C,
    request: &HttpRequest,
    request_body: &[u8],
) -> Result<HttpResponse, HttpError>
    where C: ActorContext
{
    let instance = context.factory().instance();
    if !instance.federation_enabled {
        return Err(HttpError::PermissionError("federation is disabled".to_string()));
    };
    let activity: JsonValue = serde_json::from_slice(request_body)
        .map_err(|_| HttpError::ValidationError("invalid activity".to_string()))?;
    let activity_type = activity["type"].as_str().unwrap_or("Unknown");
    log::info!("received in {}: {}", request.uri().path(), activity_type);
    log::debug!("activity: {activity}");

    // Signature is verified whenever present
    let signed_request = to_signed_request(request);
    let maybe_signer_id = if signed_request.is_signed() {
        let signer_id = verify_signed_request(
            &context.factory().activity_cache(),
            &signed_request,
            request_body,
        ).await.map_err(|error| {
            log::warn!("invalid HTTP signature ({error}): {activity}");
            HttpError::AuthError("invalid HTTP signature".to_string())
        })?;
        Some(signer_id)
    } else {
        None
    };
    let signature_validator = SignatureKeyValidator {
        signer_id: maybe_signer_id,
        required: instance.require_signatures,
    };
    let validators: [&dyn ActivityValidator; 2] = [
        &RequiredFieldsValidator,
        &signature_validator,
    ];
    let outcome = router.receive_and_handle(context, request_body, &validators).await
        .map_err(|error| {
            let log_level = match error.kind() {
                ErrorKind::Internal => Level::Error,
                _ => Level::Warn,
            };
            log::log!(
                log_level,
                "failed to process activity ({}): {}",
                error,
                activity,
            );
            error
        })?;
    let response = match outcome {
        Outcome::Queued(_) => HttpResponse::Accepted().finish(),
        _ => HttpResponse::Ok().finish(),
    };
    Ok(response)
}

async fn collection_response(
    factory: &Factory,
    request: &HttpRequest,
    local_actor: &LocalActor,
    collection_name: &str,
    query_params: &CollectionQueryParams,
) -> Result<HttpResponse, HttpError> {
    let collection = parse_collection(collection_name)?;
    match query_params.publish_date {
        None => {
            let collection = get_collection(
                factory,
                local_actor,
                collection,
            ).await?;
            activitypub_response(request.headers(), collection)
        },
        Some(cursor) => {
            let page = get_collection_page(
                factory,
                local_actor,
                collection,
                cursor,
            ).await?;
            activitypub_response(request.headers(), page)
        },
    }
}

async fn collection_item_response(
    factory: &Factory,
    request: &HttpRequest,
    local_actor: &LocalActor,
    collection_name: &str,
    item_id: Uuid,
) -> Result<HttpResponse, HttpError> {
    let collection = parse_collection(collection_name)?;
    let item = get_collection_item(
        factory,
        local_actor,
        collection,
        item_id,
    ).await?;
    activitypub_response(request.headers(), item)
}

async fn get_user_context(
    app_state: &AppState,
    username: &str,
) -> Result<UserContext, HttpError> {
    let user = get_user_by_name(app_state.factory.db_client(), username).await?;
    Ok(UserContext { factory: app_state.factory.clone(), user })
}

#[get("")]
async fn user_actor_view(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    username: web::Path<String>,
) -> Result<HttpResponse, HttpError> {
    let context = get_user_context(&app_state, &username).await?;
    let local_actor = context.activitypub_actor()?;
    activitypub_response(request.headers(), build_local_actor(&local_actor))
}

#[post("/inbox")]
async fn user_inbox(
    app_state: web::Data<AppState>,
    username: web::Path<String>,
    request: HttpRequest,
    request_body: web::Bytes,
) -> Result<HttpResponse, HttpError> {
    let context = get_user_context(&app_state, &username).await?;
    receive_activity(
        &app_state.user_inbox,
        &context,
        &request,
        &request_body,
    ).await
}

/// Client-to-server submission
#[post("/outbox")]
async fn user_outbox(
    app_state: web::Data<AppState>,
    auth: BearerAuth,
    username: web::Path<String>,
    request: HttpRequest,
    request_body: web::Bytes,
) -> Result<HttpResponse, HttpError> {
    let user = get_user_by_name(app_state.factory.db_client(), &username).await?;
    if !tokens_match(auth.token(), &user.access_token) {
        return Err(HttpError::AuthError("access token is invalid".to_string()));
    };
    let context = OutboxContext { factory: app_state.factory.clone(), user };
    let local_actor = context.activitypub_actor()?;
    log::info!("received in {}", request.uri().path());
    let actor_validator = ActorMatchValidator { actor_id: local_actor.id };
    let validators: [&dyn ActivityValidator; 2] = [
        &RequiredFieldsValidator,
        &actor_validator,
    ];
    let outcome = app_state.user_outbox
        .receive_and_handle(&context, &request_body, &validators).await
        .map_err(|error| {
            log::warn!("failed to process outbox activity: {}", error);
            error
        })?;
    let response = match outcome {
        Outcome::Created { location, .. } => {
            HttpResponse::Created()
                .append_header((http_header::LOCATION, location))
                .finish()
        },
        Outcome::Queued(_) => HttpResponse::Accepted().finish(),
        Outcome::Processed(_) | Outcome::Ignored(_) => HttpResponse::Ok().finish(),
    };
    Ok(response)
}

#[get("/{collection}")]
async fn user_collection(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    path: web::Path<(String, String)>,
    query_params: web::Query<CollectionQueryParams>,
) -> Result<HttpResponse, HttpError> {
    let (username, collection_name) = path.into_inner();
    let context = get_user_context(&app_state, &username).await?;
    collection_response(
        &app_state.factory,
        &request,
        &context.activitypub_actor()?,
        &collection_name,
        &query_params,
    ).await
}

#[get("/{collection}/{item_id}")]
async fn user_collection_item(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    path: web::Path<(String, String, Uuid)>,
) -> Result<HttpResponse, HttpError> {
    let (username, collection_name, item_id) = path.into_inner();
    let context = get_user_context(&app_state, &username).await?;
    collection_item_response(
        &app_state.factory,
        &request,
        &context.activitypub_actor()?,
        &collection_name,
        item_id,
    ).await
}

pub fn user_scope() -> Scope {
    web::scope("/users/{username}")
        .service(user_actor_view)
        .service(user_inbox)
        .service(user_outbox)
        .service(user_collection)
        .service(user_collection_item)
}

async fn get_stream_context(
    app_state: &AppState,
    token: &str,
) -> Result<StreamContext, HttpError> {
    let stream = get_stream_by_token(app_state.factory.db_client(), token).await?;
    Ok(StreamContext { factory: app_state.factory.clone(), stream })
}

#[get("")]
async fn stream_actor_view(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    token: web::Path<String>,
) -> Result<HttpResponse, HttpError> {
    let context = get_stream_context(&app_state, &token).await?;
    let local_actor = context.activitypub_actor()?;
    activitypub_response(request.headers(), build_local_actor(&local_actor))
}

#[post("/inbox")]
async fn stream_inbox(
    app_state: web::Data<AppState>,
    token: web::Path<String>,
    request: HttpRequest,
    request_body: web::Bytes,
) -> Result<HttpResponse, HttpError> {
    let context = get_stream_context(&app_state, &token).await?;
    receive_activity(
        &app_state.stream_inbox,
        &context,
        &request,
        &request_body,
    ).await
}

#[get("/{collection}")]
async fn stream_collection(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    path: web::Path<(String, String)>,
    query_params: web::Query<CollectionQueryParams>,
) -> Result<HttpResponse, HttpError> {
    let (token, collection_name) = path.into_inner();
    let context = get_stream_context(&app_state, &token).await?;
    collection_response(
        &app_state.factory,
        &request,
        &context.activitypub_actor()?,
        &collection_name,
        &query_params,
    ).await
}

#[get("/{collection}/{item_id}")]
async fn stream_collection_item(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    path: web::Path<(String, String, Uuid)>,
) -> Result<HttpResponse, HttpError> {
    let (token, collection_name, item_id) = path.into_inner();
    let context = get_stream_context(&app_state, &token).await?;
    collection_item_response(
        &app_state.factory,
        &request,
        &context.activitypub_actor()?,
        &collection_name,
        item_id,
    ).await
}

pub fn stream_scope() -> Scope {
    web::scope("/streams/{token}")
        .service(stream_actor_view)
        .service(stream_inbox)
        .service(stream_collection)
        .service(stream_collection_item)
}

fn get_search_domain_context(app_state: &AppState) -> SearchDomainContext {
    SearchDomainContext { factory: app_state.factory.clone() }
}

#[get("")]
async fn search_domain_actor_view(
    app_state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<HttpResponse, HttpError> {
    let context = get_search_domain_context(&app_state);
    let local_actor = context.activitypub_actor()?;
    activitypub_response(request.headers(), build_local_actor(&local_actor))
}

#[post("/inbox")]
async fn search_domain_inbox(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    request_body: web::Bytes,
) -> Result<HttpResponse, HttpError> {
    let context = get_search_domain_context(&app_state);
    // Disabled search domain doesn't have an inbox
    context.activitypub_actor()?;
    receive_activity(
        &app_state.search_domain_inbox,
        &context,
        &request,
        &request_body,
    ).await
}

#[get("/{collection}")]
async fn search_domain_collection(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    collection_name: web::Path<String>,
    query_params: web::Query<CollectionQueryParams>,
) -> Result<HttpResponse, HttpError> {
    let context = get_search_domain_context(&app_state);
    collection_response(
        &app_state.factory,
        &request,
        &context.activitypub_actor()?,
        &collection_name,
        &query_params,
    ).await
}

#[get("/{collection}/{item_id}")]
async fn search_domain_collection_item(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, HttpError> {
    let (collection_name, item_id) = path.into_inner();
    let context = get_search_domain_context(&app_state);
    collection_item_response(
        &app_state.factory,
        &request,
        &context.activitypub_actor()?,
        &collection_name,
        item_id,
    ).await
}

pub fn search_domain_scope() -> Scope {
    web::scope("/search")
        .service(search_domain_actor_view)
        .service(search_domain_inbox)
        .service(search_domain_collection)
        .service(search_domain_collection_item)
}

async fn get_search_query_context(
    app_state: &AppState,
    token: &str,
) -> Result<SearchQueryContext, HttpError> {
    let search_query = get_search_query_by_token(
        app_state.factory.db_client(),
        token,
    ).await?;
    Ok(SearchQueryContext { factory: app_state.factory.clone(), search_query })
}

#[get("")]
async fn search_query_actor_view(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    token: web::Path<String>,
) -> Result<HttpResponse, HttpError> {
    let context = get_search_query_context(&app_state, &token).await?;
    let local_actor = context.activitypub_actor()?;
    activitypub_response(request.headers(), build_local_actor(&local_actor))
}

#[post("/inbox")]
async fn search_query_inbox(
    app_state: web::Data<AppState>,
    token: web::Path<String>,
    request: HttpRequest,
    request_body: web::Bytes,
) -> Result<HttpResponse, HttpError> {
    let context = get_search_query_context(&app_state, &token).await?;
    receive_activity(
        &app_state.search_query_inbox,
        &context,
        &request,
        &request_body,
    ).await
}

#[get("/{collection}")]
async fn search_query_collection(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    path: web::Path<(String, String)>,
    query_params: web::Query<CollectionQueryParams>,
) -> Result<HttpResponse, HttpError> {
    let (token, collection_name) = path.into_inner();
    let context = get_search_query_context(&app_state, &token).await?;
    collection_response(
        &app_state.factory,
        &request,
        &context.activitypub_actor()?,
        &collection_name,
        &query_params,
    ).await
}

#[get("/{collection}/{item_id}")]
async fn search_query_collection_item(
    app_state: web::Data<AppState>,
    request: HttpRequest,
    path: web::Path<(String, String, Uuid)>,
) -> Result<HttpResponse, HttpError> {
    let (token, collection_name, item_id) = path.into_inner();
    let context = get_search_query_context(&app_state, &token).await?;
    collection_item_response(
        &app_state.factory,
        &request,
        &context.activitypub_actor()?,
        &collection_name,
        item_id,
    ).await
}

pub fn search_query_scope() -> Scope {
    web::scope("/searches/{token}")
        .service(search_query_actor_view)
        .service(search_query_inbox)
        .service(search_query_collection)
        .service(search_query_collection_item)
}
