use std::sync::Arc;

use actix_web::{
    middleware::{
        ErrorHandlers,
        ErrorHandlerResponse,
        Logger as ActixLogger,
        NormalizePath,
    },
    web,
    App,
    HttpServer,
};
use log::Level;

use emissary_activitypub::{
    factory::Factory,
    fetch::HttpFetcher,
};
use emissary_config::Config;
use emissary_models::database::DatabaseClient;

use crate::activitypub::views as activitypub;
use crate::http::{
    create_default_headers_middleware,
    log_response_error,
};
use crate::state::AppState;

pub fn create_factory(
    config: &Config,
    db_client: &DatabaseClient,
) -> std::io::Result<Factory> {
    let instance = config.instance();
    let fetcher = HttpFetcher::new(&instance)
        .map_err(std::io::Error::other)?;
    let factory = Factory::new(instance, db_client.clone(), Arc::new(fetcher));
    Ok(factory)
}

pub async fn run_server(
    config: Config,
    factory: Factory,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(factory));
    let num_workers = std::cmp::max(num_cpus::get(), 4);
    let http_socket_addr = config.http_socket()
        .ok_or(std::io::Error::other("listen address is not configured"))?;

    let http_server = HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(ActixLogger::new("%r : %s : %{r}a"))
            .wrap(ErrorHandlers::new()
                .default_handler_server(|response| {
                   log_response_error(Level::Error, &response);
                   Ok(ErrorHandlerResponse::Response(response.map_into_left_body()))
                })
            )
            .wrap(create_default_headers_middleware())
            .app_data(web::Data::clone(&app_state))
            .service(activitypub::user_scope())
            .service(activitypub::stream_scope())
            .service(activitypub::search_query_scope())
            .service(activitypub::search_domain_scope())
    });

    log::info!("listening on {}", http_socket_addr);
    http_server
        .workers(num_workers)
        .bind(&http_socket_addr)?
        .run()
        .await?;
    log::info!("server terminated");
    Ok(())
}
