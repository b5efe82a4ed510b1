use emissary::{
    server::{create_factory, run_server},
    workers::start_workers,
};
use emissary_adapters::init::{initialize_app, seed_database};
use emissary_models::database::DatabaseClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = initialize_app(None);

    let db_client = DatabaseClient::new();
    seed_database(&db_client, &config).await
        .expect("failed to seed database");

    log::info!("instance URL {}", config.instance_url());

    let factory = create_factory(&config, &db_client)?;
    start_workers(factory.clone());

    run_server(config, factory).await
}
