use std::sync::Arc;

use uuid::Uuid;

use emissary_config::Instance;
use emissary_models::database::{DatabaseClient, DatabaseError};

use crate::{
    cache::ActivityCache,
    fetch::Fetcher,
    filter::RuleFilter,
};

/// Services available to activity handlers
#[derive(Clone)]
pub struct Factory {
    instance: Instance,
    db_client: DatabaseClient,
    fetcher: Arc<dyn Fetcher>,
}

impl Factory {
    pub fn new(
        instance: Instance,
        db_client: DatabaseClient,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self { instance, db_client, fetcher }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn instance_url(&self) -> String {
        self.instance.url()
    }

    pub fn db_client(&self) -> &DatabaseClient {
        &self.db_client
    }

    pub fn activity_cache(&self) -> ActivityCache {
        ActivityCache::for_instance(
            &self.instance,
            self.db_client.clone(),
            self.fetcher.clone(),
        )
    }

    pub async fn rule_filter(
        &self,
        maybe_user_id: Option<Uuid>,
        blocks_only: bool,
    ) -> Result<RuleFilter, DatabaseError> {
        RuleFilter::new(&self.db_client, maybe_user_id, blocks_only).await
    }
}
