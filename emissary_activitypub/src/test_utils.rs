use std::collections::{HashMap, HashSet};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use futures::future::{BoxFuture, FutureExt};
use serde_json::{Value as JsonValue};

use emissary_config::test_utils::create_test_config;
use emissary_models::{
    background_jobs::queries::get_job_batch,
    background_jobs::types::JobType,
    database::DatabaseClient,
};

use crate::{
    factory::Factory,
    fetch::{FetchError, Fetcher},
    queues::OutgoingActivityJobData,
};

/// Serves documents from memory
#[derive(Default)]
pub struct MockFetcher {
    objects: HashMap<String, JsonValue>,
    gone: HashSet<String>,
    requests: AtomicUsize,
}

impl MockFetcher {
    pub fn with_object(mut self, object_json: JsonValue) -> Self {
        let object_id = object_json["id"].as_str()
            .expect("object should have ID")
            .to_string();
        self.objects.insert(object_id, object_json);
        self
    }

    pub fn with_gone(mut self, object_id: &str) -> Self {
        self.gone.insert(object_id.to_string());
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Fetcher for MockFetcher {
    fn fetch_object<'a>(
        &'a self,
        object_id: &'a str,
    ) -> BoxFuture<'a, Result<JsonValue, FetchError>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let result = if self.gone.contains(object_id) {
            Err(FetchError::Gone(object_id.to_string()))
        } else {
            self.objects.get(object_id)
                .cloned()
                .ok_or(FetchError::NotFound(object_id.to_string()))
        };
        async move { result }.boxed()
    }
}

pub fn test_factory(db_client: &DatabaseClient, fetcher: MockFetcher) -> Factory {
    let instance = create_test_config().instance();
    Factory::new(instance, db_client.clone(), Arc::new(fetcher))
}

/// Takes all queued outgoing activities
pub async fn take_queued_activities(
    db_client: &DatabaseClient,
) -> Vec<OutgoingActivityJobData> {
    get_job_batch(db_client, JobType::OutgoingActivity, 100, 3600)
        .await
        .expect("job queue should be readable")
        .into_iter()
        .map(|job| {
            serde_json::from_value(job.job_data)
                .expect("job data should be valid")
        })
        .collect()
}
