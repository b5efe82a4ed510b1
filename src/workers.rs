use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use emissary_activitypub::{
    errors::HandlerError,
    factory::Factory,
    queues::{process_queued_migrations, process_queued_outgoing_activities},
};

const WORKER_DELAY: u64 = 500;

#[derive(Debug, Eq, Hash, PartialEq)]
enum PeriodicTask {
    OutgoingActivityQueueExecutor,
    MigrationQueueExecutor,
    PruneObjectCache,
}

impl PeriodicTask {
    /// Returns task period (in seconds)
    fn period(&self) -> i64 {
        match self {
            Self::OutgoingActivityQueueExecutor => 1,
            Self::MigrationQueueExecutor => 1,
            Self::PruneObjectCache => 600,
        }
    }

    fn is_ready(&self, last_run: &Option<DateTime<Utc>>) -> bool {
        match last_run {
            Some(last_run) => {
                let time_passed = Utc::now() - *last_run;
                time_passed.num_seconds() >= self.period()
            },
            None => true,
        }
    }
}

async fn prune_object_cache(factory: &Factory) -> Result<(), HandlerError> {
    let deleted = factory.activity_cache().prune().await?;
    if deleted > 0 {
        log::info!("removed {deleted} expired objects from cache");
    };
    Ok(())
}

async fn run_worker(factory: Factory) -> () {
    let tasks = [
        PeriodicTask::OutgoingActivityQueueExecutor,
        PeriodicTask::MigrationQueueExecutor,
        PeriodicTask::PruneObjectCache,
    ];
    let mut worker_state: HashMap<PeriodicTask, Option<DateTime<Utc>>> =
        HashMap::from_iter(tasks.into_iter().map(|task| (task, None)));
    let mut interval =
        tokio::time::interval(Duration::from_millis(WORKER_DELAY));
    loop {
        interval.tick().await;

        for (task, last_run) in worker_state.iter_mut() {
            if !task.is_ready(last_run) {
                continue;
            };
            let task_result = match task {
                PeriodicTask::OutgoingActivityQueueExecutor => {
                    process_queued_outgoing_activities(
                        factory.instance(),
                        factory.db_client(),
                    ).await.map_err(Into::into)
                },
                PeriodicTask::MigrationQueueExecutor => {
                    process_queued_migrations(&factory).await
                        .map_err(Into::into)
                },
                PeriodicTask::PruneObjectCache => {
                    prune_object_cache(&factory).await
                },
            };
            task_result.unwrap_or_else(|err: HandlerError| {
                log::error!("{:?}: {}", task, err);
            });
            *last_run = Some(Utc::now());
        };
    };
}

pub fn start_workers(factory: Factory) -> () {
    actix_web::rt::spawn(run_worker(factory));
    log::info!("background worker started");
}
