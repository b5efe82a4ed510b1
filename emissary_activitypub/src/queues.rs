use std::time::Instant;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue};
use uuid::Uuid;

use emissary_config::Instance;
use emissary_models::{
    background_jobs::queries::{
        delete_job_from_queue,
        enqueue_job,
        get_job_batch,
    },
    background_jobs::types::JobType,
    database::{DatabaseClient, DatabaseError, DatabaseTypeError},
    following::queries::{
        get_following_by_profile_url,
        update_following_profile_url,
    },
    users::queries::get_user_by_id,
};

use crate::{
    actors::LocalActor,
    builders::follow::build_follow,
    cache::ReloadResult,
    deliverer::{deliver_activity_worker, send_activity_to, Recipient},
    errors::HandlerError,
    factory::Factory,
};

const JOB_TIMEOUT: u32 = 3600; // 1 hour

#[derive(Deserialize, Serialize)]
pub struct OutgoingActivityJobData {
    sender_id: String,
    activity: JsonValue,
    recipients: Vec<Recipient>,
    failure_count: u32,
}

impl OutgoingActivityJobData {
    pub fn new(
        sender_id: &str,
        activity: impl Serialize,
        mut recipients: Vec<Recipient>,
    ) -> Self {
        recipients.sort_by(|a, b| a.inbox.cmp(&b.inbox));
        recipients.dedup_by(|a, b| a.inbox == b.inbox);
        let activity = serde_json::to_value(activity)
            .expect("activity should be serializable");
        Self {
            sender_id: sender_id.to_string(),
            activity,
            recipients,
            failure_count: 0,
        }
    }

    pub fn activity(&self) -> &JsonValue {
        &self.activity
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    async fn into_job(
        self,
        db_client: &DatabaseClient,
        delay: u32,
    ) -> Result<(), DatabaseError> {
        if self.recipients.is_empty() {
            return Ok(());
        };
        let job_data = serde_json::to_value(self)
            .expect("activity should be serializable");
        let scheduled_for = Utc::now() + Duration::seconds(delay.into());
        enqueue_job(
            db_client,
            JobType::OutgoingActivity,
            &job_data,
            scheduled_for,
        ).await
    }

    pub async fn enqueue(
        self,
        db_client: &DatabaseClient,
    ) -> Result<(), DatabaseError> {
        self.into_job(db_client, 0).await
    }
}

const OUTGOING_QUEUE_BATCH_SIZE: u32 = 1;

// 10 mins, 55 mins, 8.4 hours
pub fn outgoing_queue_backoff(failure_count: u32) -> u32 {
    debug_assert!(failure_count > 0);
    30 * (10_u32.pow(failure_count) + 10)
}

pub async fn process_queued_outgoing_activities(
    instance: &Instance,
    db_client: &DatabaseClient,
) -> Result<(), DatabaseError> {
    let batch = get_job_batch(
        db_client,
        JobType::OutgoingActivity,
        OUTGOING_QUEUE_BATCH_SIZE,
        JOB_TIMEOUT,
    ).await?;
    for job in batch {
        let mut job_data: OutgoingActivityJobData =
            serde_json::from_value(job.job_data)
                .map_err(|_| DatabaseTypeError)?;
        if !instance.federation_enabled {
            log::info!(
                "(private mode) not delivering activity to {} inboxes: {}",
                job_data.recipients.len(),
                job_data.activity,
            );
            delete_job_from_queue(db_client, job.id).await?;
            continue;
        };
        log::info!(
            "delivering activity of {} to {} inboxes",
            job_data.sender_id,
            job_data.recipients.len(),
        );
        let start_time = Instant::now();
        let worker_result = deliver_activity_worker(
            instance,
            &job_data.activity,
            &mut job_data.recipients,
        ).await;
        if let Err(error) = worker_result {
            // Unexpected error
            log::error!("{}", error);
            delete_job_from_queue(db_client, job.id).await?;
            continue;
        };
        log::info!(
            "delivery job: {:.2?}, {} delivered, {} gone (attempt #{})",
            start_time.elapsed(),
            job_data.recipients.iter().filter(|item| item.is_delivered).count(),
            job_data.recipients.iter().filter(|item| item.is_gone).count(),
            job_data.failure_count + 1,
        );
        job_data.recipients.retain(|recipient| !recipient.is_finished());
        if !job_data.recipients.is_empty() &&
            job_data.failure_count < instance.deliverer_retries
        {
            job_data.failure_count += 1;
            // Re-queue undelivered
            let retry_after = outgoing_queue_backoff(job_data.failure_count);
            log::info!(
                "delivery to {} inboxes will be retried in {} seconds",
                job_data.recipients.len(),
                retry_after,
            );
            job_data.into_job(db_client, retry_after).await?;
        };
        delete_job_from_queue(db_client, job.id).await?;
    };
    Ok(())
}

/// Moves followings of a user from an old actor to a new one
#[derive(Deserialize, Serialize)]
pub struct FollowingMigrationJobData {
    pub user_id: Uuid,
    pub old_actor_id: String,
    pub new_actor_id: String,
}

impl FollowingMigrationJobData {
    pub async fn into_job(
        self,
        db_client: &DatabaseClient,
        delay: u32,
    ) -> Result<(), DatabaseError> {
        let job_data = serde_json::to_value(self)
            .expect("job data should be serializable");
        let scheduled_for = Utc::now() + Duration::seconds(delay.into());
        enqueue_job(
            db_client,
            JobType::FollowingMigration,
            &job_data,
            scheduled_for,
        ).await
    }
}

const MIGRATION_QUEUE_BATCH_SIZE: u32 = 10;

async fn migrate_following(
    factory: &Factory,
    job_data: &FollowingMigrationJobData,
) -> Result<(), HandlerError> {
    let db_client = factory.db_client();
    let new_actor = match factory.activity_cache()
        .force_reload(&job_data.new_actor_id).await?
    {
        ReloadResult::Refreshed(new_actor) => new_actor,
        ReloadResult::Purged => {
            return Err(HandlerError::ValidationError("move target doesn't exist".to_string()));
        },
    };
    if !new_actor.also_known_as().contains(&job_data.old_actor_id) {
        return Err(HandlerError::ValidationError("move target is not an alias".to_string()));
    };
    let new_inbox = new_actor.inbox()
        .ok_or(HandlerError::ValidationError("move target has no inbox".to_string()))?
        .to_string();
    let following = get_following_by_profile_url(
        db_client,
        job_data.user_id,
        &job_data.old_actor_id,
    ).await?;
    let following = update_following_profile_url(
        db_client,
        following.id,
        &job_data.new_actor_id,
        Some(new_inbox.clone()),
    ).await?;
    let user = get_user_by_id(db_client, job_data.user_id).await?;
    let local_actor = LocalActor::for_user(&factory.instance_url(), &user);
    let activity = build_follow(
        &local_actor.id,
        following.id,
        &job_data.new_actor_id,
    );
    send_activity_to(
        factory,
        &local_actor,
        activity,
        vec![Recipient::new(&job_data.new_actor_id, &new_inbox)],
    ).await?;
    Ok(())
}

pub async fn process_queued_migrations(
    factory: &Factory,
) -> Result<(), DatabaseError> {
    let db_client = factory.db_client();
    let batch = get_job_batch(
        db_client,
        JobType::FollowingMigration,
        MIGRATION_QUEUE_BATCH_SIZE,
        JOB_TIMEOUT,
    ).await?;
    for job in batch {
        let job_data: FollowingMigrationJobData =
            serde_json::from_value(job.job_data)
                .map_err(|_| DatabaseTypeError)?;
        match migrate_following(factory, &job_data).await {
            Ok(_) => {
                log::info!(
                    "following migrated from {} to {}",
                    job_data.old_actor_id,
                    job_data.new_actor_id,
                );
            },
            Err(error) => {
                log::warn!(
                    "failed to migrate following from {}: {}",
                    job_data.old_actor_id,
                    error,
                );
            },
        };
        delete_job_from_queue(db_client, job.id).await?;
    };
    Ok(())
}
