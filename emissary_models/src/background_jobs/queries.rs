use chrono::{DateTime, Duration, Utc};
use serde_json::{Value as JsonValue};
use uuid::Uuid;

use crate::database::{DatabaseClient, DatabaseError};

use super::types::{BackgroundJob, JobStatus, JobType};

pub async fn enqueue_job(
    db_client: &DatabaseClient,
    job_type: JobType,
    job_data: &JsonValue,
    scheduled_for: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let mut tables = db_client.write().await;
    tables.background_jobs.push(BackgroundJob {
        id: Uuid::new_v4(),
        job_type,
        job_data: job_data.clone(),
        job_status: JobStatus::Queued,
        scheduled_for,
        updated_at: Utc::now(),
    });
    Ok(())
}

/// Takes a batch of due jobs and marks them as running.
/// Running jobs that exceeded the timeout are considered abandoned
/// and returned again.
pub async fn get_job_batch(
    db_client: &DatabaseClient,
    job_type: JobType,
    batch_size: u32,
    job_timeout: u32,
) -> Result<Vec<BackgroundJob>, DatabaseError> {
    let mut tables = db_client.write().await;
    let now = Utc::now();
    let timeout_threshold = now - Duration::seconds(job_timeout.into());
    let mut batch = vec![];
    let mut due_jobs: Vec<&mut BackgroundJob> = tables.background_jobs.iter_mut()
        .filter(|job| {
            job.job_type == job_type &&
                job.scheduled_for <= now &&
                (job.job_status == JobStatus::Queued ||
                    job.updated_at < timeout_threshold)
        })
        .collect();
    due_jobs.sort_by_key(|job| job.scheduled_for);
    for job in due_jobs.into_iter().take(batch_size as usize) {
        if job.job_status == JobStatus::Running {
            log::warn!("found stalled job {}", job.id);
        };
        job.job_status = JobStatus::Running;
        job.updated_at = now;
        batch.push(job.clone());
    };
    Ok(batch)
}

pub async fn delete_job_from_queue(
    db_client: &DatabaseClient,
    job_id: Uuid,
) -> Result<(), DatabaseError> {
    let mut tables = db_client.write().await;
    let index = tables.background_jobs.iter()
        .position(|job| job.id == job_id)
        .ok_or(DatabaseError::NotFound("background job"))?;
    tables.background_jobs.remove(index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::database::test_utils::create_test_database;
    use super::*;

    #[tokio::test]
    async fn test_queue() {
        let db_client = &create_test_database();
        let job_data = json!({"activity": {}});
        enqueue_job(
            db_client,
            JobType::OutgoingActivity,
            &job_data,
            Utc::now(),
        ).await.unwrap();
        // Scheduled for later
        enqueue_job(
            db_client,
            JobType::OutgoingActivity,
            &job_data,
            Utc::now() + Duration::seconds(60),
        ).await.unwrap();

        let batch = get_job_batch(db_client, JobType::OutgoingActivity, 10, 3600)
            .await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].job_data, job_data);
        assert_eq!(batch[0].job_status, JobStatus::Running);

        // Running jobs are not returned again
        let batch_again = get_job_batch(db_client, JobType::OutgoingActivity, 10, 3600)
            .await.unwrap();
        assert_eq!(batch_again.is_empty(), true);

        delete_job_from_queue(db_client, batch[0].id).await.unwrap();
        let tables = db_client.read().await;
        assert_eq!(tables.background_jobs.len(), 1);
    }
}
