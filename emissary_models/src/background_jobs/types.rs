use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JobType {
    OutgoingActivity,
    FollowingMigration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JobStatus {
    Queued,
    Running,
}

#[derive(Clone, Debug)]
pub struct BackgroundJob {
    pub id: Uuid,
    pub job_type: JobType,
    pub job_data: JsonValue,
    pub job_status: JobStatus,
    pub scheduled_for: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
