//! Reference storage backend.
//!
//! All tables live in memory behind a single lock. Every query function
//! acquires the lock once and releases it before returning, so a query
//! is atomic with respect to other queries and unique keys are enforced
//! inside the same critical section as the insert.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    background_jobs::types::BackgroundJob,
    followers::types::Follower,
    following::types::Following,
    messages::types::Message,
    mls::types::{KeyPackage, MlsMessage},
    objects::types::CachedObject,
    outbox::types::OutboxMessage,
    responses::types::Response,
    rules::types::Rule,
    searches::types::SearchQuery,
    streams::types::Stream,
    users::types::User,
};

pub mod errors;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use errors::{DatabaseError, DatabaseTypeError};

#[derive(Default)]
pub(crate) struct Tables {
    pub users: Vec<User>,
    pub streams: Vec<Stream>,
    pub search_queries: Vec<SearchQuery>,
    pub followers: Vec<Follower>,
    pub following: Vec<Following>,
    pub rules: Vec<Rule>,
    pub messages: Vec<Message>,
    pub outbox: Vec<OutboxMessage>,
    // Keyed by activity ID
    pub responses: HashMap<String, Response>,
    pub objects: HashMap<String, CachedObject>,
    pub key_packages: Vec<KeyPackage>,
    pub mls_messages: Vec<MlsMessage>,
    pub background_jobs: Vec<BackgroundJob>,
}

/// Handle to the database. Cloning is cheap and all clones share state.
#[derive(Clone, Default)]
pub struct DatabaseClient {
    tables: Arc<RwLock<Tables>>,
}

impl DatabaseClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}
