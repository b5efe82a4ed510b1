use chrono::Utc;
use uuid::Uuid;

use crate::actors::types::Parent;
use crate::database::{
    utils::{datetime_to_cursor, paginate},
    DatabaseClient,
    DatabaseError,
};

use super::types::{Follower, FollowerData};

/// Creates follower or refreshes the existing one.
/// Returns `true` if a new follower was added.
/// There is at most one active follower per (parent, actor URL) pair.
pub async fn create_or_update_follower(
    db_client: &DatabaseClient,
    follower_data: FollowerData,
) -> Result<(Follower, bool), DatabaseError> {
    let mut tables = db_client.write().await;
    let maybe_follower = tables.followers.iter_mut()
        .find(|follower| {
            follower.parent == follower_data.parent &&
                follower.actor.profile_url == follower_data.actor.profile_url
        });
    if let Some(follower) = maybe_follower {
        let is_new = !follower.is_active();
        if is_new {
            // Re-activate soft-deleted record
            follower.deleted_at = None;
            follower.created_at = Utc::now();
        };
        follower.actor = follower_data.actor;
        follower.method = follower_data.method;
        return Ok((follower.clone(), is_new));
    };
    let follower = Follower {
        id: Uuid::new_v4(),
        parent: follower_data.parent,
        actor: follower_data.actor,
        method: follower_data.method,
        created_at: Utc::now(),
        deleted_at: None,
    };
    tables.followers.push(follower.clone());
    Ok((follower, true))
}

pub async fn get_follower(
    db_client: &DatabaseClient,
    parent: &Parent,
    actor_url: &str,
) -> Result<Follower, DatabaseError> {
    let tables = db_client.read().await;
    tables.followers.iter()
        .find(|follower| {
            follower.is_active() &&
                follower.parent == *parent &&
                follower.actor.profile_url == actor_url
        })
        .cloned()
        .ok_or(DatabaseError::NotFound("follower"))
}

pub async fn get_follower_by_id(
    db_client: &DatabaseClient,
    parent: &Parent,
    follower_id: Uuid,
) -> Result<Follower, DatabaseError> {
    let tables = db_client.read().await;
    tables.followers.iter()
        .find(|follower| {
            follower.is_active() &&
                follower.parent == *parent &&
                follower.id == follower_id
        })
        .cloned()
        .ok_or(DatabaseError::NotFound("follower"))
}

/// Soft-deletes follower
pub async fn delete_follower(
    db_client: &DatabaseClient,
    follower_id: Uuid,
) -> Result<(), DatabaseError> {
    let mut tables = db_client.write().await;
    let follower = tables.followers.iter_mut()
        .find(|follower| follower.id == follower_id && follower.is_active())
        .ok_or(DatabaseError::NotFound("follower"))?;
    follower.deleted_at = Some(Utc::now());
    Ok(())
}

pub async fn get_followers(
    db_client: &DatabaseClient,
    parent: &Parent,
) -> Result<Vec<Follower>, DatabaseError> {
    let tables = db_client.read().await;
    let followers = tables.followers.iter()
        .filter(|follower| follower.is_active() && follower.parent == *parent)
        .cloned()
        .collect();
    Ok(followers)
}

pub async fn get_followers_page(
    db_client: &DatabaseClient,
    parent: &Parent,
    before: i64,
    limit: u16,
) -> Result<Vec<Follower>, DatabaseError> {
    let tables = db_client.read().await;
    let followers = tables.followers.iter()
        .filter(|follower| follower.is_active() && follower.parent == *parent)
        .cloned();
    let page = paginate(
        followers,
        |follower| datetime_to_cursor(&follower.created_at),
        before,
        limit,
    );
    Ok(page)
}

pub async fn get_follower_count(
    db_client: &DatabaseClient,
    parent: &Parent,
) -> Result<usize, DatabaseError> {
    let tables = db_client.read().await;
    let count = tables.followers.iter()
        .filter(|follower| follower.is_active() && follower.parent == *parent)
        .count();
    Ok(count)
}

#[cfg(test)]
mod tests {
    use crate::actors::types::RemoteActor;
    use crate::database::test_utils::create_test_database;
    use crate::followers::types::FollowerMethod;
    use super::*;

    fn follower_data(parent: Parent, actor_url: &str) -> FollowerData {
        FollowerData {
            parent,
            actor: RemoteActor {
                profile_url: actor_url.to_string(),
                inbox_url: format!("{actor_url}/inbox"),
                ..Default::default()
            },
            method: FollowerMethod::ActivityPub,
        }
    }

    #[tokio::test]
    async fn test_create_follower_idempotent() {
        let db_client = &create_test_database();
        let parent = Parent::user(Uuid::new_v4());
        let actor_url = "https://remote.example/users/bob";
        let (follower_1, created) = create_or_update_follower(
            db_client,
            follower_data(parent, actor_url),
        ).await.unwrap();
        assert_eq!(created, true);
        let (follower_2, created) = create_or_update_follower(
            db_client,
            follower_data(parent, actor_url),
        ).await.unwrap();
        assert_eq!(created, false);
        assert_eq!(follower_2.id, follower_1.id);
        assert_eq!(get_follower_count(db_client, &parent).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_follower() {
        let db_client = &create_test_database();
        let parent = Parent::stream(Uuid::new_v4());
        let actor_url = "https://remote.example/users/bob";
        let (follower, _) = create_or_update_follower(
            db_client,
            follower_data(parent, actor_url),
        ).await.unwrap();
        delete_follower(db_client, follower.id).await.unwrap();
        let error = get_follower(db_client, &parent, actor_url)
            .await.err().unwrap();
        assert!(matches!(error, DatabaseError::NotFound("follower")));
        // Record is kept
        let tables = db_client.read().await;
        assert_eq!(tables.followers.len(), 1);
        assert_eq!(tables.followers[0].deleted_at.is_some(), true);
    }

    #[tokio::test]
    async fn test_follow_again_after_delete() {
        let db_client = &create_test_database();
        let parent = Parent::search_domain();
        let actor_url = "https://remote.example/users/bob";
        let (follower, _) = create_or_update_follower(
            db_client,
            follower_data(parent, actor_url),
        ).await.unwrap();
        delete_follower(db_client, follower.id).await.unwrap();
        let (follower_again, created) = create_or_update_follower(
            db_client,
            follower_data(parent, actor_url),
        ).await.unwrap();
        assert_eq!(created, true);
        assert_eq!(follower_again.id, follower.id);
        assert_eq!(get_followers(db_client, &parent).await.unwrap().len(), 1);
    }
}
