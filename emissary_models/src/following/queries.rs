use chrono::Utc;
use uuid::Uuid;

use crate::database::{
    utils::{datetime_to_cursor, paginate},
    DatabaseClient,
    DatabaseError,
};

use super::types::{
    Following,
    FollowingData,
    FollowingMethod,
    FollowingStatus,
};

pub async fn create_following(
    db_client: &DatabaseClient,
    following_data: FollowingData,
) -> Result<Following, DatabaseError> {
    let mut tables = db_client.write().await;
    let is_duplicate = tables.following.iter().any(|following| {
        following.user_id == following_data.user_id &&
            following.profile_url == following_data.profile_url
    });
    if is_duplicate {
        return Err(DatabaseError::AlreadyExists("following"));
    };
    let now = Utc::now();
    let following = Following {
        id: Uuid::new_v4(),
        user_id: following_data.user_id,
        profile_url: following_data.profile_url,
        name: following_data.name,
        icon_url: None,
        inbox_url: following_data.inbox_url,
        rule_action: following_data.rule_action,
        method: following_data.method,
        status: FollowingStatus::New,
        created_at: now,
        updated_at: now,
    };
    tables.following.push(following.clone());
    Ok(following)
}

pub async fn get_following_by_id(
    db_client: &DatabaseClient,
    following_id: Uuid,
) -> Result<Following, DatabaseError> {
    let tables = db_client.read().await;
    tables.following.iter()
        .find(|following| following.id == following_id)
        .cloned()
        .ok_or(DatabaseError::NotFound("following"))
}

pub async fn get_following_by_profile_url(
    db_client: &DatabaseClient,
    user_id: Uuid,
    profile_url: &str,
) -> Result<Following, DatabaseError> {
    let tables = db_client.read().await;
    tables.following.iter()
        .find(|following| {
            following.user_id == user_id &&
                following.profile_url == profile_url
        })
        .cloned()
        .ok_or(DatabaseError::NotFound("following"))
}

/// Returns all local subscriptions to the given remote actor
pub async fn find_followings_by_profile_url(
    db_client: &DatabaseClient,
    profile_url: &str,
) -> Result<Vec<Following>, DatabaseError> {
    let tables = db_client.read().await;
    let followings = tables.following.iter()
        .filter(|following| following.profile_url == profile_url)
        .cloned()
        .collect();
    Ok(followings)
}

/// Marks following as successfully connected via ActivityPub
pub async fn set_following_accepted(
    db_client: &DatabaseClient,
    following_id: Uuid,
    name: Option<String>,
    icon_url: Option<String>,
    inbox_url: Option<String>,
) -> Result<Following, DatabaseError> {
    let mut tables = db_client.write().await;
    let following = tables.following.iter_mut()
        .find(|following| following.id == following_id)
        .ok_or(DatabaseError::NotFound("following"))?;
    if name.is_some() {
        following.name = name;
    };
    if icon_url.is_some() {
        following.icon_url = icon_url;
    };
    if inbox_url.is_some() {
        following.inbox_url = inbox_url;
    };
    following.method = FollowingMethod::ActivityPub;
    following.status = FollowingStatus::Success;
    following.updated_at = Utc::now();
    Ok(following.clone())
}

pub async fn set_following_status(
    db_client: &DatabaseClient,
    following_id: Uuid,
    status: FollowingStatus,
) -> Result<(), DatabaseError> {
    let mut tables = db_client.write().await;
    let following = tables.following.iter_mut()
        .find(|following| following.id == following_id)
        .ok_or(DatabaseError::NotFound("following"))?;
    following.status = status;
    following.updated_at = Utc::now();
    Ok(())
}

/// Points following to a new actor after account migration
pub async fn update_following_profile_url(
    db_client: &DatabaseClient,
    following_id: Uuid,
    profile_url: &str,
    inbox_url: Option<String>,
) -> Result<Following, DatabaseError> {
    let mut tables = db_client.write().await;
    let user_id = tables.following.iter()
        .find(|following| following.id == following_id)
        .map(|following| following.user_id)
        .ok_or(DatabaseError::NotFound("following"))?;
    let is_duplicate = tables.following.iter().any(|following| {
        following.id != following_id &&
            following.user_id == user_id &&
            following.profile_url == profile_url
    });
    if is_duplicate {
        return Err(DatabaseError::AlreadyExists("following"));
    };
    let following = tables.following.iter_mut()
        .find(|following| following.id == following_id)
        .ok_or(DatabaseError::NotFound("following"))?;
    following.profile_url = profile_url.to_string();
    following.inbox_url = inbox_url;
    following.status = FollowingStatus::Loading;
    following.updated_at = Utc::now();
    Ok(following.clone())
}

pub async fn delete_following(
    db_client: &DatabaseClient,
    following_id: Uuid,
) -> Result<(), DatabaseError> {
    let mut tables = db_client.write().await;
    let index = tables.following.iter()
        .position(|following| following.id == following_id)
        .ok_or(DatabaseError::NotFound("following"))?;
    tables.following.remove(index);
    Ok(())
}

pub async fn get_followings_page(
    db_client: &DatabaseClient,
    user_id: Uuid,
    before: i64,
    limit: u16,
) -> Result<Vec<Following>, DatabaseError> {
    let tables = db_client.read().await;
    let followings = tables.following.iter()
        .filter(|following| {
            following.user_id == user_id &&
                following.method == FollowingMethod::ActivityPub
        })
        .cloned();
    let page = paginate(
        followings,
        |following| datetime_to_cursor(&following.created_at),
        before,
        limit,
    );
    Ok(page)
}
