use std::time::Duration;

use futures::{
    stream::FuturesUnordered,
    StreamExt,
};
use reqwest::{header, redirect, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue};
use thiserror::Error;

use emissary_config::Instance;
use emissary_models::{
    followers::queries::get_followers,
    followers::types::FollowerMethod,
};

use crate::{
    actors::LocalActor,
    constants::AP_MEDIA_TYPE,
    document::{is_public_address, Document},
    errors::HandlerError,
    factory::Factory,
    identifiers::is_local_url,
    queues::OutgoingActivityJobData,
};

const HTTP_410_GONE: u16 = 410;

#[derive(Debug, Error)]
pub enum DelivererError {
    #[error("activity serialization error")]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error("HTTP error {}", .0.as_u16())]
    HttpError(StatusCode),
}

/// Represents delivery to a single inbox
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Recipient {
    pub id: String,
    pub inbox: String,

    pub is_delivered: bool,

    // This flag is set if inbox is 410 Gone
    #[serde(default)]
    pub is_gone: bool,
}

impl Recipient {
    pub fn new(actor_id: &str, inbox: &str) -> Self {
        Self {
            id: actor_id.to_owned(),
            inbox: inbox.to_owned(),
            is_delivered: false,
            is_gone: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.is_delivered || self.is_gone
    }
}

/// Finds inboxes of activity addressees.
/// Local followers collection is expanded, public address and local
/// actors are skipped, other actors are dereferenced.
pub async fn locate_recipients(
    factory: &Factory,
    local_actor: &LocalActor,
    activity: &Document,
) -> Result<Vec<Recipient>, HandlerError> {
    let instance_url = factory.instance_url();
    let followers_collection_id = local_actor.followers();
    let activity_cache = factory.activity_cache();
    let mut recipients: Vec<Recipient> = vec![];
    for addressee in activity.recipients() {
        if is_public_address(&addressee) {
            continue;
        };
        if addressee == followers_collection_id {
            let followers = get_followers(
                factory.db_client(),
                &local_actor.parent,
            ).await?;
            for follower in followers {
                if follower.method != FollowerMethod::ActivityPub {
                    continue;
                };
                recipients.push(Recipient::new(
                    &follower.actor.profile_url,
                    follower.actor.delivery_inbox(),
                ));
            };
            continue;
        };
        if is_local_url(&instance_url, &addressee) {
            continue;
        };
        let actor = match activity_cache.load(&addressee).await {
            Ok(actor) => actor,
            Err(error) => {
                log::warn!("failed to dereference {}: {}", addressee, error);
                continue;
            },
        };
        let Some(inbox) = actor.shared_inbox().or(actor.inbox()) else {
            log::warn!("addressee has no inbox: {}", addressee);
            continue;
        };
        recipients.push(Recipient::new(&addressee, inbox));
    };
    // Keys are inboxes, not actor IDs, because actors can share an inbox
    recipients.sort_by(|a, b| a.inbox.cmp(&b.inbox));
    recipients.dedup_by(|a, b| a.inbox == b.inbox);
    Ok(recipients)
}

/// Queues activity for delivery to the specified recipients
pub async fn send_activity_to(
    factory: &Factory,
    local_actor: &LocalActor,
    activity: impl Serialize,
    recipients: Vec<Recipient>,
) -> Result<(), HandlerError> {
    if !factory.instance().federation_enabled {
        log::info!("(private mode) activity of {} is not delivered", local_actor.id);
        return Ok(());
    };
    let job_data = OutgoingActivityJobData::new(
        &local_actor.id,
        activity,
        recipients,
    );
    job_data.enqueue(factory.db_client()).await?;
    Ok(())
}

/// Queues activity for delivery to its addressees
pub async fn send_activity(
    factory: &Factory,
    local_actor: &LocalActor,
    activity: impl Serialize,
) -> Result<(), HandlerError> {
    let activity_json = serde_json::to_value(activity)?;
    let recipients = locate_recipients(
        factory,
        local_actor,
        &Document::new(activity_json.clone()),
    ).await?;
    send_activity_to(factory, local_actor, activity_json, recipients).await
}

fn build_deliverer_client(instance: &Instance) -> Result<Client, DelivererError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(instance.deliverer_timeout))
        .user_agent(instance.agent())
        .redirect(redirect::Policy::none())
        .build()?;
    Ok(client)
}

async fn send_object(
    client: &Client,
    object_json: &str,
    inbox_url: &str,
) -> Result<(), DelivererError> {
    let response = client.post(inbox_url)
        .header(header::CONTENT_TYPE, AP_MEDIA_TYPE)
        .body(object_json.to_owned())
        .send()
        .await?;
    let response_status = response.status();
    if response_status.is_success() {
        Ok(())
    } else {
        Err(DelivererError::HttpError(response_status))
    }
}

pub(crate) async fn deliver_activity_worker(
    instance: &Instance,
    activity: &JsonValue,
    recipients: &mut [Recipient],
) -> Result<(), DelivererError> {
    let activity_json = serde_json::to_string(activity)?;
    let client = build_deliverer_client(instance)?;
    let mut delivery_pool = FuturesUnordered::new();
    for (index, recipient) in recipients.iter().enumerate() {
        if recipient.is_finished() {
            continue;
        };
        let client = &client;
        let activity_json = &activity_json;
        let inbox = recipient.inbox.clone();
        // Deliver activities concurrently
        delivery_pool.push(async move {
            let result = send_object(client, activity_json, &inbox).await;
            (index, result)
        });
    };
    while let Some((index, result)) = delivery_pool.next().await {
        let Some(recipient) = recipients.get_mut(index) else {
            continue;
        };
        match result {
            Ok(_) => {
                log::info!("activity delivered to {}", recipient.inbox);
                recipient.is_delivered = true;
            },
            Err(error) => {
                if let DelivererError::HttpError(status) = error {
                    if status.as_u16() == HTTP_410_GONE {
                        // Inbox deleted
                        recipient.is_gone = true;
                    };
                };
                log::warn!(
                    "failed to deliver activity to {}: {}",
                    recipient.inbox,
                    error,
                );
            },
        };
    };
    Ok(())
}
