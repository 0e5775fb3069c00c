//! Object store write notifications
//!
//! Queue messages carry an S3 event document, either directly or inside an SNS
//! envelope when the bucket fans out through a topic. Keys in these documents are
//! form-encoded (`+` for space, `%XX` for everything else).

use serde::Deserialize;
use thiserror::Error;

const SNS_NOTIFICATION_TYPE: &str = "Notification";
const TEST_EVENT: &str = "s3:TestEvent";
const OBJECT_CREATED_PREFIX: &str = "ObjectCreated:";

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Malformed notification: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Undecodable object key {key:?}: {reason}")]
    KeyDecoding { key: String, reason: String },
}

/// One record of an S3 event notification.
///
/// `key` is kept exactly as received; use [`decode_object_key`] before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEvent {
    pub event_name: String,
    pub bucket: String,
    pub key: String,
    pub size: u64,
    pub content_type: Option<String>,
}

impl ObjectEvent {
    pub fn is_object_created(&self) -> bool {
        self.event_name.starts_with(OBJECT_CREATED_PREFIX)
            || self.event_name.starts_with("s3:ObjectCreated:")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Records of a real event, in document order
    Objects(Vec<ObjectEvent>),
    /// Sent by S3 once when a notification configuration is saved
    TestEvent,
}

#[derive(Debug, Deserialize)]
struct SnsEnvelope {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct EventDocument {
    #[serde(rename = "Records", default)]
    records: Vec<EventRecord>,
    #[serde(rename = "Event", default)]
    event: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    #[serde(rename = "eventName")]
    event_name: String,
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
    // Absent on delete events
    #[serde(default)]
    size: u64,
    #[serde(rename = "contentType", default)]
    content_type: Option<String>,
}

/// Parse a queue message body into a notification.
pub fn parse_notification(body: &str) -> Result<Notification, EventError> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    let document: EventDocument = match serde_json::from_value::<SnsEnvelope>(value.clone()) {
        Ok(envelope) if envelope.kind == SNS_NOTIFICATION_TYPE => {
            serde_json::from_str(&envelope.message)?
        }
        _ => serde_json::from_value(value)?,
    };

    if document.event.as_deref() == Some(TEST_EVENT) {
        return Ok(Notification::TestEvent);
    }

    let events = document
        .records
        .into_iter()
        .map(|record| ObjectEvent {
            event_name: record.event_name,
            bucket: record.s3.bucket.name,
            key: record.s3.object.key,
            size: record.s3.object.size,
            content_type: record.s3.object.content_type,
        })
        .collect();

    Ok(Notification::Objects(events))
}

/// Undo the form encoding S3 applies to keys in notifications.
pub fn decode_object_key(raw: &str) -> Result<String, EventError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| EventError::KeyDecoding {
            key: raw.to_string(),
            reason: e.to_string(),
        })
}
