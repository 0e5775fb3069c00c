//! Filedrop Worker Library
//!
//! Consumers of object-store write notifications. Two handlers react to the same
//! upload independently:
//! - [`MetadataUpdater`] moves the file record from pending to completed
//! - [`MediaConverter`] renders a thumbnail for images and videos
//!
//! Notifications arrive on SQS queues, either as raw S3 event documents or wrapped
//! in an SNS envelope. [`SqsDispatcher`] feeds them to a [`NotificationHandler`].

pub mod converter;
pub mod dispatcher;
pub mod events;
pub mod handler;
pub mod updater;

pub use converter::{ConversionFailure, ConversionOutcome, MediaConverter, SkipReason};
pub use dispatcher::{handle_message_body, MessageDisposition, SqsDispatcher};
pub use events::{decode_object_key, parse_notification, EventError, Notification, ObjectEvent};
pub use handler::{BatchReport, NotificationHandler};
pub use updater::MetadataUpdater;
