//! SQS long-poll loop feeding a notification handler

use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::Client;
use filedrop_core::config::QueueConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::events::{parse_notification, Notification};
use crate::handler::{BatchReport, NotificationHandler};

const RECEIVE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Visibility kept on top of a handler's invocation budget before SQS redelivers.
const VISIBILITY_MARGIN: Duration = Duration::from_secs(60);

/// What happened to one queue message. Every disposition ends with the message deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageDisposition {
    Handled(BatchReport),
    TestEvent,
    Unparseable,
}

/// Parse `body` and run it through `handler`.
pub async fn handle_message_body(handler: &dyn NotificationHandler, body: &str) -> MessageDisposition {
    match parse_notification(body) {
        Ok(Notification::TestEvent) => {
            tracing::debug!(handler = handler.name(), "Ignoring storage test event");
            MessageDisposition::TestEvent
        }
        Ok(Notification::Objects(events)) => {
            let report = handler.handle_notification(&events).await;
            tracing::debug!(
                handler = handler.name(),
                succeeded = report.succeeded,
                skipped = report.skipped,
                failed = report.failed,
                "Notification handled"
            );
            MessageDisposition::Handled(report)
        }
        Err(e) => {
            tracing::error!(handler = handler.name(), error = %e, "Dropping unparseable notification");
            MessageDisposition::Unparseable
        }
    }
}

/// Consumes one SQS queue until cancelled.
///
/// Messages are deleted after their batch is handled, whatever the outcome. Redelivery
/// only happens when the process dies mid-batch, and both handlers tolerate replays.
///
/// A handler with an invocation budget receives one message per poll, hidden for the
/// budget plus a margin, so a message is never redelivered while it is being handled.
pub struct SqsDispatcher {
    client: Client,
    queue_url: String,
    wait_time_secs: i32,
    max_messages: i32,
    visibility_timeout_secs: Option<i32>,
    handler: Arc<dyn NotificationHandler>,
}

impl SqsDispatcher {
    pub fn new(
        client: Client,
        queue_url: impl Into<String>,
        queues: &QueueConfig,
        handler: Arc<dyn NotificationHandler>,
    ) -> Self {
        let (max_messages, visibility_timeout_secs) = match handler.invocation_budget() {
            Some(budget) => {
                let visibility = (budget + VISIBILITY_MARGIN).as_secs();
                (1, Some(i32::try_from(visibility).unwrap_or(i32::MAX)))
            }
            None => (queues.max_messages, None),
        };

        Self {
            client,
            queue_url: queue_url.into(),
            wait_time_secs: queues.wait_time_secs,
            max_messages,
            visibility_timeout_secs,
            handler,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            handler = self.handler.name(),
            queue_url = %self.queue_url,
            wait_time_secs = self.wait_time_secs,
            max_messages = self.max_messages,
            "Notification consumer started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!(handler = self.handler.name(), "Notification consumer shutting down");
                    break;
                }
                result = self.poll_once() => {
                    if let Err(e) = result {
                        tracing::warn!(
                            handler = self.handler.name(),
                            error = %e,
                            "Failed to receive messages, will retry"
                        );
                        tokio::select! {
                            _ = shutdown.cancelled() => break,
                            _ = tokio::time::sleep(RECEIVE_RETRY_DELAY) => {}
                        }
                    }
                }
            }
        }

        tracing::info!(handler = self.handler.name(), "Notification consumer stopped");
    }

    async fn poll_once(&self) -> anyhow::Result<usize> {
        let mut request = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(self.max_messages)
            .wait_time_seconds(self.wait_time_secs);
        if let Some(visibility) = self.visibility_timeout_secs {
            request = request.visibility_timeout(visibility);
        }

        let output = request
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{}", DisplayErrorContext(&e)))?;
        let messages = output.messages();

        for message in messages {
            let disposition = match message.body() {
                Some(body) => handle_message_body(self.handler.as_ref(), body).await,
                None => MessageDisposition::Unparseable,
            };

            if let MessageDisposition::Handled(report) = &disposition {
                if report.failed > 0 {
                    tracing::warn!(
                        handler = self.handler.name(),
                        message_id = ?message.message_id(),
                        failed = report.failed,
                        "Notification handled with failures"
                    );
                }
            }

            if let Some(receipt_handle) = message.receipt_handle() {
                if let Err(e) = self
                    .client
                    .delete_message()
                    .queue_url(&self.queue_url)
                    .receipt_handle(receipt_handle)
                    .send()
                    .await
                {
                    tracing::error!(
                        handler = self.handler.name(),
                        message_id = ?message.message_id(),
                        error = %DisplayErrorContext(&e),
                        "Failed to delete message"
                    );
                }
            }
        }

        Ok(messages.len())
    }
}
