//! Mail adapters.
//!
//! [`LogMailer`] writes each message to the trace log and is the delivery
//! backend in development. [`QueuedMailer`] accepts messages onto a bounded
//! channel and delivers them from a background task, so request handlers never
//! wait on the transport.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::{EmailMessage, TraceId};
use crate::domain::ports::{Mailer, MailerError};

/// Mailer that logs messages instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            trace_id = TraceId::current().map(tracing::field::display),
            "email delivered to log"
        );
        Ok(())
    }
}

/// Default number of messages buffered before `send` starts refusing.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Mailer that hands messages to a background delivery task.
#[derive(Clone)]
pub struct QueuedMailer {
    sender: mpsc::Sender<Queued>,
}

/// A message plus the request it was raised from.
struct Queued {
    message: EmailMessage,
    trace_id: Option<TraceId>,
}

impl QueuedMailer {
    /// Start a delivery task forwarding to `transport`.
    ///
    /// The task ends once every clone of the returned mailer is dropped and
    /// the queue has drained.
    pub fn spawn(transport: Arc<dyn Mailer>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<Queued>(capacity.max(1));
        let handle = tokio::spawn(async move {
            while let Some(Queued { message, trace_id }) = receiver.recv().await {
                TraceId::scope_optional(trace_id, async {
                    if let Err(err) = transport.send(&message).await {
                        warn!(to = %message.to, subject = %message.subject, error = %err, "email delivery failed");
                    }
                })
                .await;
            }
        });
        (Self { sender }, handle)
    }
}

#[async_trait]
impl Mailer for QueuedMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        self.sender
            .try_send(Queued {
                message: message.clone(),
                trace_id: TraceId::current(),
            })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => MailerError::rejected("mail queue is full"),
                mpsc::error::TrySendError::Closed(_) => MailerError::queue_closed(),
            })
    }
}
