//! Port for handing outgoing email to a delivery adapter.
use async_trait::async_trait;

use crate::domain::EmailMessage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum MailerError {
        /// The message could not be accepted for delivery.
        Rejected { message: String } => "mail delivery rejected: {message}",
        /// The delivery queue is closed.
        QueueClosed => "mail queue is closed",
    }
}

/// Outgoing email sink.
///
/// Implementations may deliver synchronously or enqueue; callers treat a
/// successful return as "accepted", not "delivered".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Accept a message for delivery.
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}
