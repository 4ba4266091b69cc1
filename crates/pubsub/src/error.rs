//! Error types for the pubsub crate

use thiserror::Error;

use crate::SubscriptionId;

/// Subscription state errors
///
/// These are precondition violations by the caller (starting a running
/// subscription, asking a publisher about another publisher's subscription).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Subscription already started: {0}")]
    AlreadyStarted(SubscriptionId),

    #[error("Subscription already stopped: {0}")]
    AlreadyStopped(SubscriptionId),

    #[error("Subscription {0} is for a different publisher")]
    ForeignSubscription(SubscriptionId),
}

pub type SubscriptionResult<T> = std::result::Result<T, SubscriptionError>;
