use std::fmt;
use uuid::Uuid;

use crate::error::SubscriptionResult;
use crate::publisher::{Publisher, Subscriber};

/// Unique subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The association between a [`Publisher`] and one subscriber
///
/// Created inactive or active by [`Publisher::subscribe`]. Dropping the
/// handle does not stop the subscription; call [`Subscription::stop`].
pub struct Subscription<M> {
    id: SubscriptionId,
    publisher: Publisher<M>,
    subscriber: Subscriber<M>,
}

impl<M> Clone for Subscription<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            publisher: self.publisher.clone(),
            subscriber: self.subscriber.clone(),
        }
    }
}

impl<M: 'static> Subscription<M> {
    pub(crate) fn new(id: SubscriptionId, publisher: Publisher<M>, subscriber: Subscriber<M>) -> Self {
        Self {
            id,
            publisher,
            subscriber,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn publisher(&self) -> &Publisher<M> {
        &self.publisher
    }

    pub fn subscriber(&self) -> &Subscriber<M> {
        &self.subscriber
    }

    pub fn is_active(&self) -> bool {
        self.publisher.is_active_id(self.id)
    }

    /// Fails with `AlreadyStarted` if the subscription is active
    pub fn start(&self) -> SubscriptionResult<()> {
        self.publisher.start_subscription(self.id, &self.subscriber)
    }

    /// Fails with `AlreadyStopped` if the subscription is inactive
    pub fn stop(&self) -> SubscriptionResult<()> {
        self.publisher.stop_subscription(self.id)
    }

    /// Deliver straight to the subscriber, active or not
    pub fn send(&self, message: &M) {
        self.subscriber.deliver(message);
    }
}

impl<M> fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("publisher", &self.publisher)
            .field("subscriber", &self.subscriber)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(SubscriptionId::new(), SubscriptionId::new());
    }

    #[test]
    fn test_send_bypasses_activity() {
        let p: Publisher<u8> = Publisher::new();
        let recorder = Recorder::new();
        let subscription = p.subscribe(recorder.subscriber(), false);

        subscription.send(&7);
        assert_eq!(recorder.calls(), vec![7]);
        assert!(!subscription.is_active());
    }

    #[test]
    fn test_dropping_handle_keeps_subscription() {
        let p: Publisher<u8> = Publisher::new();
        let recorder = Recorder::new();
        drop(p.subscribe(recorder.subscriber(), true));

        p.send(&1);
        assert_eq!(recorder.call_count(), 1);
        assert!(p.active());
    }
}
