//! Publishers and subscribers

use log::{debug, info};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{SubscriptionError, SubscriptionResult};
use crate::subscription::{Subscription, SubscriptionId};

type LifecycleCallback = Rc<dyn Fn()>;

/// Something a [`Publisher`] can deliver messages to
///
/// Either a plain callback or another publisher, which re-sends every
/// message to its own subscribers.
pub enum Subscriber<M> {
    Callback(Rc<dyn Fn(&M)>),
    Publisher(Publisher<M>),
}

impl<M: 'static> Subscriber<M> {
    pub fn callback(f: impl Fn(&M) + 'static) -> Self {
        Subscriber::Callback(Rc::new(f))
    }

    pub(crate) fn deliver(&self, message: &M) {
        match self {
            Subscriber::Callback(f) => f(message),
            Subscriber::Publisher(publisher) => publisher.send(message),
        }
    }
}

impl<M> Clone for Subscriber<M> {
    fn clone(&self) -> Self {
        match self {
            Subscriber::Callback(f) => Subscriber::Callback(Rc::clone(f)),
            Subscriber::Publisher(p) => Subscriber::Publisher(p.clone()),
        }
    }
}

impl<M> From<Publisher<M>> for Subscriber<M> {
    fn from(publisher: Publisher<M>) -> Self {
        Subscriber::Publisher(publisher)
    }
}

impl<M> From<&Publisher<M>> for Subscriber<M> {
    fn from(publisher: &Publisher<M>) -> Self {
        Subscriber::Publisher(publisher.clone())
    }
}

impl<M> fmt::Debug for Subscriber<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subscriber::Callback(_) => f.write_str("Subscriber::Callback"),
            Subscriber::Publisher(p) => write!(f, "Subscriber::Publisher({})", p),
        }
    }
}

pub(crate) struct PublisherState<M> {
    name: String,
    active: HashMap<SubscriptionId, Subscriber<M>>,
    start_callbacks: Vec<LifecycleCallback>,
    stop_callbacks: Vec<LifecycleCallback>,
}

/// Emits messages to its active subscriptions
///
/// A publisher is INACTIVE with no active subscriptions and ACTIVE with at
/// least one. Start callbacks run on the 0 → 1 transition and stop
/// callbacks on 1 → 0; intermediate joins and leaves run nothing. Use the
/// callbacks to hold an expensive resource (a socket, a poller) open only
/// while someone is listening.
///
/// Handles are cheap to clone and share the same state. Publishers are
/// single-threaded: delivery is synchronous, on the caller's thread.
pub struct Publisher<M> {
    state: Rc<RefCell<PublisherState<M>>>,
}

impl<M> Clone for Publisher<M> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<M: 'static> Default for Publisher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: 'static> Publisher<M> {
    pub fn new() -> Self {
        Self::with_name("Publisher")
    }

    /// A publisher with a label used in logs
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(PublisherState {
                name: name.into(),
                active: HashMap::new(),
                start_callbacks: Vec::new(),
                stop_callbacks: Vec::new(),
            })),
        }
    }

    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    /// Create a subscription, optionally starting it right away
    ///
    /// When the subscriber is itself a publisher, the subscription follows
    /// it: it starts when the child gains its first active subscription and
    /// stops when the child loses its last one.
    pub fn subscribe(&self, subscriber: impl Into<Subscriber<M>>, start: bool) -> Subscription<M> {
        let subscriber = subscriber.into();
        let id = SubscriptionId::new();
        info!(
            "{} has new subscription, id={}, subscriber={:?}",
            self, id, subscriber
        );

        if let Subscriber::Publisher(child) = &subscriber {
            self.link_child(id, child);
        }

        let subscription = Subscription::new(id, self.clone(), subscriber);
        if start {
            // fresh id, can't already be active
            let _ = subscription.start();
        }
        subscription
    }

    pub fn is_subscription_active(&self, subscription: &Subscription<M>) -> SubscriptionResult<bool> {
        if !subscription.publisher().ptr_eq(self) {
            return Err(SubscriptionError::ForeignSubscription(subscription.id()));
        }
        Ok(self.is_active_id(subscription.id()))
    }

    pub fn add_start_callback(&self, f: impl Fn() + 'static) {
        self.state.borrow_mut().start_callbacks.push(Rc::new(f));
    }

    pub fn add_stop_callback(&self, f: impl Fn() + 'static) {
        self.state.borrow_mut().stop_callbacks.push(Rc::new(f));
    }

    /// Number of active subscriptions
    pub fn num_subscriptions(&self) -> usize {
        self.state.borrow().active.len()
    }

    pub fn active(&self) -> bool {
        self.num_subscriptions() > 0
    }

    /// Deliver `message` to every active subscription, in no particular order
    ///
    /// Subscribers may subscribe or stop subscriptions from inside their
    /// callback; this delivery still goes to the subscriptions that were
    /// active when it began.
    pub fn send(&self, message: &M) {
        let recipients: Vec<Subscriber<M>> = self.state.borrow().active.values().cloned().collect();
        for subscriber in &recipients {
            subscriber.deliver(message);
        }
    }

    pub(crate) fn start_subscription(
        &self,
        id: SubscriptionId,
        subscriber: &Subscriber<M>,
    ) -> SubscriptionResult<()> {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            if state.active.contains_key(&id) {
                return Err(SubscriptionError::AlreadyStarted(id));
            }
            state.active.insert(id, subscriber.clone());
            if state.active.len() == 1 {
                debug!("{} starting", state.name);
                state.start_callbacks.clone()
            } else {
                Vec::new()
            }
        };
        // borrow released, callbacks may touch this publisher again
        for f in callbacks {
            f();
        }
        Ok(())
    }

    pub(crate) fn stop_subscription(&self, id: SubscriptionId) -> SubscriptionResult<()> {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            if state.active.remove(&id).is_none() {
                return Err(SubscriptionError::AlreadyStopped(id));
            }
            if state.active.is_empty() {
                debug!("{} stopping", state.name);
                state.stop_callbacks.clone()
            } else {
                Vec::new()
            }
        };
        for f in callbacks {
            f();
        }
        Ok(())
    }

    pub(crate) fn is_active_id(&self, id: SubscriptionId) -> bool {
        self.state.borrow().active.contains_key(&id)
    }

    pub(crate) fn ptr_eq(&self, other: &Publisher<M>) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    fn downgrade(&self) -> Weak<RefCell<PublisherState<M>>> {
        Rc::downgrade(&self.state)
    }

    fn upgrade(state: &Weak<RefCell<PublisherState<M>>>) -> Option<Self> {
        state.upgrade().map(|state| Self { state })
    }

    /// Make subscription `id` (self → child) follow the child's activity
    ///
    /// Only weak references are captured, so neither publisher is kept
    /// alive by the other's callbacks.
    fn link_child(&self, id: SubscriptionId, child: &Publisher<M>) {
        let (parent_ref, child_ref) = (self.downgrade(), child.downgrade());
        child.add_start_callback(move || {
            let (Some(parent), Some(child)) = (Self::upgrade(&parent_ref), Self::upgrade(&child_ref))
            else {
                return;
            };
            if let Err(e) = parent.start_subscription(id, &Subscriber::Publisher(child)) {
                debug!("{}: {}", parent, e);
            }
        });

        let parent_ref = self.downgrade();
        child.add_stop_callback(move || {
            let Some(parent) = Self::upgrade(&parent_ref) else {
                return;
            };
            if let Err(e) = parent.stop_subscription(id) {
                debug!("{}: {}", parent, e);
            }
        });
    }
}

impl<M> fmt::Display for Publisher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => f.write_str(&state.name),
            Err(_) => f.write_str("Publisher"),
        }
    }
}

impl<M> fmt::Debug for Publisher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => f
                .debug_struct("Publisher")
                .field("name", &state.name)
                .field("active", &state.active.len())
                .finish(),
            Err(_) => f.write_str("Publisher { .. }"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallCounter, Recorder};

    #[test]
    fn test_subscribe_simple() {
        let p = Publisher::new();
        let recorder = Recorder::new();
        let _subscription = p.subscribe(recorder.subscriber(), true);

        p.send(&"message1");
        assert_eq!(recorder.last(), Some("message1"));
        assert_eq!(recorder.call_count(), 1);

        p.send(&"message2");
        assert_eq!(recorder.last(), Some("message2"));
        assert_eq!(recorder.call_count(), 2);
    }

    #[test]
    fn test_send_without_subscribers() {
        let p: Publisher<i32> = Publisher::new();
        p.send(&1);
        assert!(!p.active());
        assert_eq!(p.num_subscriptions(), 0);
    }

    #[test]
    fn test_delayed_start() {
        let p = Publisher::new();
        let recorder = Recorder::new();
        let subscription = p.subscribe(recorder.subscriber(), false);

        p.send(&1);
        assert_eq!(recorder.call_count(), 0);
        assert!(!subscription.is_active());

        subscription.start().unwrap();
        p.send(&2);
        assert_eq!(recorder.calls(), vec![2]);
    }

    #[test]
    fn test_double_start_and_stop_fail() {
        let p: Publisher<i32> = Publisher::new();
        let subscription = p.subscribe(Subscriber::callback(|_| {}), false);

        assert_eq!(
            subscription.stop(),
            Err(SubscriptionError::AlreadyStopped(subscription.id()))
        );
        subscription.start().unwrap();
        assert_eq!(
            subscription.start(),
            Err(SubscriptionError::AlreadyStarted(subscription.id()))
        );
        subscription.stop().unwrap();
        assert!(subscription.stop().is_err());
    }

    #[test]
    fn test_start_stop_callbacks_only_on_boundary() {
        let p: Publisher<i32> = Publisher::new();
        let s1 = p.subscribe(Subscriber::callback(|_| {}), false);
        let (started, stopped) = (CallCounter::new(), CallCounter::new());
        p.add_start_callback(started.callback());
        p.add_stop_callback(stopped.callback());
        let s2 = p.subscribe(Subscriber::callback(|_| {}), false);
        assert_eq!((started.count(), stopped.count()), (0, 0));

        s1.start().unwrap();
        assert_eq!((started.count(), stopped.count()), (1, 0));
        s2.start().unwrap();
        assert_eq!((started.count(), stopped.count()), (1, 0));
        s1.stop().unwrap();
        assert_eq!((started.count(), stopped.count()), (1, 0));
        s2.stop().unwrap();
        assert_eq!((started.count(), stopped.count()), (1, 1));
        s2.start().unwrap();
        assert_eq!((started.count(), stopped.count()), (2, 1));
        s2.stop().unwrap();
        assert_eq!((started.count(), stopped.count()), (2, 2));
    }

    #[test]
    fn test_foreign_subscription() {
        let p1: Publisher<i32> = Publisher::new();
        let p2: Publisher<i32> = Publisher::new();
        let subscription = p1.subscribe(Subscriber::callback(|_| {}), true);

        assert_eq!(p1.is_subscription_active(&subscription), Ok(true));
        assert_eq!(
            p2.is_subscription_active(&subscription),
            Err(SubscriptionError::ForeignSubscription(subscription.id()))
        );
    }

    #[test]
    fn test_callback_can_resubscribe_during_send() {
        let p: Publisher<i32> = Publisher::new();
        let late = Recorder::new();
        let joiner = {
            let p = p.clone();
            let late = late.clone();
            Subscriber::callback(move |_: &i32| {
                // leaked on purpose: keeps the subscription around
                let _ = p.subscribe(late.subscriber(), true);
            })
        };
        let _s = p.subscribe(joiner, true);

        p.send(&1);
        // joined during the first send, so only sees the second
        assert_eq!(late.call_count(), 0);
        p.send(&2);
        assert_eq!(late.calls(), vec![2]);
    }

    #[test]
    fn test_callback_can_stop_itself_during_send() {
        let p: Publisher<i32> = Publisher::new();
        let other = Recorder::new();
        let _other_sub = p.subscribe(other.subscriber(), true);

        let slot: Rc<RefCell<Option<Subscription<i32>>>> = Rc::new(RefCell::new(None));
        let hits = CallCounter::new();
        let quitter = {
            let slot = Rc::clone(&slot);
            let hit = hits.callback();
            Subscriber::callback(move |_: &i32| {
                hit();
                if let Some(subscription) = slot.borrow().as_ref() {
                    let _ = subscription.stop();
                }
            })
        };
        *slot.borrow_mut() = Some(p.subscribe(quitter, true));

        p.send(&1);
        p.send(&2);
        assert_eq!(hits.count(), 1);
        assert_eq!(other.call_count(), 2);
        assert_eq!(p.num_subscriptions(), 1);
    }

    #[test]
    fn test_display_uses_name() {
        let p: Publisher<i32> = Publisher::with_name("tickers");
        assert_eq!(p.to_string(), "tickers");
        assert_eq!(p.name(), "tickers");
    }
}
