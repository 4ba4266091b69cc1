//! Per-topic fan-out

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::publisher::{Publisher, Subscriber};
use crate::subscription::Subscription;
use crate::topics::Topic;

struct TopicChannel<M> {
    publisher: Publisher<M>,
    /// base → channel publisher, active while the channel has listeners
    link: Subscription<M>,
}

impl<M> Clone for TopicChannel<M> {
    fn clone(&self) -> Self {
        Self {
            publisher: self.publisher.clone(),
            link: self.link.clone(),
        }
    }
}

/// A publisher that fans messages out by topic
///
/// Each topic gets its own child [`Publisher`] (created on first use and
/// never removed), nested under a base publisher. The base is active while
/// any topic has an active subscription, so start/stop callbacks registered
/// here open and close a shared upstream feed.
///
/// Sending to a named topic reaches that topic's subscribers and the
/// catch-all subscribers. Sending to [`Topic::All`] reaches every channel.
pub struct MultitopicPublisher<M> {
    base: Publisher<M>,
    channels: Rc<RefCell<HashMap<Topic, TopicChannel<M>>>>,
}

impl<M> Clone for MultitopicPublisher<M> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            channels: Rc::clone(&self.channels),
        }
    }
}

impl<M: 'static> Default for MultitopicPublisher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: 'static> MultitopicPublisher<M> {
    pub fn new() -> Self {
        Self::with_name("MultitopicPublisher")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let publisher = Self {
            base: Publisher::with_name(name),
            channels: Rc::new(RefCell::new(HashMap::new())),
        };
        publisher.topic_publisher(Topic::All);
        publisher
    }

    /// The publisher for `topic`, creating the channel if needed
    pub fn topic_publisher(&self, topic: impl Into<Topic>) -> Publisher<M> {
        self.channel(&topic.into()).publisher
    }

    pub fn subscribe(
        &self,
        subscriber: impl Into<Subscriber<M>>,
        topic: impl Into<Topic>,
        start: bool,
    ) -> Subscription<M> {
        self.topic_publisher(topic).subscribe(subscriber, start)
    }

    pub fn send(&self, message: &M, topic: impl Into<Topic>) {
        let links: Vec<Subscription<M>> = match topic.into() {
            Topic::All => self
                .channels
                .borrow()
                .values()
                .map(|channel| channel.link.clone())
                .collect(),
            named => vec![self.channel(&named).link, self.channel(&Topic::All).link],
        };
        for link in &links {
            link.send(message);
        }
    }

    /// Active subscriptions summed over every topic
    pub fn num_subscriptions(&self) -> usize {
        let publishers: Vec<Publisher<M>> = self
            .channels
            .borrow()
            .values()
            .map(|channel| channel.publisher.clone())
            .collect();
        publishers.iter().map(Publisher::num_subscriptions).sum()
    }

    pub fn active(&self) -> bool {
        self.base.active()
    }

    pub fn add_start_callback(&self, f: impl Fn() + 'static) {
        self.base.add_start_callback(f);
    }

    pub fn add_stop_callback(&self, f: impl Fn() + 'static) {
        self.base.add_stop_callback(f);
    }

    /// Every topic with a channel, sorted, catch-all first
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.channels.borrow().keys().cloned().collect();
        topics.sort();
        topics
    }

    /// The publisher the topic channels are nested under
    pub fn base(&self) -> &Publisher<M> {
        &self.base
    }

    fn channel(&self, topic: &Topic) -> TopicChannel<M> {
        if let Some(channel) = self.channels.borrow().get(topic) {
            return channel.clone();
        }

        let publisher = Publisher::with_name(format!("{} [{}]", self.base, topic));
        let link = self.base.subscribe(publisher.clone(), false);
        let channel = TopicChannel { publisher, link };
        self.channels
            .borrow_mut()
            .insert(topic.clone(), channel.clone());
        channel
    }
}

impl<M> fmt::Debug for MultitopicPublisher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.channels.try_borrow().map(|c| c.len()).unwrap_or(0);
        f.debug_struct("MultitopicPublisher")
            .field("base", &self.base)
            .field("topics", &topics)
            .finish()
    }
}
