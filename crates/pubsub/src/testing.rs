//! Test doubles for subscribers and lifecycle callbacks

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::Subscriber;

/// Records every message delivered to its subscribers
pub struct Recorder<M> {
    calls: Rc<RefCell<Vec<M>>>,
}

impl<M> Clone for Recorder<M> {
    fn clone(&self) -> Self {
        Self {
            calls: Rc::clone(&self.calls),
        }
    }
}

impl<M: Clone + 'static> Default for Recorder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Clone + 'static> Recorder<M> {
    pub fn new() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A subscriber that records into this recorder
    pub fn subscriber(&self) -> Subscriber<M> {
        let calls = Rc::clone(&self.calls);
        Subscriber::callback(move |message: &M| calls.borrow_mut().push(message.clone()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// The most recent message
    pub fn last(&self) -> Option<M> {
        self.calls.borrow().last().cloned()
    }

    pub fn calls(&self) -> Vec<M> {
        self.calls.borrow().clone()
    }
}

/// Counts invocations of a start/stop callback
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    count: Rc<Cell<usize>>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl Fn() + 'static {
        let count = Rc::clone(&self.count);
        move || count.set(count.get() + 1)
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }
}
