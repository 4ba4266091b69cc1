//! mexbt Pub/Sub
//!
//! In-process publish/subscribe used for streaming market data. Provides:
//! - `Publisher`: synchronous fan-out to active subscriptions, with start/stop
//!   callbacks on the 0 ↔ 1 active-subscription boundary
//! - Nesting: a publisher can subscribe to another publisher, and activity
//!   propagates up the tree
//! - `MultitopicPublisher`: one child publisher per topic plus a catch-all
//!
//! ## Architecture
//!
//! ```text
//! Exchange adapter (websocket / poller)
//!         │ send(ticker, "USDT_BTC")
//!    ┌────▼──────────────┐
//!    │MultitopicPublisher│── start/stop callbacks open/close the feed
//!    └──┬──────┬──────┬──┘
//!       │      │      │
//!   [ALL]  USDT_BTC  BTC_ETH      (topic publishers)
//!       │      │      │
//!   callbacks or nested publishers
//! ```
//!
//! Everything is single-threaded (`Rc`/`RefCell`); `send` runs subscriber
//! callbacks on the caller's thread before returning.

pub mod error;
pub mod multitopic;
pub mod publisher;
pub mod subscription;
pub mod testing;
pub mod topics;

// Re-export commonly used types
pub use error::{SubscriptionError, SubscriptionResult};
pub use multitopic::MultitopicPublisher;
pub use publisher::{Publisher, Subscriber};
pub use subscription::{Subscription, SubscriptionId};
pub use topics::{Topic, Topics};
