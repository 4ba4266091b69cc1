//! Topic naming

use mexbt_core::{Currency, Market};
use std::fmt;

/// A channel of a [`MultitopicPublisher`](crate::MultitopicPublisher)
///
/// `All` is the catch-all channel: its subscribers see every message, and
/// sending to it reaches every channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    All,
    Named(String),
}

impl Topic {
    pub fn is_all(&self) -> bool {
        matches!(self, Topic::All)
    }
}

impl From<&str> for Topic {
    fn from(name: &str) -> Self {
        if name == Topics::ALL {
            Topic::All
        } else {
            Topic::Named(name.to_string())
        }
    }
}

impl From<String> for Topic {
    fn from(name: String) -> Self {
        if name == Topics::ALL {
            Topic::All
        } else {
            Topic::Named(name)
        }
    }
}

impl From<&Topic> for Topic {
    fn from(topic: &Topic) -> Self {
        topic.clone()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::All => f.write_str(Topics::ALL),
            Topic::Named(name) => f.write_str(name),
        }
    }
}

/// Topic names for market data streams
///
/// Streams are keyed by the exchange's pair code, `COUNTER_BASE` unless the
/// exchange uses its own.
pub struct Topics;

impl Topics {
    /// Name of the catch-all topic
    pub const ALL: &'static str = "[ALL TOPICS]";

    /// Pair code: `USDT_BTC` for BTC quoted in USDT
    pub fn pair_code(counter: &Currency, base: &Currency) -> String {
        format!("{}_{}", counter, base)
    }

    /// The stream topic of a market
    pub fn for_market(market: &Market) -> Topic {
        Topic::Named(market.code().to_string())
    }

    pub fn all() -> Topic {
        Topic::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        let (btc, usdt) = (Currency::new("BTC"), Currency::new("USDT"));
        assert_eq!(Topics::pair_code(&usdt, &btc), "USDT_BTC");

        let market = Market::new("Poloniex", btc, usdt).unwrap();
        assert_eq!(Topics::for_market(&market), Topic::from("USDT_BTC"));
        assert_eq!(
            Topics::for_market(&market.with_code("usdt-btc")),
            Topic::Named("usdt-btc".to_string())
        );
    }

    #[test]
    fn test_catch_all_name() {
        assert_eq!(Topic::from("[ALL TOPICS]"), Topic::All);
        assert!(Topics::all().is_all());
        assert_eq!(Topic::All.to_string(), "[ALL TOPICS]");
        assert!(!Topic::from(String::from("c1")).is_all());
    }
}
