mod market;
mod order;
mod orderbook;
mod side;
pub mod ticker;

pub use market::{Market, MarketList, MarketQuery};
pub use order::{Order, OrderBuilder};
pub use orderbook::Orderbook;
pub use side::Side;
pub use ticker::{Ticker, TickerFields, TickerSchema};
