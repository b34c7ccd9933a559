#[macro_use]
extern crate log;

pub mod coingecko;
pub mod client;
pub mod fresh;

pub use coingecko::{RawMarketEntry, MarketsQuery};
pub use client::{MarketSource, MarketSourceRef, Markets, CoinGeckoClient, FreshnessCache, FetchError};
pub use fresh::Fresh;
