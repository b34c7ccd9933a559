use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use cryptorank_ext_serde::JsonDecimal;

use crate::format::ChangeDirection;

/// Number of coins in one snapshot.
pub const PAGE_SIZE: usize = 20;

/// One row of the ranking board, as served by `GET /api/crypto`.
#[serde_as]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DisplayCoin {
    pub rank: u32,
    pub name: String,

    /// Always uppercase.
    pub symbol: String,

    #[serde_as(as = "JsonDecimal")]
    pub price: BigDecimal,

    #[serde(rename = "change24h")]
    #[serde_as(as = "JsonDecimal")]
    pub change_24h: BigDecimal,

    #[serde(rename = "marketCap")]
    #[serde_as(as = "JsonDecimal")]
    pub market_cap: BigDecimal,

    #[serde_as(as = "JsonDecimal")]
    pub volume: BigDecimal,

    pub logo: String,
}

impl DisplayCoin {
    pub fn direction(&self) -> ChangeDirection {
        ChangeDirection::of(&self.change_24h)
    }
}

/// Rank-ordered coins from a single fetch. Order is significant.
pub type Snapshot = Vec<DisplayCoin>;
