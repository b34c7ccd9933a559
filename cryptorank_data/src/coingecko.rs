use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use cryptorank_ext_serde::BigDecimalExact;

/// Query for the `/coins/markets` endpoint. The board only ever asks for the
/// first page of the top coins by market cap, priced in USD.
#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
pub struct MarketsQuery {
    pub vs_currency: &'static str,
    pub order: &'static str,
    pub per_page: usize,
    pub page: u32,
    pub sparkline: bool,
}

impl Default for MarketsQuery {
    fn default() -> Self {
        MarketsQuery {
            vs_currency: "usd",
            order: "market_cap_desc",
            per_page: 20,
            page: 1,
            sparkline: false,
        }
    }
}

/// One element of the `/coins/markets` response. Fields the board has no use
/// for are skipped.
#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct RawMarketEntry {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,

    #[serde_as(as = "BigDecimalExact")]
    pub current_price: BigDecimal,

    #[serde_as(as = "BigDecimalExact")]
    pub market_cap: BigDecimal,

    #[serde(default)]
    pub market_cap_rank: Option<u32>,

    #[serde_as(as = "BigDecimalExact")]
    pub total_volume: BigDecimal,

    #[serde(default)]
    #[serde_as(as = "Option<BigDecimalExact>")]
    pub price_change_percentage_24h: Option<BigDecimal>,
}
