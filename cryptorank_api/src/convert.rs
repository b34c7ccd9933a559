use bigdecimal::{BigDecimal, Zero};

use cryptorank_data::RawMarketEntry;
use cryptorank_domain::{DisplayCoin, Snapshot, PAGE_SIZE};

/// Shapes one upstream entry for display. `position` is the 0-based index in
/// the upstream page and stands in for a missing market-cap rank.
pub fn to_display_coin(entry: &RawMarketEntry, position: usize) -> DisplayCoin {
    DisplayCoin {
        rank: entry.market_cap_rank.unwrap_or(position as u32 + 1),
        name: entry.name.clone(),
        symbol: entry.symbol.to_uppercase(),
        price: entry.current_price.clone(),
        change_24h: entry.price_change_percentage_24h.clone().unwrap_or_else(BigDecimal::zero),
        market_cap: entry.market_cap.clone(),
        volume: entry.total_volume.clone(),
        logo: entry.image.clone(),
    }
}

/// Keeps upstream order; never more than one page.
pub fn to_snapshot(entries: &[RawMarketEntry]) -> Snapshot {
    entries.iter()
        .take(PAGE_SIZE)
        .enumerate()
        .map(|(i, entry)| to_display_coin(entry, i))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::str::FromStr;

    pub fn raw_entry(symbol: &str, rank: Option<u32>, change: Option<&str>) -> RawMarketEntry {
        let rank = rank.map(|r| r.to_string()).unwrap_or_else(|| "null".into());
        let change = change.unwrap_or("null");
        let json = format!(
            r#"{{
                "id": "{0}-id",
                "symbol": "{0}",
                "name": "{0} coin",
                "image": "https://example.com/{0}.png",
                "current_price": 45000.5,
                "market_cap": 1500000000,
                "market_cap_rank": {1},
                "total_volume": 999,
                "price_change_percentage_24h": {2}
            }}"#,
            symbol, rank, change);

        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn missing_change_becomes_zero() {
        let coin = to_display_coin(&raw_entry("eth", Some(2), None), 1);
        assert_eq!(coin.change_24h, BigDecimal::zero());
    }

    #[test]
    fn present_change_is_copied() {
        let coin = to_display_coin(&raw_entry("eth", Some(2), Some("-3.456")), 1);
        assert_eq!(coin.change_24h, BigDecimal::from_str("-3.456").unwrap());
    }

    #[test]
    fn fields_are_copied_and_symbol_uppercased() {
        let coin = to_display_coin(&raw_entry("btc", Some(1), Some("1.5")), 0);
        assert_eq!(coin.rank, 1);
        assert_eq!(coin.symbol, "BTC");
        assert_eq!(coin.name, "btc coin");
        assert_eq!(coin.logo, "https://example.com/btc.png");
        assert_eq!(coin.price, BigDecimal::from_str("45000.5").unwrap());
        assert_eq!(coin.market_cap, BigDecimal::from(1_500_000_000u64));
        assert_eq!(coin.volume, BigDecimal::from(999));
    }

    #[test]
    fn missing_rank_falls_back_to_position() {
        let coin = to_display_coin(&raw_entry("new", None, None), 6);
        assert_eq!(coin.rank, 7);
    }

    #[test]
    fn snapshot_preserves_count_and_order() {
        let entries: Vec<_> = (1..=20)
            .map(|i| raw_entry(&format!("c{}", i), Some(i), None))
            .collect();

        let snapshot = to_snapshot(&entries);
        assert_eq!(snapshot.len(), 20);
        for (i, (coin, entry)) in snapshot.iter().zip(entries.iter()).enumerate() {
            assert_eq!(coin.rank as usize, i + 1);
            assert_eq!(coin.symbol, entry.symbol.to_uppercase());
        }
    }

    #[test]
    fn snapshot_never_exceeds_one_page() {
        let entries: Vec<_> = (1..=25)
            .map(|i| raw_entry("x", Some(i), None))
            .collect();
        assert_eq!(to_snapshot(&entries).len(), PAGE_SIZE);
    }
}
