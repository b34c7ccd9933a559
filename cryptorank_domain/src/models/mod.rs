mod display_coin;
pub use display_coin::{DisplayCoin, Snapshot, PAGE_SIZE};
