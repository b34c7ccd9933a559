pub mod models;
pub mod format;

pub use models::{DisplayCoin, Snapshot, PAGE_SIZE};
