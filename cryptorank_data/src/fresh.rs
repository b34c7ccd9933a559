use tokio::time::{Duration, Instant};

/// A value stamped with the moment it was fetched.
#[derive(Debug, Clone)]
pub struct Fresh<T> {
    value: T,
    fetched_at: Instant,
}

impl<T> Fresh<T> {
    pub fn new(value: T) -> Fresh<T> {
        Fresh::fetched_at(value, Instant::now())
    }

    pub fn fetched_at(value: T, fetched_at: Instant) -> Fresh<T> {
        Fresh { value, fetched_at }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    /// True while strictly younger than `window`. A zero window is never fresh.
    pub fn is_fresh_at(&self, now: Instant, window: Duration) -> bool {
        self.age_at(now) < window
    }

    pub fn is_fresh(&self, window: Duration) -> bool {
        self.is_fresh_at(Instant::now(), window)
    }
}
