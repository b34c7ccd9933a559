//! Keeps the board's snapshot current.
//!
//! [`RefreshController`] owns the one [`BoardState`] and is the only thing that
//! writes it. Observers get whole states over a `watch` channel. Timer ticks
//! come from a [`RefreshLoop`]; manual retries call
//! [`RefreshController::refresh`] directly. Either way at most one refresh is
//! in flight and a trigger that arrives meanwhile is skipped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};

use cryptorank_domain::Snapshot;
use crate::source::SnapshotSourceRef;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BoardStatus {
    Idle,
    Refreshing,
    Error(String),
}

#[derive(Clone, Debug)]
pub struct BoardState {
    pub coins: Arc<Snapshot>,
    pub status: BoardStatus,
    pub last_updated: DateTime<Utc>,
}

impl BoardState {
    pub fn seeded(coins: Snapshot) -> BoardState {
        BoardState {
            coins: Arc::new(coins),
            status: BoardStatus::Idle,
            last_updated: Utc::now(),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.status == BoardStatus::Refreshing
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            BoardStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Trigger {
    Timer,
    Manual,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RefreshOutcome {
    Updated,
    Failed(String),
    /// Another refresh was already in flight.
    Skipped,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<InFlightGuard<'a>> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(flag))
    }
}

impl<'a> Drop for InFlightGuard<'a> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Inner {
    source: SnapshotSourceRef,
    in_flight: AtomicBool,
    state: Mutex<BoardState>,
    tx: watch::Sender<BoardState>,
    rx: watch::Receiver<BoardState>,
}

#[derive(Clone)]
pub struct RefreshController {
    inner: Arc<Inner>,
}

impl RefreshController {
    pub fn new(source: SnapshotSourceRef, initial: BoardState) -> RefreshController {
        let (tx, rx) = watch::channel(initial.clone());
        RefreshController {
            inner: Arc::new(Inner {
                source,
                in_flight: AtomicBool::new(false),
                state: Mutex::new(initial),
                tx,
                rx,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.inner.rx.clone()
    }

    #[cfg(test)]
    pub async fn current(&self) -> BoardState {
        self.inner.state.lock().await.clone()
    }

    pub async fn refresh(&self, trigger: Trigger) -> RefreshOutcome {
        let _guard = match InFlightGuard::acquire(&self.inner.in_flight) {
            Some(guard) => guard,
            None => {
                debug!("Skipping {:?} refresh; another one is in flight", trigger);
                return RefreshOutcome::Skipped;
            }
        };

        self.publish(|state| state.status = BoardStatus::Refreshing).await;

        match self.inner.source.fetch_snapshot().await {
            Ok(coins) => {
                info!("{:?} refresh got {} coins", trigger, coins.len());
                let coins = Arc::new(coins);
                self.publish(move |state| {
                    state.coins = coins;
                    state.last_updated = Utc::now();
                    state.status = BoardStatus::Idle;
                }).await;
                RefreshOutcome::Updated
            }
            Err(e) => {
                warn!("{:?} refresh failed: {}", trigger, e);
                let message = e.user_message();
                let banner = message.clone();
                self.publish(move |state| state.status = BoardStatus::Error(banner)).await;
                RefreshOutcome::Failed(message)
            }
        }
    }

    /// Applies `update` and broadcasts the resulting state as one value.
    async fn publish<F>(&self, update: F)
    where
        F: FnOnce(&mut BoardState),
    {
        let mut state = self.inner.state.lock().await;
        update(&mut state);
        if self.inner.tx.broadcast(state.clone()).is_err() {
            trace!("No board observers left");
        }
    }
}

/// Drives timer refreshes until shut down or dropped.
pub struct RefreshLoop {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RefreshLoop {
    /// Ticks every `period`, starting one period from now since the board is
    /// already seeded.
    pub fn spawn(controller: RefreshController, period: Duration) -> RefreshLoop {
        let ticks = time::interval_at(Instant::now() + period, period).map(|_| ());
        RefreshLoop::spawn_with_ticks(controller, ticks)
    }

    pub fn spawn_with_ticks<S>(controller: RefreshController, ticks: S) -> RefreshLoop
    where
        S: Stream<Item = ()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(controller, ticks, shutdown_rx));

        RefreshLoop {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Stops the timer and waits for the loop to exit. A refresh already in
    /// flight is allowed to finish first.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Refresh loop ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
    }
}

async fn run<S>(controller: RefreshController, ticks: S, mut shutdown: oneshot::Receiver<()>)
where
    S: Stream<Item = ()> + Send + 'static,
{
    let mut ticks = Box::pin(ticks);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                break;
            }
            tick = ticks.next() => {
                match tick {
                    Some(()) => { controller.refresh(Trigger::Timer).await; }
                    None => break,
                }
            }
        }
    }
    debug!("Refresh loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::str::FromStr;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use bigdecimal::BigDecimal;
    use futures::channel::mpsc;

    use cryptorank_domain::DisplayCoin;
    use crate::source::{RefreshError, SnapshotSource};

    pub fn coin(rank: u32, symbol: &str, price: &str) -> DisplayCoin {
        DisplayCoin {
            rank,
            name: format!("{} coin", symbol),
            symbol: symbol.to_owned(),
            price: BigDecimal::from_str(price).unwrap(),
            change_24h: BigDecimal::from(0),
            market_cap: BigDecimal::from(1_000_000),
            volume: BigDecimal::from(1_000),
            logo: String::new(),
        }
    }

    fn five_coins() -> Snapshot {
        vec![
            coin(1, "BTC", "45000.5"),
            coin(2, "ETH", "3200"),
            coin(3, "USDT", "1"),
            coin(4, "BNB", "410.2"),
            coin(5, "SOL", "98.7"),
        ]
    }

    /// Replays scripted results, then keeps failing.
    struct ScriptedSource {
        calls: AtomicUsize,
        script: Mutex<VecDeque<Result<Snapshot, RefreshError>>>,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Snapshot, RefreshError>>) -> Arc<ScriptedSource> {
            Arc::new(ScriptedSource {
                calls: AtomicUsize::new(0),
                script: Mutex::new(script.into_iter().collect()),
                gate: Mutex::new(None),
            })
        }

        /// The next fetch blocks until the returned sender fires.
        async fn hold_next(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.gate.lock().await = Some(rx);
            tx
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn fetch_snapshot(&self) -> Result<Snapshot, RefreshError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let gate = self.gate.lock().await.take();
            if let Some(gate) = gate {
                gate.await.ok();
            }

            self.script.lock().await
                .pop_front()
                .unwrap_or_else(|| Err(server_error(503, "Failed to fetch cryptocurrency data")))
        }
    }

    fn server_error(status: u16, message: &str) -> RefreshError {
        RefreshError::Server { status, message: message.to_owned() }
    }

    async fn wait_for<F>(rx: &mut watch::Receiver<BoardState>, predicate: F) -> BoardState
    where
        F: Fn(&BoardState) -> bool,
    {
        let wait = async {
            loop {
                let state = rx.recv().await.expect("board state channel closed");
                if predicate(&state) {
                    return state;
                }
            }
        };

        time::timeout(Duration::from_secs(5), wait).await
            .expect("timed out waiting for board state")
    }

    #[tokio::test]
    async fn successful_poll_replaces_the_whole_snapshot() {
        let mut next = five_coins();
        next[2].price = BigDecimal::from_str("1.0012").unwrap();
        next[0].price = BigDecimal::from_str("45100").unwrap();

        let source = ScriptedSource::new(vec![Ok(next.clone())]);
        let seeded = BoardState::seeded(five_coins());
        let seeded_at = seeded.last_updated;
        let controller = RefreshController::new(source.clone(), seeded);

        assert_eq!(controller.refresh(Trigger::Timer).await, RefreshOutcome::Updated);

        let state = controller.current().await;
        assert_eq!(state.status, BoardStatus::Idle);
        assert_eq!(*state.coins, next);
        assert_eq!(state.coins[2].price, BigDecimal::from_str("1.0012").unwrap());
        assert_eq!(state.coins[0].price, BigDecimal::from(45100));
        assert!(state.last_updated >= seeded_at);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn failed_poll_keeps_the_table_and_reports_the_message() {
        let source = ScriptedSource::new(vec![
            Err(server_error(429, "Rate limit exceeded. Please try again later.")),
        ]);
        let seeded = BoardState::seeded(five_coins());
        let seeded_coins = seeded.coins.clone();
        let seeded_at = seeded.last_updated;
        let controller = RefreshController::new(source, seeded);

        let outcome = controller.refresh(Trigger::Timer).await;
        assert_eq!(outcome, RefreshOutcome::Failed("Rate limit exceeded. Please try again later.".into()));

        let state = controller.current().await;
        assert_eq!(state.error(), Some("Rate limit exceeded. Please try again later."));
        assert!(Arc::ptr_eq(&state.coins, &seeded_coins));
        assert_eq!(state.last_updated, seeded_at);
    }

    #[tokio::test]
    async fn manual_retry_recovers_from_error() {
        let source = ScriptedSource::new(vec![
            Err(server_error(500, "Failed to fetch cryptocurrency data")),
            Ok(five_coins()),
        ]);
        let controller = RefreshController::new(source, BoardState::seeded(vec![]));

        controller.refresh(Trigger::Timer).await;
        assert!(controller.current().await.error().is_some());

        assert_eq!(controller.refresh(Trigger::Manual).await, RefreshOutcome::Updated);
        let state = controller.current().await;
        assert_eq!(state.status, BoardStatus::Idle);
        assert_eq!(state.coins.len(), 5);
    }

    #[tokio::test]
    async fn refreshing_clears_the_previous_error() {
        let source = ScriptedSource::new(vec![
            Err(server_error(500, "Failed to fetch cryptocurrency data")),
            Ok(five_coins()),
        ]);
        let controller = RefreshController::new(source.clone(), BoardState::seeded(vec![]));
        controller.refresh(Trigger::Timer).await;

        let mut states = controller.subscribe();
        let release = source.hold_next().await;

        let c = controller.clone();
        let pending = tokio::spawn(async move { c.refresh(Trigger::Manual).await });

        let state = wait_for(&mut states, |s| s.is_refreshing()).await;
        assert_eq!(state.error(), None);

        release.send(()).ok();
        assert_eq!(pending.await.unwrap(), RefreshOutcome::Updated);
    }

    #[tokio::test]
    async fn overlapping_trigger_is_skipped() {
        let source = ScriptedSource::new(vec![Ok(five_coins()), Ok(five_coins())]);
        let controller = RefreshController::new(source.clone(), BoardState::seeded(vec![]));
        let mut states = controller.subscribe();
        let release = source.hold_next().await;

        let c = controller.clone();
        let timer = tokio::spawn(async move { c.refresh(Trigger::Timer).await });
        wait_for(&mut states, |s| s.is_refreshing()).await;

        assert_eq!(controller.refresh(Trigger::Manual).await, RefreshOutcome::Skipped);

        release.send(()).ok();
        assert_eq!(timer.await.unwrap(), RefreshOutcome::Updated);
        assert_eq!(source.calls(), 1);

        // guard is released once the first refresh completes
        assert_eq!(controller.refresh(Trigger::Manual).await, RefreshOutcome::Updated);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn ticks_drive_refreshes_until_shutdown() {
        let source = ScriptedSource::new(vec![Ok(five_coins())]);
        let controller = RefreshController::new(source.clone(), BoardState::seeded(vec![]));
        let mut states = controller.subscribe();

        let (ticks, tick_rx) = mpsc::unbounded();
        let refresh_loop = RefreshLoop::spawn_with_ticks(controller.clone(), tick_rx);

        ticks.unbounded_send(()).unwrap();
        wait_for(&mut states, |s| s.status == BoardStatus::Idle && s.coins.len() == 5).await;
        assert_eq!(source.calls(), 1);

        refresh_loop.shutdown().await;

        ticks.unbounded_send(()).ok();
        tokio::task::yield_now().await;
        assert_eq!(source.calls(), 1);
        assert!(ticks.is_closed());
    }

    #[tokio::test]
    async fn dropping_the_loop_cancels_the_timer() {
        let source = ScriptedSource::new(vec![]);
        let controller = RefreshController::new(source.clone(), BoardState::seeded(five_coins()));

        let (ticks, tick_rx) = mpsc::unbounded::<()>();
        drop(RefreshLoop::spawn_with_ticks(controller, tick_rx));

        let closed = async {
            while !ticks.is_closed() {
                tokio::task::yield_now().await;
            }
        };
        time::timeout(Duration::from_secs(5), closed).await
            .expect("refresh loop kept running after drop");

        assert_eq!(source.calls(), 0);
    }
}
