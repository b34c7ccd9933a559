mod config;
mod initial;
mod input;
mod refresh;
mod render;
mod source;
mod tui;

#[macro_use]
extern crate log;

use std::error::Error;
use std::sync::Arc;

use crossterm::event::{Event, EventStream};
use dotenv::dotenv;
use futures::StreamExt;
use tokio::signal;

use cryptorank_util::init_logging;
use crate::config::BoardConfig;
use crate::initial::{load_initial, InitialLoadError};
use crate::input::Command;
use crate::refresh::{RefreshController, RefreshLoop, RefreshOutcome, Trigger};
use crate::source::{HttpSnapshotSource, SnapshotSourceRef};
use crate::tui::TerminalSession;

// stderr shares the terminal with the board; set RUST_LOG and redirect it to read logs
const DEFAULT_LOG_FILTERS: &'static str = "off";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let env_result = dotenv();
    init_logging(DEFAULT_LOG_FILTERS);

    if let Err(err) = env_result {
        warn!("Failed to load .env file: {}", err);
    }

    let config = BoardConfig::from_env();
    info!("Polling '{}' every {:?} (timeout = {:?})", config.base_url, config.interval, config.timeout);

    let http = HttpSnapshotSource::new(&config.base_url, config.timeout)?;
    let url = http.url().to_owned();
    let source: SnapshotSourceRef = Arc::new(http);

    let mut session = TerminalSession::enter()?;
    let mut events = EventStream::new();
    session.draw(render::draw_skeleton)?;

    let initial = match load_initial(source.as_ref(), &url).await {
        Ok(state) => state,
        Err(err) => {
            error!("Initial load failed! Cause: {}", err);
            let InitialLoadError::Unavailable { source: cause, .. } = &err;
            let message = cause.user_message();
            session.draw(|f| render::draw_unavailable(f, &message))?;
            wait_for_quit(&mut events).await;
            drop(session);
            return Err(err.into());
        }
    };

    let controller = RefreshController::new(source, initial);
    let mut states = controller.subscribe();
    let refresh_loop = RefreshLoop::spawn(controller.clone(), config.interval);

    let mut ctrl_c = Box::pin(signal::ctrl_c());
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Shutting down from Ctrl-C signal...");
                break;
            }
            state = states.recv() => {
                match state {
                    Some(state) => session.draw(|f| render::draw_board(f, &state, config.interval))?,
                    None => break,
                }
            }
            event = events.next() => {
                match event {
                    Some(Ok(Event::Key(key))) => match Command::from_key(&key) {
                        Some(Command::Retry) => {
                            let c = controller.clone();
                            tokio::spawn(async move {
                                if c.refresh(Trigger::Manual).await == RefreshOutcome::Skipped {
                                    info!("Retry ignored; a refresh is already running");
                                }
                            });
                        }
                        Some(Command::Quit) => break,
                        None => (),
                    },
                    Some(Ok(Event::Resize(..))) => {
                        let state = states.borrow().clone();
                        session.draw(|f| render::draw_board(f, &state, config.interval))?;
                    }
                    Some(Ok(_)) => (),
                    Some(Err(err)) => {
                        error!("Failed to read terminal events: {}", err);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    refresh_loop.shutdown().await;
    drop(session);

    info!("Quitting");
    Ok(())
}

async fn wait_for_quit(events: &mut EventStream) {
    while let Some(event) = events.next().await {
        match event {
            Ok(Event::Key(key)) if Command::from_key(&key) == Some(Command::Quit) => return,
            Ok(_) => (),
            Err(_) => return,
        }
    }
}
