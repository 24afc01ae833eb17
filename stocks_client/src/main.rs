//! Stocks Dashboard — a terminal watchlist that tracks tickers and polls quotes from the
//! stocks server. Guest watchlists live in a local storage file; with `--user` (or
//! `login` at the prompt) the watchlist is loaded from and saved to the server.
//!
//! Usage example (CLI):
//! ```bash
//! stocks_client --server 127.0.0.1:8080 --user alice --poll-interval-ms 60000
//! ```
mod args;

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{Sender, select, unbounded};
use log::{error, info};
use stocks_client::api::ServerClient;
use stocks_client::intent::{Intent, USAGE};
use stocks_client::model::auth::AuthStatus;
use stocks_client::persistence::Hydrated;
use stocks_client::persistence::local::LocalStorage;
use stocks_client::persistence::remote::RetryPolicy;
use stocks_client::persistence::selector::PersistenceSelector;
use stocks_client::poller::{PollEvent, QuotePollers};
use stocks_client::render::render;
use stocks_client::{Dashboard, DashboardEvent};
use stocks_common::net::{self, SERVICE_PORT};
use stocks_common::{Result, StocksError};

use crate::args::Args;

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let server = args
        .server
        .clone()
        .unwrap_or_else(|| net::addr("127.0.0.1", SERVICE_PORT));
    let client = Arc::new(ServerClient::new(&server, Duration::from_millis(args.timeout_ms)));
    let (hydrated_tx, hydrated_rx) = unbounded::<Hydrated>();
    let selector = PersistenceSelector::new(
        LocalStorage::new(&args.storage),
        client.clone(),
        RetryPolicy::default(),
        hydrated_tx,
    );

    let (poll_tx, poll_rx) = unbounded::<PollEvent>();
    let pollers = QuotePollers::new(client, Duration::from_millis(args.poll_interval_ms), poll_tx);
    let mut dashboard = Dashboard::new(selector, pollers);

    let (intent_tx, intent_rx) = unbounded::<Intent>();
    {
        let intent_tx = intent_tx.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down dashboard...");
            let _ = intent_tx.send(Intent::Quit);
        })
        .map_err(|e| StocksError::Format(format!("Error setting Ctrl+C handler: {}", e)))?;
    }
    start_prompt_thread(intent_tx);

    let initial = match args.user {
        Some(user) => AuthStatus::Authenticated { user },
        None => AuthStatus::Unauthenticated,
    };
    dashboard.apply(DashboardEvent::Auth(initial));
    print!("{}", render(&dashboard));
    println!("{}", USAGE);

    loop {
        // `None` ends the session.
        let step = select! {
            recv(intent_rx) -> msg => match msg {
                Ok(Intent::Quit) | Err(_) => None,
                Ok(Intent::Help) => {
                    println!("{}", USAGE);
                    Some(false)
                }
                Ok(Intent::Show) => Some(true),
                Ok(Intent::Add(input)) => Some(dashboard.apply(DashboardEvent::Add(input))),
                Ok(Intent::Remove(input)) => Some(dashboard.apply(DashboardEvent::Remove(input))),
                Ok(Intent::SignIn(user)) => {
                    let status = AuthStatus::Authenticated { user };
                    Some(dashboard.apply(DashboardEvent::Auth(status)))
                }
                Ok(Intent::SignOut) => {
                    Some(dashboard.apply(DashboardEvent::Auth(AuthStatus::Unauthenticated)))
                }
            },
            recv(hydrated_rx) -> msg => match msg {
                Ok(event) => Some(dashboard.apply(DashboardEvent::Hydrated(event))),
                Err(e) => {
                    error!("Hydration channel closed: {}", e);
                    None
                }
            },
            recv(poll_rx) -> msg => match msg {
                Ok(event) => Some(dashboard.apply(DashboardEvent::Poll(event))),
                Err(e) => {
                    error!("Poll channel closed: {}", e);
                    None
                }
            },
        };
        let Some(changed) = step else {
            break;
        };
        if changed {
            print!("{}", render(&dashboard));
        }
    }

    dashboard.shutdown();
    info!("Dashboard stopped");
    Ok(())
}

/// Reads prompt lines on a background thread and forwards parsed intents.
fn start_prompt_thread(intent_tx: Sender<Intent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to read prompt: {}", e);
                    break;
                }
            };
            if let Some(intent) = Intent::parse(&line) {
                if intent_tx.send(intent).is_err() {
                    return;
                }
            }
        }
        let _ = intent_tx.send(Intent::Quit);
    });
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
