//! Load generator: many logical clients posting messages in a loop.
//!
//! Each client posts to one target, chosen by its index modulo the number
//! of targets, sleeps, and repeats until its first failure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use reqwest::{Client, StatusCode};

use crate::state::Message;

#[derive(Parser, Debug, Clone)]
#[command(name = "loadgen", about = "Post messages to the message service in a loop")]
pub struct LoadgenConfig {
    /// Base URLs of the service instances, comma separated.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "http://localhost:8080,http://localhost:8081"
    )]
    pub targets: Vec<String>,

    /// Path posted to on every target.
    #[arg(long, default_value = "/jsie")]
    pub path: String,

    /// Number of concurrent logical clients.
    #[arg(long, default_value_t = 200)]
    pub clients: usize,

    /// Pause between two requests of the same client.
    #[arg(long, default_value_t = 3000)]
    pub interval_ms: u64,

    /// Prefix of every posted value.
    #[arg(long, default_value = "Hello trendev")]
    pub message: String,
}

impl LoadgenConfig {
    /// Full URL client `index` posts to.
    pub fn target_for(&self, index: usize) -> String {
        let base = &self.targets[index % self.targets.len()];
        format!("{}{}", base.trim_end_matches('/'), self.path)
    }

    pub fn value_for(&self, index: usize) -> String {
        format!("{} - client#{:03}", self.message, index)
    }
}

/// Why a logical client stopped.
#[derive(Debug)]
pub enum ClientExit {
    Transport(reqwest::Error),
    Status(StatusCode),
}

impl std::fmt::Display for ClientExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientExit::Transport(e) => write!(f, "transport error: {}", e),
            ClientExit::Status(s) => write!(f, "unexpected status {}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub clients: usize,
    pub terminated: usize,
    pub requests: usize,
}

/// Run one logical client until its first failed request.
///
/// Returns the number of successful requests alongside the failure.
pub async fn run_client(
    client: &Client,
    index: usize,
    url: &str,
    value: &str,
    interval: Duration,
    requests: &AtomicUsize,
) -> (usize, ClientExit) {
    tracing::info!("client#{:03} started", index);
    let mut sent = 0usize;

    loop {
        let body = Message::new(value);
        let exit = match client.post(url).json(&body).send().await {
            Err(e) => Some(ClientExit::Transport(e)),
            Ok(resp) if resp.status() != StatusCode::OK => Some(ClientExit::Status(resp.status())),
            Ok(_) => None,
        };
        requests.fetch_add(1, Ordering::Relaxed);

        if let Some(exit) = exit {
            tracing::warn!("request of client#{:03} failed ({}), client#{:03} is dead", index, exit, index);
            return (sent, exit);
        }

        sent += 1;
        tokio::time::sleep(interval).await;
    }
}

/// Spawn every logical client and wait for all of them to terminate.
pub async fn run(config: LoadgenConfig) -> LoadReport {
    let client = Client::new();
    let terminated = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(AtomicUsize::new(0));
    let interval = Duration::from_millis(config.interval_ms);

    if config.targets.is_empty() {
        tracing::error!("no targets configured");
        return LoadReport {
            clients: 0,
            terminated: 0,
            requests: 0,
        };
    }

    let mut handles = Vec::with_capacity(config.clients);
    for index in 0..config.clients {
        let client = client.clone();
        let terminated = Arc::clone(&terminated);
        let requests = Arc::clone(&requests);
        let url = config.target_for(index);
        let value = config.value_for(index);

        handles.push(tokio::spawn(async move {
            run_client(&client, index, &url, &value, interval, &requests).await;
            terminated.fetch_add(1, Ordering::Relaxed);
        }));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("client task panicked: {}", e);
        }
    }

    LoadReport {
        clients: config.clients,
        terminated: terminated.load(Ordering::Relaxed),
        requests: requests.load(Ordering::Relaxed),
    }
}
