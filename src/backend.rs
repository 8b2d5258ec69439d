//! Periodic health probe against the analytics backend. The backend is an
//! opaque collaborator: nothing but the health endpoint is ever called, and
//! the rest of the app only sees coarse state transitions.

use crate::event::AppEvent;
use std::sync::mpsc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time;

pub const PROBE_INTERVAL: Duration = Duration::from_secs(15);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Probing,
    Online,
    Offline,
}

/// Owns the probe task; dropping the monitor aborts it so no status events
/// fire after the app shell is gone.
pub struct BackendMonitor {
    probe: JoinHandle<()>,
}

impl BackendMonitor {
    pub fn start(runtime: &Handle, base_url: String, tx: mpsc::Sender<AppEvent>) -> Self {
        let probe = runtime.spawn(async move {
            let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
                Ok(client) => client,
                Err(err) => {
                    log::warn!("health probe disabled, client failed to build: {err}");
                    let _ = tx.send(AppEvent::BackendStatus(BackendState::Offline));
                    return;
                }
            };

            let url = format!("{}/api/health", base_url.trim_end_matches('/'));
            let mut ticker = time::interval(PROBE_INTERVAL);
            let mut last: Option<BackendState> = None;

            loop {
                ticker.tick().await;
                let state = match client.get(&url).send().await {
                    Ok(response) if response.status().is_success() => BackendState::Online,
                    Ok(response) => {
                        log::debug!("health probe got {} from {url}", response.status());
                        BackendState::Offline
                    }
                    Err(err) => {
                        log::debug!("health probe failed: {err}");
                        BackendState::Offline
                    }
                };

                if last != Some(state) {
                    last = Some(state);
                    let _ = tx.send(AppEvent::BackendStatus(state));
                }
            }
        });

        Self { probe }
    }
}

impl Drop for BackendMonitor {
    fn drop(&mut self) {
        self.probe.abort();
    }
}
