//! Per-host request spacing shared by every clone of a fetch client.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Hands out request slots per host, at least `min_interval` apart.
///
/// A caller reserves its slot under the lock and sleeps outside it, so
/// concurrent workers aimed at one host queue up instead of bursting.
#[derive(Debug)]
pub(crate) struct HostPacer {
    min_interval: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl HostPacer {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Wait until `host` may be contacted again.
    pub(crate) async fn wait(&self, host: &str) {
        if self.min_interval.is_zero() {
            return;
        }

        let slot = {
            let mut slots = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = slots
                .get(host)
                .copied()
                .filter(|reserved| *reserved > now)
                .unwrap_or(now);
            slots.insert(host.to_string(), slot + self.min_interval);
            slot
        };

        tokio::time::sleep_until(slot).await;
    }
}
