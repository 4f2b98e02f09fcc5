//! Subscription table and channel reference counting.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use crate::types::EventCallback;

struct Entry {
    channels: Vec<String>,
    callback: EventCallback,
}

/// All live subscriptions of one connection, plus the union of their
/// channels. Handles are monotonically increasing, so iterating the
/// table visits subscriptions in insertion order.
pub(crate) struct SubscriptionSet {
    channels: BTreeSet<String>,
    entries: BTreeMap<u64, Entry>,
    next_handle: u64,
}

impl SubscriptionSet {
    pub(crate) fn new() -> Self {
        Self {
            channels: BTreeSet::new(),
            entries: BTreeMap::new(),
            next_handle: 0,
        }
    }

    /// Register a subscription. Already-present channels are unaffected.
    pub(crate) fn add(&mut self, channels: Vec<String>, callback: EventCallback) -> u64 {
        for channel in &channels {
            self.channels.insert(channel.clone());
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        self.entries.insert(handle, Entry { channels, callback });
        handle
    }

    /// Remove a subscription and drop every channel of it that no
    /// remaining subscription references. Unknown handles are a no-op.
    pub(crate) fn remove(&mut self, handle: u64) -> bool {
        let Some(entry) = self.entries.remove(&handle) else {
            return false;
        };
        self.clean_up(&entry.channels);
        true
    }

    fn clean_up(&mut self, channels: &[String]) {
        for channel in channels {
            if !self.channels.contains(channel) {
                continue;
            }
            let referenced = self
                .entries
                .values()
                .any(|e| e.channels.iter().any(|c| c == channel));
            if !referenced {
                self.channels.remove(channel);
            }
        }
    }

    /// Socket URL for the current channel set, or `None` when no
    /// subscription exists (no socket is opened for zero channels).
    /// The channel set is ordered, so the URL depends only on the
    /// set's contents, never on subscription order.
    pub(crate) fn socket_url(&self, endpoint: &str, project: &str) -> Option<String> {
        if self.channels.is_empty() {
            return None;
        }
        let mut url = format!("{endpoint}?project={project}");
        for channel in &self.channels {
            url.push_str("&channels[]=");
            url.push_str(channel);
        }
        Some(url)
    }

    /// Callbacks of subscriptions whose channels intersect the event's
    /// channels, in insertion order. Events disjoint from the whole
    /// channel set produce no callbacks at all.
    pub(crate) fn matching(&self, event_channels: &[String]) -> Vec<EventCallback> {
        if !event_channels.iter().any(|c| self.channels.contains(c)) {
            return Vec::new();
        }
        self.entries
            .values()
            .filter(|e| e.channels.iter().any(|c| event_channels.contains(c)))
            .map(|e| Arc::clone(&e.callback))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn channels(&self) -> &BTreeSet<String> {
        &self.channels
    }
}

/// Flat tiered reconnect delay. Unbounded retries, capped delay.
pub(crate) fn backoff_delay(attempts: u32) -> Duration {
    let secs = match attempts {
        0..=4 => 1,
        5..=14 => 5,
        15..=99 => 10,
        _ => 60,
    };
    Duration::from_secs(secs)
}
