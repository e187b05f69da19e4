//! Bounded, newest-first log of completed turns.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of turns kept.
pub const DEFAULT_CAPACITY: usize = 20;

/// One completed interaction. Never mutated after recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentLogEntry {
    pub timestamp: DateTime<Utc>,
    pub prompt: String,
    pub response: String,
    pub success: bool,
    pub route: Option<String>,
    /// Intent tag or command kind that handled the turn, if any.
    pub intent: Option<String>,
}

impl IntentLogEntry {
    pub fn new(prompt: &str, response: &str, success: bool, route: Option<&str>) -> Self {
        Self {
            timestamp: Utc::now(),
            prompt: prompt.to_string(),
            response: response.to_string(),
            success,
            route: route.filter(|r| !r.is_empty()).map(str::to_string),
            intent: None,
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct SessionMemory {
    entries: VecDeque<IntentLogEntry>,
    capacity: usize,
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SessionMemory {
    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a turn, evicting the oldest entry when full.
    pub fn record(
        &mut self,
        prompt: &str,
        response: &str,
        success: bool,
        route: Option<&str>,
    ) -> &IntentLogEntry {
        self.record_entry(IntentLogEntry::new(prompt, response, success, route))
    }

    pub fn record_entry(&mut self, entry: IntentLogEntry) -> &IntentLogEntry {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    pub fn most_recent(&self) -> Option<&IntentLogEntry> {
        self.entries.front()
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&IntentLogEntry> {
        self.entries.iter().take(n).collect()
    }

    /// Route of the newest entry that has one, walking back past turns without a route.
    pub fn most_recent_route(&self) -> Option<&str> {
        self.entries
            .iter()
            .find_map(|e| e.route.as_deref().filter(|r| !r.is_empty()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntentLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
