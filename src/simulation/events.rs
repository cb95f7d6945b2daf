//! Bounded history of what happened at the intersection

use std::collections::VecDeque;

use super::config::EVENT_LOG_CAPACITY;
use super::types::SimTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficEvent {
    pub at: SimTime,
    pub message: String,
}

/// Newest-first event history; the oldest entries fall off once full
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<TrafficEvent>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, at: SimTime, message: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(TrafficEvent {
            at,
            message: message.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrafficEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest-first copy of the whole log
    pub fn to_vec(&self) -> Vec<TrafficEvent> {
        self.entries.iter().cloned().collect()
    }
}
