use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::types::{BindingId, Flag};

/// Events published by an endpoint for the surrounding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    // ── Lifecycle flags ────────────────────────────────────────
    FlagRaised {
        endpoint: String,
        flag: Flag,
        at: DateTime<Utc>,
    },
    FlagCleared {
        endpoint: String,
        flag: Flag,
        at: DateTime<Utc>,
    },

    // ── Keyed exchange ─────────────────────────────────────────
    RecordPublished {
        endpoint: String,
        binding: BindingId,
        key: String,
        /// `false` when the record was withdrawn (absent write).
        present: bool,
    },
    BindingMissing {
        endpoint: String,
        operation: String,
    },
}

impl Event {
    pub fn endpoint(&self) -> &str {
        match self {
            Event::FlagRaised { endpoint, .. }
            | Event::FlagCleared { endpoint, .. }
            | Event::RecordPublished { endpoint, .. }
            | Event::BindingMissing { endpoint, .. } => endpoint,
        }
    }
}

/// A broadcast-based event bus for lifecycle and exchange notifications.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<Event>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn publish(&self, event: Event) {
        // Ignore send errors (no subscribers).
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
