//! Processing lifecycle events
//!
//! Hosts subscribe to these to follow a processing session without holding
//! on to the processor itself.

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

/// What happened during a processing session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingEvent {
    /// Processing began with this many optional tables enabled
    Started { processor: String, enabled_tables: usize },

    Progressed { processor: String, percent: u8 },

    /// A table was built and handed to the host
    TableBuilt {
        table_guid: Uuid,
        table_name: String,
        is_metadata_table: bool,
        row_count: usize,
    },

    /// Processing ended; `outcome` is `completed`, `cancelled` or `failed`
    Finished { processor: String, outcome: String },
}

type Subscriber = Box<dyn FnMut(&ProcessingEvent) + Send>;

/// Fans processing events out to every subscriber, in subscription order.
///
/// Clones share their subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: FnMut(&ProcessingEvent) + Send + 'static,
    {
        self.subscribers.lock().push(Box::new(subscriber));
    }

    /// Deliver `event`; returns how many subscribers saw it
    pub fn publish(&self, event: ProcessingEvent) -> usize {
        let mut subscribers = self.subscribers.lock();
        for subscriber in subscribers.iter_mut() {
            subscriber(&event);
        }
        subscribers.len()
    }
}
