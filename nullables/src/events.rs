//! Nullable event sink. Records every emitted event for later inspection.

use std::sync::{Arc, Mutex};

/// A shared, append-only log of events.
///
/// Hand [`NullEventLog::listener`] to an event bus, keep the log itself, and
/// read back what was emitted.
#[derive(Debug)]
pub struct NullEventLog<E> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E> Clone for NullEventLog<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<E> Default for NullEventLog<E> {
    fn default() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<E: Clone + Send + 'static> NullEventLog<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener closure that appends each event it sees to this log.
    pub fn listener(&self) -> Box<dyn Fn(&E) + Send + Sync> {
        let events = Arc::clone(&self.events);
        Box::new(move |event: &E| events.lock().unwrap().push(event.clone()))
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<E> {
        self.events.lock().unwrap().clone()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<E> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
