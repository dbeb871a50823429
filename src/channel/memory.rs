//! Bounded in-memory channel.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::channel::{Channel, ChannelError};
use crate::event::Event;

/// A bounded FIFO of events.
///
/// Capacity is counted in events. A batch that does not fit in the free
/// space is rejected with [`ChannelError::Full`] and nothing is enqueued.
///
/// After a panic while the queue was locked, submits fail with
/// [`ChannelError::Other`]; sinks can still read and drain what is queued.
#[derive(Debug)]
pub struct MemoryChannel {
    queue: Mutex<VecDeque<Event>>,
    capacity: usize,
}

impl MemoryChannel {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events currently buffered.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove up to `max` events from the head of the queue.
    pub fn take(&self, max: usize) -> Vec<Event> {
        let mut queue = self.read();
        let n = max.min(queue.len());
        queue.drain(..n).collect()
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<Event>>, ChannelError> {
        self.queue
            .lock()
            .map_err(|_| ChannelError::Other("memory channel lock poisoned".to_string()))
    }

    /// Lock for sinks; a poisoned queue is still readable.
    fn read(&self) -> MutexGuard<'_, VecDeque<Event>> {
        self.queue.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Memory channel lock poisoned; recovering queued events");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl Channel for MemoryChannel {
    fn submit_batch(&self, events: Vec<Event>) -> Result<(), ChannelError> {
        let mut queue = self.lock()?;
        let free = self.capacity.saturating_sub(queue.len());
        if events.len() > free {
            return Err(ChannelError::Full(format!(
                "Cannot put {} events, {} of {} slots free.",
                events.len(),
                free,
                self.capacity
            )));
        }
        queue.extend(events);
        Ok(())
    }
}
