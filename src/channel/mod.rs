//! Downstream event channel.
//!
//! # Responsibilities
//! - Define the submit contract the request pipeline relies on
//! - Distinguish backpressure ([`ChannelError::Full`]) from other faults
//!
//! # Design Decisions
//! - `submit_batch` is synchronous and all-or-nothing: a batch is either
//!   fully accepted or not at all
//! - Implementations may block; the pipeline calls them from the blocking
//!   pool
//! - Ownership of the events moves into the channel on submit

pub mod memory;

use crate::event::Event;

pub use memory::MemoryChannel;

/// Error returned by [`Channel::submit_batch`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The channel cannot take the batch right now.
    #[error("{0}")]
    Full(String),
    /// Any other channel failure.
    #[error("{0}")]
    Other(String),
}

/// Buffering component between the source and its sinks.
pub trait Channel: Send + Sync {
    /// Append the whole batch, or nothing.
    fn submit_batch(&self, events: Vec<Event>) -> Result<(), ChannelError>;
}
