//! Publisher implementations
//!
//! Provides in-memory and channel-backed implementations of the
//! [`Publisher`](crate::traits::Publisher) trait.

pub mod channel;
pub mod memory;

pub use channel::ChannelPublisher;
pub use memory::MemoryPublisher;
