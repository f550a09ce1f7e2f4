//! Conversation store implementations.

pub mod memory;

pub use memory::MemoryConversationStore;
