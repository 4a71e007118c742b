//! Post repository adapters.

mod memory;

pub use memory::InMemoryPostRepository;
