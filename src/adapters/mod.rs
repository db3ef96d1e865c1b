// Adapters layer: concrete row stores for the hosted backend and for local use.

pub mod memory;
pub mod rest;

pub use memory::InMemoryRowStore;
pub use rest::RestRowStore;
