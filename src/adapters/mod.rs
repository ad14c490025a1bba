// Adapters layer: concrete implementations of the domain ports.

pub mod surface;
pub mod token_store;

pub use surface::{ConsoleSurface, MemorySurface};
pub use token_store::{FileTokenStore, MemoryTokenStore};
