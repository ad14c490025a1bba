pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ConsoleSurface, FileTokenStore, MemorySurface, MemoryTokenStore};
pub use config::ErpConfig;
pub use crate::core::{gateway::ApiGateway, session::Session};
pub use utils::error::{ErpError, Result};
