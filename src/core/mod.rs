pub mod endpoint;
pub mod gateway;
pub mod pagination;
pub mod session;

pub use crate::domain::model::Page;
pub use crate::domain::ports::{ConfigProvider, Surface, TokenStore};
pub use crate::utils::error::Result;
