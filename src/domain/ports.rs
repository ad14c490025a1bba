use crate::utils::error::Result;
use async_trait::async_trait;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Persistent key/value storage for session credentials.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// The user-facing side of the gateway: where alerts are shown and where
/// a forced logout sends the user.
pub trait Surface: Send + Sync {
    fn alert(&self, message: &str);
    fn navigate(&self, location: &str);
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn login_page(&self) -> &str;
    fn token_file(&self) -> &str;
    fn auto_refresh(&self) -> bool;
    fn page_size(&self) -> u64;
}
