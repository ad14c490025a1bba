use crate::core::gateway::DEFAULT_LOGIN_PAGE;
use crate::core::pagination::DEFAULT_PAGE_SIZE;
use crate::core::ConfigProvider;
use crate::utils::error::{ErpError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
const MAX_PAGE_SIZE: u64 = 10_000;

/// File-backed client configuration.
///
/// ```toml
/// [api]
/// base_url = "${ERP_API_URL}"
/// auto_refresh = true
/// page_size = 50
///
/// [session]
/// token_file = "/home/me/.tour-erp/tokens.json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErpConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_login_page")]
    pub login_page: String,
    #[serde(default)]
    pub auto_refresh: bool,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_page: default_login_page(),
            auto_refresh: false,
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_login_page() -> String {
    DEFAULT_LOGIN_PAGE.to_string()
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_token_file() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.tour-erp/tokens.json", home.trim_end_matches('/'))
}

impl ErpConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ErpError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| ErpError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ErpError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Command-line values win over the file.
    pub fn apply_overrides(
        &mut self,
        base_url: Option<&str>,
        token_file: Option<&str>,
        auto_refresh: Option<bool>,
    ) {
        if let Some(base_url) = base_url {
            self.api.base_url = base_url.to_string();
        }
        if let Some(token_file) = token_file {
            self.session.token_file = token_file.to_string();
        }
        if let Some(auto_refresh) = auto_refresh {
            self.api.auto_refresh = auto_refresh;
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("api.base_url", &self.api.base_url)?;
        crate::utils::validation::validate_path("session.token_file", &self.session.token_file)?;
        crate::utils::validation::validate_non_empty_string("api.login_page", &self.api.login_page)?;

        if self.api.page_size == 0 || self.api.page_size > MAX_PAGE_SIZE {
            return Err(ErpError::InvalidConfigValueError {
                field: "api.page_size".to_string(),
                value: self.api.page_size.to_string(),
                reason: format!("Must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for ErpConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn login_page(&self) -> &str {
        &self.api.login_page
    }

    fn token_file(&self) -> &str {
        &self.session.token_file
    }

    fn auto_refresh(&self) -> bool {
        self.api.auto_refresh
    }

    fn page_size(&self) -> u64 {
        self.api.page_size
    }
}

impl Validate for ErpConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
