use crate::core::gateway::ApiGateway;
use crate::core::{Surface, TokenStore};
use crate::domain::model::{Credentials, TokenPair, User};
use crate::domain::ports::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::utils::error::{ErpError, Result};
use crate::utils::validation::validate_non_empty_string;
use serde::Serialize;

const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password.";
const REGISTER_FAILED_MESSAGE: &str = "Account registration failed.";

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Explicit session handed to every page controller: owns the gateway and,
/// through it, the stored credentials.
pub struct Session<S: TokenStore, U: Surface> {
    gateway: ApiGateway<S, U>,
}

impl<S: TokenStore, U: Surface> Session<S, U> {
    pub fn new(gateway: ApiGateway<S, U>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &ApiGateway<S, U> {
        &self.gateway
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self
            .gateway
            .store()
            .get(ACCESS_TOKEN_KEY)
            .await?
            .is_some_and(|token| !token.is_empty()))
    }

    /// Page-load guard: sends the user to the login page when no token is stored.
    pub async fn require_login(&self) -> Result<()> {
        if self.is_authenticated().await? {
            return Ok(());
        }
        tracing::info!("🔒 No access token stored");
        self.gateway.surface().navigate(self.gateway.login_page());
        Err(ErpError::Unauthorized)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        validate_non_empty_string("username", username)?;
        validate_non_empty_string("password", password)?;

        let reply = self
            .gateway
            .post_anonymous("token/", &Credentials { username, password })
            .await?;

        if !reply.is_success() {
            let message = reply
                .body
                .get("detail")
                .and_then(|d| d.as_str())
                .unwrap_or(LOGIN_FAILED_MESSAGE)
                .to_string();
            tracing::warn!("❌ Login failed for '{}': {}", username, message);
            self.gateway.surface().alert(&message);
            return Err(ErpError::HttpError {
                status: reply.status,
                message,
            });
        }

        let tokens: TokenPair = serde_json::from_value(reply.body)?;
        let store = self.gateway.store();
        store.set(ACCESS_TOKEN_KEY, &tokens.access).await?;
        match &tokens.refresh {
            Some(refresh) => store.set(REFRESH_TOKEN_KEY, refresh).await?,
            None => store.remove(REFRESH_TOKEN_KEY).await?,
        }

        tracing::info!("🔑 Logged in as '{}'", username);
        self.user_info().await
    }

    pub async fn logout(&self) {
        tracing::info!("👋 Logging out");
        self.gateway.clear_session().await;
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<User> {
        validate_non_empty_string("username", username)?;
        if password != password_confirm {
            return Err(ErpError::ValidationError {
                message: "Passwords do not match.".to_string(),
            });
        }

        let reply = self
            .gateway
            .post_anonymous("register/", &RegisterRequest { username, password })
            .await?;

        if !reply.is_success() {
            let message = field_errors(&reply.body)
                .unwrap_or_else(|| REGISTER_FAILED_MESSAGE.to_string());
            self.gateway.surface().alert(&message);
            return Err(ErpError::HttpError {
                status: reply.status,
                message,
            });
        }

        tracing::info!("🆕 Registered account '{}'", username);
        Ok(serde_json::from_value(reply.body)?)
    }

    pub async fn refresh(&self) -> Result<()> {
        self.gateway.refresh_tokens().await.map(|_| ())
    }

    pub async fn user_info(&self) -> Result<User> {
        self.gateway.get("user-info/").await
    }
}

/// Flattens a validation body such as `{"username": ["already exists"]}`
/// into `username: already exists` lines.
pub fn field_errors(body: &serde_json::Value) -> Option<String> {
    match body {
        serde_json::Value::Object(fields) if !fields.is_empty() => {
            let lines: Vec<String> = fields
                .iter()
                .map(|(field, messages)| {
                    let joined = match messages {
                        serde_json::Value::Array(items) => items
                            .iter()
                            .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                            .collect::<Vec<_>>()
                            .join(", "),
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    format!("{}: {}", field, joined)
                })
                .collect();
            Some(lines.join("\n"))
        }
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_errors_flattens_lists() {
        let body = json!({
            "password": ["too short", "too common"],
            "username": ["A user with that username already exists."]
        });
        assert_eq!(
            field_errors(&body).unwrap(),
            "password: too short, too common\nusername: A user with that username already exists."
        );
    }

    #[test]
    fn test_field_errors_empty_body() {
        assert!(field_errors(&json!({})).is_none());
        assert!(field_errors(&serde_json::Value::Null).is_none());
        assert_eq!(field_errors(&json!("oops")).unwrap(), "oops");
    }
}
