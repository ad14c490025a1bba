use crate::core::endpoint::build_url;
use crate::core::{ConfigProvider, Surface, TokenStore};
use crate::domain::model::{RefreshRequest, TokenPair};
use crate::domain::ports::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::utils::error::{ErpError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const DEFAULT_LOGIN_PAGE: &str = "index.html";
const TOKEN_REFRESH_PATH: &str = "token/refresh/";

#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    /// Already-serialized JSON text, sent as is.
    Text(String),
    /// Multipart form upload; the only body sent without a JSON content type.
    Form(reqwest::multipart::Form),
}

impl RequestBody {
    fn is_form(&self) -> bool {
        matches!(self, RequestBody::Form(_))
    }

    fn try_clone(&self) -> Option<Self> {
        match self {
            RequestBody::Empty => Some(RequestBody::Empty),
            RequestBody::Json(value) => Some(RequestBody::Json(value.clone())),
            RequestBody::Text(text) => Some(RequestBody::Text(text.clone())),
            RequestBody::Form(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: RequestBody::Empty,
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn json<B: Serialize + ?Sized>(method: Method, body: &B) -> Result<Self> {
        Ok(Self {
            method,
            body: RequestBody::Json(serde_json::to_value(body)?),
            headers: Vec::new(),
        })
    }

    pub fn form(method: Method, form: reqwest::multipart::Form) -> Self {
        Self {
            method,
            body: RequestBody::Form(form),
            headers: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn try_clone(&self) -> Option<Self> {
        Some(Self {
            method: self.method.clone(),
            body: self.body.try_clone()?,
            headers: self.headers.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    #[default]
    Json,
    Blob,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(serde_json::Value),
    Blob(Vec<u8>),
    /// 204 No Content, or a success with no body at all.
    Empty,
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        matches!(self, ApiResponse::Empty)
    }

    pub fn into_json(self) -> serde_json::Value {
        match self {
            ApiResponse::Json(value) => value,
            ApiResponse::Blob(_) | ApiResponse::Empty => serde_json::Value::Null,
        }
    }
}

/// Raw reply from an unauthenticated call (`token/`, `register/`). The caller
/// decides what a failure status means.
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousReply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl AnonymousReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The single choke point for every backend call: attaches the bearer
/// token, normalizes the URL and turns status codes into `ErpError`s,
/// alerting the user on every failure.
pub struct ApiGateway<S: TokenStore, U: Surface> {
    base_url: String,
    login_page: String,
    auto_refresh: bool,
    store: S,
    surface: U,
    client: Client,
}

impl<S: TokenStore, U: Surface> ApiGateway<S, U> {
    pub fn new(base_url: impl Into<String>, store: S, surface: U) -> Self {
        Self {
            base_url: base_url.into(),
            login_page: DEFAULT_LOGIN_PAGE.to_string(),
            auto_refresh: false,
            store,
            surface,
            client: Client::new(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C, store: S, surface: U) -> Self {
        Self::new(config.api_base_url(), store, surface)
            .with_login_page(config.login_page())
            .with_auto_refresh(config.auto_refresh())
    }

    pub fn with_login_page(mut self, login_page: impl Into<String>) -> Self {
        self.login_page = login_page.into();
        self
    }

    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn login_page(&self) -> &str {
        &self.login_page
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn url_for(&self, path: &str) -> String {
        build_url(&self.base_url, path)
    }

    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
        kind: ResponseKind,
    ) -> Result<ApiResponse> {
        let replay = if self.auto_refresh {
            options.try_clone()
        } else {
            None
        };

        let response = self.send(path, options, true).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(options) = replay {
                tracing::info!("🔄 Access token rejected for {}, attempting refresh", path);
                if self.refresh_tokens().await.is_ok() {
                    let retried = self.send(path, options, true).await?;
                    if retried.status() != StatusCode::UNAUTHORIZED {
                        return self.interpret(path, retried, kind).await;
                    }
                }
            }
            return Err(self.force_logout().await);
        }

        self.interpret(path, response, kind).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .request(path, RequestOptions::get(), ResponseKind::Json)
            .await?;
        Ok(serde_json::from_value(response.into_json())?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::json(Method::POST, body)?;
        let response = self.request(path, options, ResponseKind::Json).await?;
        Ok(serde_json::from_value(response.into_json())?)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::json(Method::PUT, body)?;
        let response = self.request(path, options, ResponseKind::Json).await?;
        Ok(serde_json::from_value(response.into_json())?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(path, RequestOptions::delete(), ResponseKind::Json)
            .await?;
        Ok(())
    }

    pub async fn get_blob(&self, path: &str) -> Result<Vec<u8>> {
        match self
            .request(path, RequestOptions::get(), ResponseKind::Blob)
            .await?
        {
            ApiResponse::Blob(bytes) => Ok(bytes),
            _ => Ok(Vec::new()),
        }
    }

    /// POST without credentials and without forced-logout handling.
    pub async fn post_anonymous<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AnonymousReply> {
        let options = RequestOptions::json(Method::POST, body)?;
        let response = self.send(path, options, false).await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| ErpError::ParseError {
            status,
            message: e.to_string(),
        })?;

        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).trim().to_string())
            })
        };

        tracing::debug!("⬅️ {} (anonymous) -> {}", path, status);
        Ok(AnonymousReply { status, body })
    }

    /// Exchanges the stored refresh token for a new access token.
    pub async fn refresh_tokens(&self) -> Result<String> {
        let refresh = match self.store.get(REFRESH_TOKEN_KEY).await? {
            Some(token) if !token.is_empty() => token,
            _ => return Err(ErpError::Unauthorized),
        };

        let reply = self
            .post_anonymous(TOKEN_REFRESH_PATH, &RefreshRequest { refresh: &refresh })
            .await?;
        if !reply.is_success() {
            tracing::warn!("❌ Token refresh rejected with status {}", reply.status);
            return Err(ErpError::Unauthorized);
        }

        let tokens: TokenPair = serde_json::from_value(reply.body)?;
        self.store.set(ACCESS_TOKEN_KEY, &tokens.access).await?;
        if let Some(rotated) = &tokens.refresh {
            self.store.set(REFRESH_TOKEN_KEY, rotated).await?;
        }
        tracing::info!("🔑 Access token refreshed");
        Ok(tokens.access)
    }

    /// Clears both stored tokens and sends the user to the login page.
    pub async fn clear_session(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.store.remove(key).await {
                tracing::error!("Failed to remove {} from token store: {}", key, e);
            }
        }
        self.surface.navigate(&self.login_page);
    }

    async fn force_logout(&self) -> ErpError {
        tracing::warn!("🔒 Received 401, clearing session");
        self.surface
            .alert("Your session has expired. Please log in again.");
        self.clear_session().await;
        ErpError::Unauthorized
    }

    async fn send(
        &self,
        path: &str,
        options: RequestOptions,
        authenticated: bool,
    ) -> Result<Response> {
        let url = self.url_for(path);
        let RequestOptions {
            method,
            body,
            headers: extra_headers,
        } = options;

        let mut headers = HeaderMap::new();
        if authenticated {
            let token = self.store.get(ACCESS_TOKEN_KEY).await?.unwrap_or_default();
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
        }
        if !body.is_form() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        for (name, value) in &extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ErpError::ValidationError {
                    message: format!("Invalid header name '{}': {}", name, e),
                }
            })?;
            headers.insert(name, header_value(value)?);
        }

        tracing::debug!("➡️ {} {}", method, url);
        let mut request = self.client.request(method, &url).headers(headers);
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.body(serde_json::to_vec(&value)?),
            RequestBody::Text(text) => request.body(text),
            RequestBody::Form(form) => request.multipart(form),
        };

        match request.send().await {
            Ok(response) => {
                tracing::debug!("⬅️ {} -> {}", url, response.status());
                Ok(response)
            }
            Err(e) => {
                tracing::error!("❌ Network error for {}: {}", url, e);
                self.surface
                    .alert("Could not reach the server. Check your connection and try again.");
                Err(ErpError::NetworkUnreachable {
                    url,
                    message: e.to_string(),
                })
            }
        }
    }

    async fn interpret(
        &self,
        path: &str,
        response: Response,
        kind: ResponseKind,
    ) -> Result<ApiResponse> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse::Empty);
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = ErpError::ParseError {
                    status: status.as_u16(),
                    message: e.to_string(),
                };
                self.surface.alert(&err.to_string());
                return Err(err);
            }
        };

        if !status.is_success() {
            let err = match error_message(status.as_u16(), &bytes) {
                Ok(message) => ErpError::HttpError {
                    status: status.as_u16(),
                    message,
                },
                Err(err) => err,
            };
            tracing::error!("❌ API error on {}: {}", path, err);
            self.surface.alert(&err.to_string());
            return Err(err);
        }

        if kind == ResponseKind::Blob {
            return Ok(ApiResponse::Blob(bytes.to_vec()));
        }

        if bytes.is_empty() {
            return Ok(ApiResponse::Empty);
        }

        serde_json::from_slice(&bytes)
            .map(ApiResponse::Json)
            .map_err(|e| {
                let err = ErpError::ParseError {
                    status: status.as_u16(),
                    message: e.to_string(),
                };
                self.surface.alert(&err.to_string());
                err
            })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ErpError::ValidationError {
        message: format!("Invalid header value: {}", e),
    })
}

/// Message for a failed response: the JSON `detail` field when present,
/// otherwise the whole JSON body, otherwise the raw text.
pub fn error_message(status: u16, body: &[u8]) -> Result<String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(format!("HTTP error! Status: {}", status));
    }

    let text = std::str::from_utf8(body).map_err(|e| ErpError::ParseError {
        status,
        message: format!("error body is not valid UTF-8: {}", e),
    })?;

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => Ok(match value.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(detail) => detail.to_string(),
            None => value.to_string(),
        }),
        Err(_) => Ok(text.trim().to_string()),
    }
}
