use log::info;
use reqwest::RequestBuilder;
use reqwest::header::{ACCEPT, AUTHORIZATION, ORIGIN, REFERER};
use serde_json::Value;
use tokio::sync::OnceCell;

use super::client::TimedClient;
use super::config::ApiConfig;
use super::error::ApiError;

/// Logs in on first use and keeps the `Authorization` value for the rest
/// of the run. A failed login is not cached.
#[derive(Debug, Default)]
pub struct AuthSession {
    authorization: OnceCell<String>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn authorization(
        &self,
        client: &TimedClient,
        cfg: &ApiConfig,
    ) -> Result<&str, ApiError> {
        let value = self
            .authorization
            .get_or_try_init(|| login(client, cfg))
            .await?;
        Ok(value.as_str())
    }

    /// Headers every authenticated call carries.
    pub async fn authorize(
        &self,
        request: RequestBuilder,
        client: &TimedClient,
        cfg: &ApiConfig,
    ) -> Result<RequestBuilder, ApiError> {
        let authorization = self.authorization(client, cfg).await?;
        Ok(request
            .header(AUTHORIZATION, authorization)
            .header("deviceId", &cfg.device_id)
            .header("lang", &cfg.lang)
            .header("userType", &cfg.user_type)
            .header(ACCEPT, "application/json, text/plain, */*"))
    }
}

/// `Origin` and `Referer` of the admin front end.
pub fn with_origin(request: RequestBuilder, cfg: &ApiConfig) -> RequestBuilder {
    request
        .header(ORIGIN, &cfg.origin)
        .header(REFERER, cfg.referer())
}

async fn login(client: &TimedClient, cfg: &ApiConfig) -> Result<String, ApiError> {
    let request = client
        .http()
        .post(cfg.url("/Public/login"))
        .header("userType", &cfg.user_type)
        .header("deviceId", &cfg.device_id)
        .form(&[
            ("username", cfg.username.as_str()),
            ("password", cfg.password.as_str()),
            ("code", cfg.otp.as_str()),
        ]);
    let response = client.send(request).await?;
    info!("login response time: {} ms", response.elapsed.as_millis());

    response
        .body
        .json()
        .and_then(authorization_value)
        .ok_or_else(|| ApiError::NoToken {
            status: response.status,
            body: response.body.to_string(),
        })
}

/// `"{tokenType} {token}"` from a login body, `Bearer` when no type is given.
pub fn authorization_value(body: &Value) -> Option<String> {
    let data = body.get("data")?;
    let token = data.get("token")?.as_str().filter(|t| !t.is_empty())?;
    let token_type = data
        .get("tokenType")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Bearer");
    Some(format!("{token_type} {token}"))
}
