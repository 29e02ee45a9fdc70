use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status and a `{"message"}` body.
    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

/// Thin wrapper over the user endpoints.
#[derive(Debug, Clone)]
pub struct RatingsClient {
    client: Client,
    base_url: String,
}

impl RatingsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /`, returning the status message.
    pub async fn status(&self) -> Result<String, ClientError> {
        let body: MessageBody = Self::send(self.client.get(self.url("/"))).await?;
        Ok(body.message)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let request = self
            .client
            .post(self.url("/api/users/register"))
            .json(&json!({ "username": username, "email": email, "password": password }));
        Self::send(request).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let request = self
            .client
            .post(self.url("/api/users/login"))
            .json(&json!({ "username": username, "password": password }));
        Self::send(request).await
    }

    pub async fn profile(&self, token: &str, user_id: i64) -> Result<UserProfile, ClientError> {
        let request = self
            .client
            .get(self.url(&format!("/api/users/{}/profile", user_id)))
            .bearer_auth(token);
        Self::send(request).await
    }

    pub async fn update_email(
        &self,
        token: &str,
        user_id: i64,
        email: &str,
    ) -> Result<UserProfile, ClientError> {
        let request = self
            .client
            .put(self.url(&format!("/api/users/{}/profile", user_id)))
            .bearer_auth(token)
            .json(&json!({ "email": email }));
        Self::send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await?;
        let message = serde_json::from_str::<MessageBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        Err(ClientError::Api { status, message })
    }
}
