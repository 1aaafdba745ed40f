mod auth;
mod rest;
mod storage;

use std::time::Duration;

use art_survey_application::ApplicationError;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client for the hosted platform (auth, REST tables and storage).
#[derive(Debug, Clone)]
pub struct PlatformClient {
    base_url: String,
    api_key: String,
    bucket: String,
    http: Client,
}

impl PlatformClient {
    pub fn new(base_url: &str, api_key: &str, bucket: &str) -> Result<Self, ApplicationError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApplicationError::Configuration(
                "platform url must not be empty".to_string(),
            ));
        }
        if api_key.trim().is_empty() {
            return Err(ApplicationError::Configuration(
                "platform api key must not be empty".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| ApplicationError::Configuration(error.to_string()))?;

        Ok(Self {
            base_url,
            api_key: api_key.trim().to_string(),
            bucket: bucket.trim().to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Every call carries the api key; `bearer` defaults to the api key too.
    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.api_key);
        self.http
            .request(method, self.endpoint(path))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
    }

    fn send(&self, builder: RequestBuilder) -> Result<Response, ApplicationError> {
        let response = builder
            .send()
            .map_err(|error| ApplicationError::Remote(error.to_string()))?;
        let status = response.status();
        debug!(url = %response.url().path(), %status, "platform response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(ApplicationError::Remote(error_message(status.as_u16(), &body)))
    }

    fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApplicationError> {
        self.send(builder)?
            .json::<T>()
            .map_err(|error| ApplicationError::Remote(format!("unexpected response: {error}")))
    }
}

/// Picks the human-readable message out of an error body, whichever service sent it.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(Value::String(message)) = fields.get(key) {
                if !message.trim().is_empty() {
                    return message.clone();
                }
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        format!("request failed with status {status}")
    } else {
        format!("request failed with status {status}: {body}")
    }
}
