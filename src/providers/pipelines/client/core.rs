use log::debug;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{PipeError, Result};

pub(super) type QueryParams = Vec<(&'static str, String)>;

/// HTTP client for the pipelines REST API.
pub struct PipelinesClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

impl PipelinesClient {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pipewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipeError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Url::join drops the last path segment unless it ends with a slash
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');

        let api_url = Url::parse(&base)
            .map_err(|e| PipeError::Config(format!("Invalid base URL: {e}")))?
            .join("pipelines/api/v1/")
            .map_err(|e| PipeError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| PipeError::Config(format!("Invalid endpoint '{path}': {e}")))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(path)?;
        debug!("{method} {url} {query:?}");

        let mut request = self.client.request(method.clone(), url).query(query);
        if method == Method::POST {
            request = request.json(&serde_json::json!({}));
        }

        let response = self.auth_request(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(PipeError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    pub(super) async fn get_json<T>(&self, path: &str, query: &QueryParams) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(Method::GET, path, query).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(super) async fn post(&self, path: &str, query: &QueryParams) -> Result<()> {
        self.send(Method::POST, path, query).await?;
        Ok(())
    }
}
