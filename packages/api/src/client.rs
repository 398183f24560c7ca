use std::time::Duration;

use ayon_config::{ClientConfig, Credentials};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::graphql::{GraphQlRequest, GraphQlResponse};
use crate::types::ErrorBody;

/// HTTP client for one project on an Ayon server
#[derive(Clone)]
pub struct AyonClient {
    http_client: Client,
    server_url: String,
    project_name: String,
    credentials: Credentials,
}

impl AyonClient {
    /// Create a client from validated configuration
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        config
            .validate()
            .map_err(|e| ApiError::config(e.to_string()))?;

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            server_url: config.server_url.trim_end_matches('/').to_string(),
            project_name: config.project_name.clone(),
            credentials: config.credentials.clone(),
        })
    }

    /// Create a client against an explicit server, mostly for tests
    pub fn with_server(server_url: impl Into<String>, project_name: impl Into<String>) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            server_url: server_url.into().trim_end_matches('/').to_string(),
            project_name: project_name.into(),
            credentials: Credentials::None,
        }
    }

    /// Replace the credentials sent with each request
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self.credentials, Credentials::None)
    }

    /// Path prefix of project-scoped REST endpoints
    pub(crate) fn project_path(&self) -> String {
        format!("/api/projects/{}", urlencoding::encode(&self.project_name))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.server_url, path);
        let builder = self.http_client.request(method, url);
        match &self.credentials {
            Credentials::ApiKey(key) => builder.header("x-api-key", key),
            Credentials::Token(token) => builder.bearer_auth(token),
            Credentials::None => builder,
        }
    }

    /// `GET` a JSON resource
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        debug!("GET {}", path);
        let response = self.request(Method::GET, path).send().await?;
        Self::handle_response(response).await
    }

    /// `POST` a JSON body and decode the JSON reply
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", path);
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Run a GraphQL query against `/graphql`
    pub async fn graphql<V, T>(&self, query: &str, variables: V) -> ApiResult<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let request = GraphQlRequest { query, variables };
        let response: GraphQlResponse<T> = self.post_json("/graphql", &request).await?;
        response.into_result()
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ApiError::InvalidResponse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail)
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body.clone()
                }
            });

        warn!("Ayon server returned {}: {}", status, message);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Authentication(message)),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
            status => Err(ApiError::Http {
                status: status.as_u16(),
                message,
            }),
        }
    }
}
