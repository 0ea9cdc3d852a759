//! N8N workflow proxy.
//!
//! Lists the workflows of a project from the N8N REST API and hands the
//! body back unchanged.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use ucode_common::N8nConfig;

use crate::response::{ApiError, ApiResult};

#[derive(Clone)]
pub struct N8nProxy {
    client: Client,
    base_url: Arc<String>,
    api_token: Arc<String>,
}

impl N8nProxy {
    pub fn new(config: &N8nConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default N8N HTTP client");
                Client::new()
            });
        Self {
            client,
            base_url: Arc::new(config.base_url.trim_end_matches('/').to_string()),
            api_token: Arc::new(config.api_token.clone()),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// `GET {base}/workflows?projectId=<id>`.
    pub async fn list_workflows(&self, project_id: &str) -> ApiResult<Value> {
        if !self.is_configured() {
            return Err(ApiError::internal("n8n is not configured"));
        }
        let target_url = format!("{}/workflows", self.base_url);

        tracing::debug!(target_url = %target_url, project_id, "Listing N8N workflows");

        let response = self
            .client
            .get(&target_url)
            .query(&[("projectId", project_id)])
            .bearer_auth(self.api_token.as_str())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "N8N request failed");
                ApiError::internal(format!("n8n request failed: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read N8N response body");
            ApiError::internal(format!("failed to read n8n response: {e}"))
        })?;

        if !status.is_success() {
            return Err(ApiError::internal(format!(
                "n8n responded {}: {body}",
                status.as_u16()
            )));
        }

        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn proxy(base_url: &str) -> N8nProxy {
        N8nProxy::new(&N8nConfig {
            base_url: base_url.to_string(),
            api_token: "n8n-token".into(),
            timeout_secs: 5,
        })
    }

    #[tokio::test]
    async fn test_lists_workflows_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workflows"))
            .and(query_param("projectId", "re-1"))
            .and(header("authorization", "Bearer n8n-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "wf1", "name": "Onboarding"}],
                "nextCursor": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let body = proxy(&format!("{}/", server.uri()))
            .list_workflows("re-1")
            .await
            .unwrap();
        assert_eq!(body["data"][0]["id"], "wf1");
        assert!(body["nextCursor"].is_null());
    }

    #[tokio::test]
    async fn test_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workflows"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = proxy(&server.uri()).list_workflows("re-1").await.unwrap_err();
        assert_eq!(err.status(), Status::InternalServerError);
        assert!(err.message().contains("401"));
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let err = proxy("").list_workflows("re-1").await.unwrap_err();
        assert_eq!(err.message(), "n8n is not configured");
    }
}
