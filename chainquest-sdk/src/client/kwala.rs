//! Kwala workflow API client (ChainQuest server → Kwala).
//!
//! All requests authenticate with `Authorization: Bearer {api_key}` and are
//! scoped to one workspace.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::workflow::TriggerWorkflowRequest;

/// Default page size of the execution history endpoint.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Typed HTTP client for the Kwala **workflow API**.
#[derive(Debug, Clone)]
pub struct KwalaClient {
    http: Client,
    base_url: Url,
    workspace_id: String,
    api_key: String,
}

impl KwalaClient {
    /// Create a new `KwalaClient`.
    ///
    /// * `base_url` – API root, e.g. `https://api.kwala.com/v1`.
    /// * `workspace_id` – the workspace owning the workflows.
    /// * `api_key` – bearer token for the workspace.
    pub fn new(base_url: Url, workspace_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            workspace_id: workspace_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    /// Build `{base}/workspaces/{id}/workflows[/{segments}]`.
    ///
    /// Any version prefix of the base URL (`/v1`) is kept; workflow names
    /// are percent-escaped as single segments.
    fn workflows_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty()
                .push("workspaces")
                .push(&self.workspace_id)
                .push("workflows");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// `POST /workspaces/{id}/workflows/{name}/trigger` – start a workflow run.
    pub async fn trigger_workflow(
        &self,
        workflow: &str,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.workflows_url(&[workflow, "trigger"])?;
        let body = TriggerWorkflowRequest {
            parameters,
            timestamp: time::OffsetDateTime::now_utc(),
        };

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /workspaces/{id}/workflows/{name}` – workflow status.
    pub async fn workflow_status(&self, workflow: &str) -> Result<serde_json::Value, ClientError> {
        let url = self.workflows_url(&[workflow])?;
        let resp = self.http.get(url).bearer_auth(&self.api_key).send().await?;
        parse_response(resp).await
    }

    /// `GET /workspaces/{id}/workflows` – all active workflows.
    pub async fn active_workflows(&self) -> Result<serde_json::Value, ClientError> {
        let url = self.workflows_url(&[])?;
        let resp = self.http.get(url).bearer_auth(&self.api_key).send().await?;
        parse_response(resp).await
    }

    /// `PUT /workspaces/{id}/workflows/{name}` – replace a workflow's config.
    pub async fn update_workflow(
        &self,
        workflow: &str,
        config: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.workflows_url(&[workflow])?;
        let resp = self
            .http
            .put(url)
            .bearer_auth(&self.api_key)
            .json(config)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET /workspaces/{id}/workflows/{name}/executions?limit=` – run history.
    pub async fn workflow_history(
        &self,
        workflow: &str,
        limit: Option<u32>,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.workflows_url(&[workflow, "executions"])?;
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .query(&[("limit", limit)])
            .send()
            .await?;
        parse_response(resp).await
    }
}
