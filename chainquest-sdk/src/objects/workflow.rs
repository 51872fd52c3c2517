//! Kwala workflow API wire types.
//!
//! Workflow responses are owned by Kwala and passed through untouched, so
//! only the request bodies are typed here.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Body of `POST /workspaces/{id}/workflows/{name}/trigger`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerWorkflowRequest {
    pub parameters: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Body of the manual trigger route on the ChainQuest server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualTriggerRequest {
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Query string of the workflow history route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Response of the ChainQuest server after forwarding a trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredResponse {
    pub status: String,
    pub workflow: String,
    pub parameters: serde_json::Value,
    pub kwala_result: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}
