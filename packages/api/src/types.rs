//! REST request and response models for the Ayon server

use ayon_core::EntityType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by REST endpoints
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Create,
    Update,
    Delete,
}

/// One entry of an operations batch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    pub entity_type: EntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl OperationRequest {
    pub fn update(entity_type: EntityType, entity_id: impl Into<String>, data: Value) -> Self {
        Self {
            operation_type: OperationType::Update,
            entity_type,
            entity_id: Some(entity_id.into()),
            data: Some(data),
        }
    }
}

/// `POST /api/projects/{project}/operations` body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsRequest {
    pub operations: Vec<OperationRequest>,
    pub can_fail: bool,
}

/// Result of one operation in a batch
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub operation_type: Option<OperationType>,
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Operations batch response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationsResponse {
    pub success: bool,
    #[serde(default)]
    pub operations: Vec<OperationResponse>,
}

impl OperationsResponse {
    /// Joined per-operation details when the batch reports failure
    pub fn failure_message(&self) -> Option<String> {
        if self.success {
            return None;
        }
        let details: Vec<&str> = self
            .operations
            .iter()
            .filter(|op| !op.success)
            .filter_map(|op| op.detail.as_deref())
            .collect();
        if details.is_empty() {
            Some("Operation failed".to_string())
        } else {
            Some(details.join(", "))
        }
    }
}

/// Fields of a version that can be patched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VersionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl VersionPatch {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }
}

/// Full version entity from `GET /api/projects/{project}/versions/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntity {
    pub id: String,
    pub version: i32,
    pub product_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attrib: Value,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
