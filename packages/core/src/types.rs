// ABOUTME: Product, version and merged-row type definitions
// ABOUTME: Shapes shared by the API client, the query cache and the browser view-model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-version fields a product row displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionFields {
    pub version_id: String,
    pub version_name: String,
    pub status: String,
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A named deliverable container within a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub product_type: String,
    pub folder_id: String,
    /// Display name of the owning folder
    pub folder: String,
    pub task_name: Option<String>,
    /// Latest version as delivered by the product list query
    #[serde(default)]
    pub latest: Option<VersionFields>,
}

impl Product {
    /// Id of the version the product list currently points at, if any
    pub fn version_id(&self) -> Option<&str> {
        self.latest.as_ref().map(|v| v.version_id.as_str())
    }
}

/// A numbered revision of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: i32,
    pub status: String,
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub product_id: String,
    pub folder_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
}

impl Version {
    /// Fields copied onto a product row when this version is selected
    pub fn fields(&self) -> VersionFields {
        VersionFields {
            version_id: self.id.clone(),
            version_name: self.name.clone(),
            status: self.status.clone(),
            author: self.author.clone(),
            created_at: self.created_at,
        }
    }
}

/// One table/grid row: a product joined with its currently selected version.
///
/// `version` is `None` when no version is known for the product yet. That is
/// a displayable state, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub product_type: String,
    pub folder_id: String,
    pub folder: String,
    pub task_name: Option<String>,
    #[serde(flatten)]
    pub version: Option<VersionFields>,
}

impl ProductRow {
    pub fn version_id(&self) -> Option<&str> {
        self.version.as_ref().map(|v| v.version_id.as_str())
    }

    pub fn status(&self) -> Option<&str> {
        self.version.as_ref().map(|v| v.status.as_str())
    }

    /// Attach (or replace) the version fields of this row
    pub fn with_version(mut self, version: &Version) -> Self {
        self.version = Some(version.fields());
        self
    }
}

impl From<Product> for ProductRow {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            product_type: product.product_type,
            folder_id: product.folder_id,
            folder: product.folder,
            task_name: product.task_name,
            version: product.latest,
        }
    }
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        ProductRow::from(product.clone())
    }
}

/// The folder a selected version lives in, and the product it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedVersion {
    pub product_id: String,
    pub folder_id: String,
}
