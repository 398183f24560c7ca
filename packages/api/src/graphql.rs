//! GraphQL queries and response shapes used by the product browser

use ayon_core::{Product, Version, VersionFields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

pub const PRODUCTS_LIST_QUERY: &str = r#"
query ProductsList($projectName: String!, $folderIds: [String!]!) {
  project(name: $projectName) {
    products(folderIds: $folderIds) {
      edges {
        node {
          id
          name
          productType
          folderId
          folder { name }
          latestVersion {
            id
            name
            version
            status
            author
            createdAt
            task { name }
          }
        }
      }
    }
  }
}
"#;

pub const VERSIONS_QUERY: &str = r#"
query ProductsVersions($projectName: String!, $ids: [String!]!) {
  project(name: $projectName) {
    versions(ids: $ids) {
      edges {
        node {
          id
          name
          version
          status
          author
          createdAt
          productId
          taskId
          product { folderId }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// Generic GraphQL response wrapper
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

impl<T> GraphQlResponse<T> {
    /// Get the data, returning an error if the server reported any
    pub fn into_result(self) -> ApiResult<T> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiError::GraphQl(message));
        }
        self.data
            .ok_or_else(|| ApiError::invalid("GraphQL response contained no data"))
    }
}

#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|edge| edge.node)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsListVariables<'a> {
    pub project_name: &'a str,
    pub folder_ids: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionsVariables<'a> {
    pub project_name: &'a str,
    pub ids: &'a [String],
}

/// Project is `null` when the project does not exist
#[derive(Debug, Deserialize)]
pub struct ProjectData<T> {
    pub project: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct ProductsProject {
    pub products: Connection<ProductNode>,
}

#[derive(Debug, Deserialize)]
pub struct VersionsProject {
    pub versions: Connection<VersionNode>,
}

#[derive(Debug, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub name: String,
    pub product_type: String,
    pub folder_id: String,
    pub folder: Option<NamedRef>,
    pub latest_version: Option<LatestVersionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestVersionNode {
    pub id: String,
    pub name: String,
    pub status: String,
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub task: Option<NamedRef>,
}

#[derive(Debug, Deserialize)]
pub struct FolderRef {
    #[serde(rename = "folderId")]
    pub folder_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: i32,
    pub status: String,
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub product_id: String,
    pub task_id: Option<String>,
    pub product: FolderRef,
}

impl From<ProductNode> for Product {
    fn from(node: ProductNode) -> Self {
        let task_name = node
            .latest_version
            .as_ref()
            .and_then(|v| v.task.as_ref())
            .map(|t| t.name.clone());
        Product {
            id: node.id,
            name: node.name,
            product_type: node.product_type,
            folder_id: node.folder_id,
            folder: node.folder.map(|f| f.name).unwrap_or_default(),
            task_name,
            latest: node.latest_version.map(|v| VersionFields {
                version_id: v.id,
                version_name: v.name,
                status: v.status,
                author: v.author,
                created_at: v.created_at,
            }),
        }
    }
}

impl From<VersionNode> for Version {
    fn from(node: VersionNode) -> Self {
        Version {
            id: node.id,
            name: node.name,
            version: node.version,
            status: node.status,
            author: node.author,
            created_at: node.created_at,
            product_id: node.product_id,
            folder_id: node.product.folder_id,
            task_id: node.task_id,
        }
    }
}
