//! Endpoint bindings used by the product browser

use async_trait::async_trait;
use ayon_core::{EntityType, Product, Version};
use serde_json::Value;
use tracing::{debug, info};

use crate::client::AyonClient;
use crate::error::{ApiError, ApiResult};
use crate::graphql::{
    ProductsListVariables, ProductsProject, ProjectData, VersionsProject, VersionsVariables,
    PRODUCTS_LIST_QUERY, VERSIONS_QUERY,
};
use crate::types::{
    OperationRequest, OperationsRequest, OperationsResponse, VersionEntity, VersionPatch,
};

/// Server operations the browser depends on
#[async_trait]
pub trait AyonApi: Send + Sync {
    /// Products living in any of the given folders
    async fn product_list(&self, folder_ids: &[String]) -> ApiResult<Vec<Product>>;

    /// Versions with exactly the given ids
    async fn versions(&self, ids: &[String]) -> ApiResult<Vec<Version>>;

    /// Versions with the given ids that belong to one folder
    async fn folder_versions(&self, folder_id: &str, ids: &[String]) -> ApiResult<Vec<Version>> {
        let versions = self.versions(ids).await?;
        Ok(versions
            .into_iter()
            .filter(|v| v.folder_id == folder_id)
            .collect())
    }

    /// Full version entity
    async fn version(&self, id: &str) -> ApiResult<VersionEntity>;

    /// Patch several versions in one operations batch
    async fn update_versions(
        &self,
        ids: &[String],
        patch: &VersionPatch,
    ) -> ApiResult<OperationsResponse>;
}

#[async_trait]
impl AyonApi for AyonClient {
    async fn product_list(&self, folder_ids: &[String]) -> ApiResult<Vec<Product>> {
        if folder_ids.is_empty() {
            return Ok(Vec::new());
        }
        let data: ProjectData<ProductsProject> = self
            .graphql(
                PRODUCTS_LIST_QUERY,
                ProductsListVariables {
                    project_name: self.project_name(),
                    folder_ids,
                },
            )
            .await?;
        let project = data
            .project
            .ok_or_else(|| ApiError::NotFound(format!("Project {}", self.project_name())))?;

        let products: Vec<Product> = project.products.into_nodes().map(Product::from).collect();
        debug!(
            "Loaded {} products for {} folders",
            products.len(),
            folder_ids.len()
        );
        Ok(products)
    }

    async fn versions(&self, ids: &[String]) -> ApiResult<Vec<Version>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let data: ProjectData<VersionsProject> = self
            .graphql(
                VERSIONS_QUERY,
                VersionsVariables {
                    project_name: self.project_name(),
                    ids,
                },
            )
            .await?;
        let project = data
            .project
            .ok_or_else(|| ApiError::NotFound(format!("Project {}", self.project_name())))?;
        Ok(project.versions.into_nodes().map(Version::from).collect())
    }

    async fn version(&self, id: &str) -> ApiResult<VersionEntity> {
        let path = format!("{}/versions/{}", self.project_path(), id);
        self.get_json(&path).await
    }

    async fn update_versions(
        &self,
        ids: &[String],
        patch: &VersionPatch,
    ) -> ApiResult<OperationsResponse> {
        let data: Value = serde_json::to_value(patch)?;
        let request = OperationsRequest {
            operations: ids
                .iter()
                .map(|id| OperationRequest::update(EntityType::Version, id.clone(), data.clone()))
                .collect(),
            can_fail: false,
        };

        info!("Updating {} versions", ids.len());
        let path = format!("{}/operations", self.project_path());
        self.post_json(&path, &request).await
    }
}
