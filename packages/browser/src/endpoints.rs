//! Cacheable queries and mutations over the Ayon API

use std::sync::Arc;

use async_trait::async_trait;
use ayon_api::{ApiError, AyonApi, OperationsResponse, VersionEntity, VersionPatch};
use ayon_cache::{Endpoint, Mutation, Tag};
use ayon_core::{Product, Version};
use serde::Serialize;

pub const PRODUCT_TAG: &str = "product";
pub const PRODUCTS_VERSION_TAG: &str = "productsVersion";
pub const DETAIL_TAG: &str = "detail";

/// Tags a confirmed status change on `version_id` invalidates
pub fn version_tags(version_id: &str) -> [Tag; 2] {
    [
        Tag::new(PRODUCTS_VERSION_TAG, version_id),
        Tag::new(DETAIL_TAG, version_id),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListArgs {
    pub folder_ids: Vec<String>,
}

impl ProductListArgs {
    pub fn new(folder_ids: impl Into<Vec<String>>) -> Self {
        Self {
            folder_ids: folder_ids.into(),
        }
    }
}

/// Products of the focused folders
#[derive(Clone)]
pub struct ProductList {
    api: Arc<dyn AyonApi>,
}

impl ProductList {
    pub fn new(api: Arc<dyn AyonApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Endpoint for ProductList {
    type Args = ProductListArgs;
    type Output = Vec<Product>;
    type Error = ApiError;

    const NAME: &'static str = "getProductList";

    fn provides_tags(_args: &Self::Args, output: &Self::Output) -> Vec<Tag> {
        output
            .iter()
            .map(|p| Tag::new(PRODUCT_TAG, &p.id))
            .chain(std::iter::once(Tag::list(PRODUCT_TAG)))
            .collect()
    }

    async fn fetch(&self, args: &Self::Args) -> Result<Self::Output, Self::Error> {
        self.api.product_list(&args.folder_ids).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionsArgs {
    pub ids: Vec<String>,
}

/// Versions by id, keyed by the exact id list
#[derive(Clone)]
pub struct ProductsVersions {
    api: Arc<dyn AyonApi>,
}

impl ProductsVersions {
    pub fn new(api: Arc<dyn AyonApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Endpoint for ProductsVersions {
    type Args = VersionsArgs;
    type Output = Vec<Version>;
    type Error = ApiError;

    const NAME: &'static str = "getProductsVersions";

    fn provides_tags(_args: &Self::Args, output: &Self::Output) -> Vec<Tag> {
        output
            .iter()
            .map(|v| Tag::new(PRODUCTS_VERSION_TAG, &v.id))
            .collect()
    }

    async fn fetch(&self, args: &Self::Args) -> Result<Self::Output, Self::Error> {
        self.api.versions(&args.ids).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderVersionsArgs {
    pub folder_id: String,
    pub version_ids: Vec<String>,
}

impl FolderVersionsArgs {
    /// Args addressing the folder's entry, whatever ids it was fetched with
    pub fn folder(folder_id: impl Into<String>) -> Self {
        Self {
            folder_id: folder_id.into(),
            version_ids: Vec::new(),
        }
    }
}

/// Selected versions of one folder. One cache entry per folder.
#[derive(Clone)]
pub struct FolderVersions {
    api: Arc<dyn AyonApi>,
}

impl FolderVersions {
    pub fn new(api: Arc<dyn AyonApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Endpoint for FolderVersions {
    type Args = FolderVersionsArgs;
    type Output = Vec<Version>;
    type Error = ApiError;

    const NAME: &'static str = "getFolderVersions";

    fn cache_key(args: &Self::Args) -> String {
        args.folder_id.clone()
    }

    fn provides_tags(_args: &Self::Args, output: &Self::Output) -> Vec<Tag> {
        output
            .iter()
            .map(|v| Tag::new(PRODUCTS_VERSION_TAG, &v.id))
            .collect()
    }

    async fn fetch(&self, args: &Self::Args) -> Result<Self::Output, Self::Error> {
        self.api
            .folder_versions(&args.folder_id, &args.version_ids)
            .await
    }
}

/// Full version entity for a detail panel
#[derive(Clone)]
pub struct VersionDetail {
    api: Arc<dyn AyonApi>,
}

impl VersionDetail {
    pub fn new(api: Arc<dyn AyonApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Endpoint for VersionDetail {
    type Args = String;
    type Output = VersionEntity;
    type Error = ApiError;

    const NAME: &'static str = "getVersion";

    fn provides_tags(args: &Self::Args, _output: &Self::Output) -> Vec<Tag> {
        vec![Tag::new(DETAIL_TAG, args)]
    }

    async fn fetch(&self, args: &Self::Args) -> Result<Self::Output, Self::Error> {
        self.api.version(args).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateVersionsArgs {
    pub version_ids: Vec<String>,
    pub patch: VersionPatch,
}

/// Batched version update
#[derive(Clone)]
pub struct UpdateVersions {
    api: Arc<dyn AyonApi>,
}

impl UpdateVersions {
    pub fn new(api: Arc<dyn AyonApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Mutation for UpdateVersions {
    type Args = UpdateVersionsArgs;
    type Output = OperationsResponse;
    type Error = ApiError;

    const NAME: &'static str = "updateVersions";

    // The status flow suppresses these and invalidates per version
    fn invalidates_tags(args: &Self::Args, _output: &Self::Output) -> Vec<Tag> {
        args.version_ids
            .iter()
            .flat_map(|id| version_tags(id))
            .chain(std::iter::once(Tag::list(PRODUCT_TAG)))
            .collect()
    }

    async fn execute(&self, args: &Self::Args) -> Result<Self::Output, Self::Error> {
        self.api.update_versions(&args.version_ids, &args.patch).await
    }
}
