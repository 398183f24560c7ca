// ABOUTME: Entry points the product/version views call into
// ABOUTME: Wires the store, query cache, version coordinator and status flow together

use std::sync::Arc;

use ayon_api::AyonApi;
use ayon_cache::{QueryCache, QueryOptions};
use ayon_core::{detail_fields, EntityType, Product, ProductRow, Version};
use tracing::{debug, error, warn};

use crate::coordinator::{VersionChange, VersionCoordinator};
use crate::endpoints::{
    ProductList, ProductListArgs, ProductsVersions, VersionDetail, VersionsArgs,
};
use crate::error::{BrowserError, BrowserResult};
use crate::merge::{merge_products, version_ids_for};
use crate::notify::Notifier;
use crate::status::{StatusChange, StatusOutcome, StatusUpdater};
use crate::store::BrowserStore;

pub struct ProductBrowser {
    store: Arc<BrowserStore>,
    cache: QueryCache,
    product_list: ProductList,
    products_versions: ProductsVersions,
    version_detail: VersionDetail,
    coordinator: VersionCoordinator,
    status: StatusUpdater,
    notifier: Arc<dyn Notifier>,
}

impl ProductBrowser {
    pub fn new(
        api: Arc<dyn AyonApi>,
        cache: QueryCache,
        store: Arc<BrowserStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            product_list: ProductList::new(api.clone()),
            products_versions: ProductsVersions::new(api.clone()),
            version_detail: VersionDetail::new(api.clone()),
            coordinator: VersionCoordinator::new(api.clone(), cache.clone(), notifier.clone()),
            status: StatusUpdater::new(api, cache.clone(), notifier.clone()),
            cache,
            notifier,
        }
    }

    pub fn store(&self) -> &Arc<BrowserStore> {
        &self.store
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn coordinator(&self) -> &VersionCoordinator {
        &self.coordinator
    }

    fn list_args(&self) -> ProductListArgs {
        ProductListArgs::new(self.store.focused_folders())
    }

    /// Focus folders, then load their products and selected versions together
    pub async fn focus_folders(&self, folder_ids: Vec<String>) -> BrowserResult<Vec<ProductRow>> {
        self.store.set_focused_folders(folder_ids.clone());
        let selection = self.store.selection();

        let (products, versions) = tokio::join!(
            self.load_products(),
            self.coordinator.refresh_focused(&folder_ids, &selection)
        );
        products?;
        if let Err(err) = versions {
            // already reported; rows fall back to the product list's versions
            debug!("Showing rows without refreshed versions: {}", err);
        }
        Ok(self.rows())
    }

    /// Product list of the focused folders, from cache when fresh
    pub async fn load_products(&self) -> BrowserResult<Vec<Product>> {
        let args = self.list_args();
        match self
            .cache
            .query(&self.product_list, &args, QueryOptions::default())
            .await
        {
            Ok(products) => Ok(products),
            Err(err) => {
                error!("Failed to load products for {:?}: {}", args.folder_ids, err);
                self.notifier
                    .error(&format!("Failed to load products: {}", err.user_message()));
                Err(err.into())
            }
        }
    }

    /// Cached products of the focused folders
    pub fn products(&self) -> Vec<Product> {
        self.cache
            .read::<ProductList>(&self.list_args())
            .unwrap_or_default()
    }

    /// Rows as they should be displayed
    pub fn rows(&self) -> Vec<ProductRow> {
        merge_products(&self.products(), &self.coordinator.versions())
    }

    pub fn loading_products(&self) -> Vec<String> {
        self.coordinator.loading_products()
    }

    /// The user picked another version for a product
    pub async fn on_select_version(&self, product_id: &str, version_id: &str) -> BrowserResult<()> {
        let Some(product) = self.products().into_iter().find(|p| p.id == product_id) else {
            warn!("Version {} picked for unknown product {}", version_id, product_id);
            return Err(BrowserError::UnknownProduct(product_id.to_string()));
        };

        self.store
            .select_version(version_id, product_id, &product.folder_id);
        self.coordinator
            .change_versions(&[VersionChange::new(product_id, version_id)])
            .await?;
        Ok(())
    }

    /// The user set a status on a row, or on the selection containing it.
    ///
    /// Versions held by the coordinator show the new status right away too,
    /// and drop it again if the server rejects the change.
    pub async fn on_status_change(
        &self,
        status: &str,
        product_id: &str,
    ) -> BrowserResult<StatusOutcome> {
        let state = self.store.snapshot();
        let rows = self.rows();
        let list_args = ProductListArgs::new(state.focused_folders.clone());
        let change = StatusChange {
            status,
            product_id,
            focused_products: &state.focused_products,
            rows: &rows,
            list_args: &list_args,
        };
        let overlay = self
            .coordinator
            .overlay_status(&version_ids_for(&rows, &change.product_ids()), status);

        let outcome = match self.status.change_status(change).await {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Some(overlay) = overlay {
                    self.coordinator.clear_overlay(overlay);
                }
                return Err(err);
            }
        };
        if let Some(overlay) = overlay {
            self.coordinator.commit_overlay(overlay);
        }

        // Versions held locally override the product list, reload them too
        let held: Vec<VersionChange> = self
            .coordinator
            .versions()
            .into_iter()
            .filter(|v| outcome.version_ids.contains(&v.id))
            .map(|v| VersionChange::new(v.product_id, v.id))
            .collect();
        if let Err(err) = self.coordinator.change_versions(&held).await {
            debug!("Reloading updated versions failed: {}", err);
        }
        Ok(outcome)
    }

    /// Row click. Additive clicks toggle the product in the focus.
    pub fn on_row_click(&self, product_id: &str, additive: bool) {
        let mut product_ids = self.store.focused_products();
        if additive {
            match product_ids.iter().position(|id| id == product_id) {
                Some(index) => {
                    product_ids.remove(index);
                }
                None => product_ids.push(product_id.to_string()),
            }
        } else {
            product_ids = vec![product_id.to_string()];
        }
        self.on_selection_change(product_ids);
    }

    /// Replace the focused products, deriving the focused versions from rows
    pub fn on_selection_change(&self, product_ids: Vec<String>) {
        let version_ids = version_ids_for(&self.rows(), &product_ids);
        debug!(
            "Focused {} products, {} versions",
            product_ids.len(),
            version_ids.len()
        );
        self.store.set_focused_products(product_ids, version_ids);
    }

    /// Versions by id, from cache when fresh
    pub async fn fetch_versions(&self, ids: Vec<String>) -> BrowserResult<Vec<Version>> {
        let versions = self
            .cache
            .query(&self.products_versions, &VersionsArgs { ids }, QueryOptions::default())
            .await?;
        Ok(versions)
    }

    /// `(label, value)` pairs describing one version
    pub async fn version_details(&self, version_id: &str) -> BrowserResult<Vec<(&'static str, String)>> {
        let entity = self
            .cache
            .query(&self.version_detail, &version_id.to_string(), QueryOptions::default())
            .await?;
        let value = serde_json::to_value(&entity).map_err(ayon_api::ApiError::from)?;
        Ok(detail_fields(EntityType::Version, &value))
    }

    pub fn shutdown(&self) {
        self.coordinator.shutdown();
    }
}

impl Drop for ProductBrowser {
    fn drop(&mut self) {
        self.coordinator.shutdown();
    }
}
