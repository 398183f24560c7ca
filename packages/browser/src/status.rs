//! Optimistic status updates for the versions shown on product rows

use std::sync::Arc;

use ayon_api::{AyonApi, OperationsResponse, VersionPatch};
use ayon_cache::{MutateOptions, QueryCache, Tag};
use ayon_core::ProductRow;
use tracing::{error, info};

use crate::endpoints::{
    version_tags, ProductList, ProductListArgs, UpdateVersions, UpdateVersionsArgs,
};
use crate::error::{BrowserError, BrowserResult};
use crate::merge::version_ids_for;
use crate::notify::Notifier;

const STATUS_FAILED_FALLBACK: &str = "Failed to update status";

/// Everything one status change needs to know about the current view
#[derive(Debug, Clone)]
pub struct StatusChange<'a> {
    pub status: &'a str,
    /// Product the change was triggered on
    pub product_id: &'a str,
    pub focused_products: &'a [String],
    /// Rows as currently displayed
    pub rows: &'a [ProductRow],
    /// Arguments of the product list entry to patch
    pub list_args: &'a ProductListArgs,
}

impl StatusChange<'_> {
    /// The whole focused selection when the product is part of it, otherwise
    /// just the product
    pub fn product_ids(&self) -> Vec<String> {
        if self.focused_products.iter().any(|id| id == self.product_id) {
            self.focused_products.to_vec()
        } else {
            vec![self.product_id.to_string()]
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusOutcome {
    pub version_ids: Vec<String>,
    pub response: Option<OperationsResponse>,
}

impl StatusOutcome {
    fn nothing() -> Self {
        Self {
            version_ids: Vec::new(),
            response: None,
        }
    }
}

pub struct StatusUpdater {
    cache: QueryCache,
    update: UpdateVersions,
    notifier: Arc<dyn Notifier>,
}

impl StatusUpdater {
    pub fn new(api: Arc<dyn AyonApi>, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            cache,
            update: UpdateVersions::new(api),
            notifier,
        }
    }

    /// Apply a status to the cached product list right away, confirm it with
    /// the server, then invalidate the affected versions. A failure removes
    /// only this change from the product list; other changes still in
    /// flight and data fetched meanwhile are left alone.
    pub async fn change_status(&self, change: StatusChange<'_>) -> BrowserResult<StatusOutcome> {
        let version_ids = version_ids_for(change.rows, &change.product_ids());
        if version_ids.is_empty() {
            info!("No versions to update for product {}", change.product_id);
            return Ok(StatusOutcome::nothing());
        }

        let status = change.status.to_string();
        let patched_ids = version_ids.clone();
        let patch = self
            .cache
            .update_query_data::<ProductList, _>(change.list_args, move |products| {
                for latest in products.iter_mut().filter_map(|p| p.latest.as_mut()) {
                    if patched_ids.contains(&latest.version_id) {
                        latest.status = status.clone();
                    }
                }
            });

        let args = UpdateVersionsArgs {
            version_ids: version_ids.clone(),
            patch: VersionPatch::status(change.status),
        };
        info!(
            "Setting status '{}' on {} versions",
            change.status,
            version_ids.len()
        );
        let result = self
            .cache
            .mutate(&self.update, &args, MutateOptions::without_invalidation())
            .await
            .map_err(BrowserError::from)
            .and_then(|response| match response.failure_message() {
                Some(message) => Err(BrowserError::OperationFailed(message)),
                None => Ok(response),
            });

        match result {
            Ok(response) => {
                patch.commit();
                let tags: Vec<Tag> = version_ids.iter().flat_map(|id| version_tags(id)).collect();
                self.cache.invalidate_tags(&tags);
                Ok(StatusOutcome {
                    version_ids,
                    response: Some(response),
                })
            }
            Err(err) => {
                error!("Failed to update status of {:?}: {}", version_ids, err);
                let message = match &err {
                    BrowserError::OperationFailed(message) => message.clone(),
                    BrowserError::Api(api) if !api.user_message().is_empty() => api.user_message(),
                    _ => STATUS_FAILED_FALLBACK.to_string(),
                };
                self.notifier.error(&message);
                patch.undo();
                Err(err)
            }
        }
    }
}
