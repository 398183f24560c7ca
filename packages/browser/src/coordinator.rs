//! Fetches the versions selected for display and keeps them in local state.
//!
//! Two entry points feed the state: [`VersionCoordinator::refresh_focused`]
//! reloads every selected version of the focused folders, and
//! [`VersionCoordinator::change_versions`] loads versions the user just picked.
//! Every call takes a request token and claims the products it covers; a
//! result is only written for products whose latest claim belongs to the call,
//! so the later-started call wins whatever order the responses arrive in.
//! Claims are dropped once no older call is left to be superseded by them.
//!
//! Status changes in flight are shown as overlays on the held versions until
//! the server confirms or rejects them.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use ayon_api::AyonApi;
use ayon_cache::{QueryCache, QueryOptions};
use ayon_core::Version;
use futures::future::join_all;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::endpoints::{FolderVersions, FolderVersionsArgs, ProductsVersions, VersionsArgs};
use crate::error::{BrowserError, BrowserResult};
use crate::notify::Notifier;
use crate::store::VersionSelection;

/// Show `version_id` on the row of `product_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub product_id: String,
    pub version_id: String,
}

impl VersionChange {
    pub fn new(product_id: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            version_id: version_id.into(),
        }
    }
}

/// Optimistic status shown on held versions while an update is in flight
#[derive(Debug, Clone)]
struct StatusOverlay {
    id: u64,
    version_ids: Vec<String>,
    status: String,
}

#[derive(Default)]
struct CoordinatorState {
    versions: Vec<Version>,
    /// product id -> token of the request that marked it loading
    loading: HashMap<String, u64>,
    /// product id -> token of the latest request covering it
    claims: HashMap<String, u64>,
    /// Tokens of calls that have not settled yet
    in_flight: BTreeSet<u64>,
    overlays: Vec<StatusOverlay>,
    next_overlay: u64,
}

impl CoordinatorState {
    fn begin(&mut self, token: u64, product_ids: &[String]) {
        self.in_flight.insert(token);
        for product_id in product_ids {
            self.claims.insert(product_id.clone(), token);
        }
    }

    /// Mark a call settled and drop claims no remaining call can be
    /// superseded by
    fn settle(&mut self, token: u64) {
        self.in_flight.remove(&token);
        match self.in_flight.first().copied() {
            Some(oldest) => self.claims.retain(|_, latest| *latest >= oldest),
            None => self.claims.clear(),
        }
    }

    fn may_write(&self, token: u64, product_id: &str) -> bool {
        self.claims.get(product_id).map_or(true, |latest| *latest <= token)
    }

    fn superseded(&self, token: u64, product_id: &str) -> bool {
        self.claims.get(product_id).is_some_and(|latest| *latest > token)
    }

    /// Drop the claims of a request that produced nothing
    fn abandon(&mut self, token: u64) {
        self.claims.retain(|_, latest| *latest != token);
    }

    fn finish_loading(&mut self, token: u64) {
        self.loading.retain(|_, owner| *owner != token);
    }

    /// Held versions with every status overlay applied, oldest first
    fn view(&self) -> Vec<Version> {
        let mut versions = self.versions.clone();
        for overlay in &self.overlays {
            for version in versions
                .iter_mut()
                .filter(|v| overlay.version_ids.contains(&v.id))
            {
                version.status = overlay.status.clone();
            }
        }
        versions
    }
}

pub struct VersionCoordinator {
    cache: QueryCache,
    folder_versions: FolderVersions,
    products_versions: ProductsVersions,
    notifier: Arc<dyn Notifier>,
    state: Mutex<CoordinatorState>,
    published: watch::Sender<Arc<Vec<Version>>>,
    next_token: AtomicU64,
    cancel: CancellationToken,
}

impl VersionCoordinator {
    pub fn new(api: Arc<dyn AyonApi>, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        let (published, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            cache,
            folder_versions: FolderVersions::new(api.clone()),
            products_versions: ProductsVersions::new(api),
            notifier,
            state: Mutex::new(CoordinatorState::default()),
            published,
            next_token: AtomicU64::new(1),
            cancel: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_token(&self) -> u64 {
        self.next_token.fetch_add(1, Ordering::SeqCst)
    }

    /// Reload every selected version of the focused folders.
    ///
    /// One forced fetch per folder, run concurrently. State is replaced once,
    /// after all of them settle. Any failure leaves the state untouched.
    pub async fn refresh_focused(
        &self,
        focused_folders: &[String],
        selection: &VersionSelection,
    ) -> BrowserResult<Vec<Version>> {
        let by_folder = selection.by_folder(focused_folders);
        let token = self.take_token();
        self.lock()
            .begin(token, &selection.products_in(focused_folders));

        debug!(
            "Refreshing selected versions of {} folders (request {})",
            by_folder.len(),
            token
        );
        let fetches = by_folder.into_iter().map(|(folder_id, version_ids)| {
            let args = FolderVersionsArgs {
                folder_id,
                version_ids,
            };
            async move {
                self.cache
                    .query(&self.folder_versions, &args, QueryOptions::refetch())
                    .await
            }
        });

        let results = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                let mut state = self.lock();
                state.abandon(token);
                state.settle(token);
                drop(state);
                debug!("Refresh {} cancelled", token);
                return Err(BrowserError::Cancelled);
            }
            results = join_all(fetches) => results,
        };

        let fetched: Vec<Version> = match results.into_iter().collect::<Result<Vec<_>, _>>() {
            Ok(lists) => lists.into_iter().flatten().collect(),
            Err(err) => {
                {
                    let mut state = self.lock();
                    state.abandon(token);
                    state.settle(token);
                }
                error!("Failed to refresh focused versions: {}", err);
                self.notifier
                    .error(&format!("Failed to load versions: {}", err.user_message()));
                return Err(err.into());
            }
        };

        let snapshot = {
            let mut state = self.lock();
            let kept: Vec<Version> = state
                .versions
                .iter()
                .filter(|v| state.superseded(token, &v.product_id))
                .cloned()
                .collect();
            let mut next: Vec<Version> = fetched
                .into_iter()
                .filter(|v| state.may_write(token, &v.product_id))
                .collect();
            next.extend(kept);
            state.versions = next;
            state.settle(token);
            Arc::new(state.view())
        };

        info!("Loaded {} selected versions", snapshot.len());
        self.published.send_replace(snapshot.clone());
        Ok(snapshot.as_ref().clone())
    }

    /// Load newly picked versions in one batched fetch.
    ///
    /// The affected products are marked loading until the fetch settles. When
    /// a batch names a product more than once, its last change wins. On
    /// success the versions replace any entry for the same product (then any
    /// entry with the same id), and the folder-scoped cache entries are
    /// patched to match. Returns the versions that were written.
    pub async fn change_versions(&self, changes: &[VersionChange]) -> BrowserResult<Vec<Version>> {
        if changes.is_empty() {
            return Ok(Vec::new());
        }

        let token = self.take_token();
        let product_ids: Vec<String> = changes.iter().map(|c| c.product_id.clone()).collect();
        // product id -> version id picked last for it
        let wanted: HashMap<&str, &str> = changes
            .iter()
            .map(|c| (c.product_id.as_str(), c.version_id.as_str()))
            .collect();
        let args = VersionsArgs {
            ids: changes.iter().map(|c| c.version_id.clone()).collect(),
        };
        {
            let mut state = self.lock();
            state.begin(token, &product_ids);
            for product_id in &product_ids {
                state.loading.insert(product_id.clone(), token);
            }
        }

        debug!("Loading versions {:?} (request {})", args.ids, token);
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(BrowserError::Cancelled),
            fetched = self.cache.query(&self.products_versions, &args, QueryOptions::refetch()) => {
                fetched.map_err(BrowserError::from)
            }
        };

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(err) => {
                {
                    let mut state = self.lock();
                    state.finish_loading(token);
                    state.abandon(token);
                    state.settle(token);
                }
                if !err.is_cancelled() {
                    error!("Failed to load versions {:?}: {}", args.ids, err);
                    self.notifier
                        .error(&format!("Failed to load versions: {}", err.user_message()));
                }
                return Err(err);
            }
        };

        let (accepted, snapshot) = {
            let mut state = self.lock();
            state.finish_loading(token);
            let mut seen = HashSet::new();
            let accepted: Vec<Version> = fetched
                .into_iter()
                .filter(|v| wanted.get(v.product_id.as_str()) == Some(&v.id.as_str()))
                .filter(|v| seen.insert(v.product_id.clone()))
                .filter(|v| state.may_write(token, &v.product_id))
                .collect();
            state
                .versions
                .retain(|v| !accepted.iter().any(|a| a.product_id == v.product_id));
            state
                .versions
                .retain(|v| !accepted.iter().any(|a| a.id == v.id));
            state.versions.extend(accepted.iter().cloned());
            state.settle(token);
            (accepted, Arc::new(state.view()))
        };

        self.patch_folder_entries(&accepted);
        self.published.send_replace(snapshot);
        Ok(accepted)
    }

    /// Overwrite (or append) versions inside their folder's cached list
    fn patch_folder_entries(&self, versions: &[Version]) {
        let mut by_folder: BTreeMap<&str, Vec<Version>> = BTreeMap::new();
        for version in versions {
            by_folder
                .entry(version.folder_id.as_str())
                .or_default()
                .push(version.clone());
        }

        for (folder_id, updates) in by_folder {
            let patch = self.cache.update_query_data::<FolderVersions, _>(
                &FolderVersionsArgs::folder(folder_id),
                move |draft| {
                    for update in &updates {
                        match draft.iter().position(|v| v.id == update.id) {
                            Some(index) => draft[index] = update.clone(),
                            None => draft.push(update.clone()),
                        }
                    }
                },
            );
            if patch.is_applied() {
                debug!("Patched cached versions of folder {}", folder_id);
            }
            patch.commit();
        }
    }

    /// Show `status` on the held versions in `version_ids` until the overlay
    /// is committed or cleared. `None` when none of them is held.
    pub fn overlay_status(&self, version_ids: &[String], status: &str) -> Option<u64> {
        let (id, snapshot) = {
            let mut state = self.lock();
            if !state.versions.iter().any(|v| version_ids.contains(&v.id)) {
                return None;
            }
            state.next_overlay += 1;
            let id = state.next_overlay;
            state.overlays.push(StatusOverlay {
                id,
                version_ids: version_ids.to_vec(),
                status: status.to_string(),
            });
            (id, Arc::new(state.view()))
        };
        self.published.send_replace(snapshot);
        Some(id)
    }

    /// Write a confirmed overlay into the held versions
    pub fn commit_overlay(&self, id: u64) {
        self.settle_overlay(id, true);
    }

    /// Drop a rejected overlay, leaving other overlays in place
    pub fn clear_overlay(&self, id: u64) {
        self.settle_overlay(id, false);
    }

    fn settle_overlay(&self, id: u64, keep: bool) {
        let snapshot = {
            let mut state = self.lock();
            let Some(index) = state.overlays.iter().position(|o| o.id == id) else {
                return;
            };
            let overlay = state.overlays.remove(index);
            if keep {
                // Older overlays must not hide the confirmed status
                for older in &mut state.overlays[..index] {
                    older.version_ids.retain(|v| !overlay.version_ids.contains(v));
                }
                for version in state
                    .versions
                    .iter_mut()
                    .filter(|v| overlay.version_ids.contains(&v.id))
                {
                    version.status = overlay.status.clone();
                }
            }
            Arc::new(state.view())
        };
        self.published.send_replace(snapshot);
    }

    /// Versions currently selected for display
    pub fn versions(&self) -> Vec<Version> {
        self.lock().view()
    }

    /// Products waiting on a version fetch, sorted
    pub fn loading_products(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().loading.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_loading(&self, product_id: &str) -> bool {
        self.lock().loading.contains_key(product_id)
    }

    /// Receives the version state each time a call settles with new data
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Version>>> {
        self.published.subscribe()
    }

    /// Cancel in-flight fetches. Later calls return `Cancelled` immediately.
    pub fn shutdown(&self) {
        if !self.cancel.is_cancelled() {
            info!("Shutting down version coordinator");
            self.cancel.cancel();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
