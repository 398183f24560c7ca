// ABOUTME: Focus and version-selection state shared by the browser callbacks
// ABOUTME: Passed explicitly to the browser instead of living in a global store

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use ayon_core::SelectedVersion;
use tracing::debug;

/// Selected version per product, keyed by version id.
///
/// Holds at most one entry per product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSelection {
    entries: BTreeMap<String, SelectedVersion>,
}

impl VersionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `version_id` for its product, replacing the product's previous
    /// selection. Returns the replaced version id.
    pub fn select(
        &mut self,
        version_id: impl Into<String>,
        product_id: impl Into<String>,
        folder_id: impl Into<String>,
    ) -> Option<String> {
        let version_id = version_id.into();
        let product_id = product_id.into();

        let replaced = self
            .entries
            .iter()
            .find(|(id, entry)| entry.product_id == product_id && **id != version_id)
            .map(|(id, _)| id.clone());
        if let Some(old) = &replaced {
            self.entries.remove(old);
        }

        self.entries.insert(
            version_id,
            SelectedVersion {
                product_id,
                folder_id: folder_id.into(),
            },
        );
        replaced
    }

    pub fn get(&self, version_id: &str) -> Option<&SelectedVersion> {
        self.entries.get(version_id)
    }

    pub fn version_for_product(&self, product_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.product_id == product_id)
            .map(|(id, _)| id.as_str())
    }

    /// Selected version ids grouped by folder, limited to `focused_folders`
    pub fn by_folder(&self, focused_folders: &[String]) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (version_id, entry) in &self.entries {
            if focused_folders.contains(&entry.folder_id) {
                grouped
                    .entry(entry.folder_id.clone())
                    .or_default()
                    .push(version_id.clone());
            }
        }
        grouped
    }

    /// Product ids whose selection lives in one of `folders`
    pub fn products_in(&self, folders: &[String]) -> Vec<String> {
        self.entries
            .values()
            .filter(|entry| folders.contains(&entry.folder_id))
            .map(|entry| entry.product_id.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SelectedVersion)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Snapshot of everything the browser tracks about focus and selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowserState {
    pub focused_folders: Vec<String>,
    pub focused_products: Vec<String>,
    pub focused_versions: Vec<String>,
    pub selection: VersionSelection,
}

#[derive(Debug, Default)]
pub struct BrowserStore {
    state: RwLock<BrowserState>,
}

impl BrowserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: BrowserState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BrowserState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BrowserState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> BrowserState {
        self.read().clone()
    }

    pub fn focused_folders(&self) -> Vec<String> {
        self.read().focused_folders.clone()
    }

    pub fn focused_products(&self) -> Vec<String> {
        self.read().focused_products.clone()
    }

    pub fn selection(&self) -> VersionSelection {
        self.read().selection.clone()
    }

    /// Focus new folders. Product focus is reset.
    pub fn set_focused_folders(&self, folder_ids: Vec<String>) {
        debug!("Focusing folders {:?}", folder_ids);
        let mut state = self.write();
        state.focused_folders = folder_ids;
        state.focused_products.clear();
        state.focused_versions.clear();
    }

    pub fn set_focused_products(&self, product_ids: Vec<String>, version_ids: Vec<String>) {
        let mut state = self.write();
        state.focused_products = product_ids;
        state.focused_versions = version_ids;
    }

    /// Record a version choice and return the version it replaced
    pub fn select_version(
        &self,
        version_id: &str,
        product_id: &str,
        folder_id: &str,
    ) -> Option<String> {
        self.write()
            .selection
            .select(version_id, product_id, folder_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_select_replaces_previous_version_of_product() {
        let mut selection = VersionSelection::new();
        assert_eq!(selection.select("v1", "p1", "f1"), None);
        selection.select("v5", "p2", "f1");

        assert_eq!(selection.select("v2", "p1", "f1"), Some("v1".to_string()));
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.version_for_product("p1"), Some("v2"));
        assert!(selection.get("v1").is_none());
    }

    #[test]
    fn test_reselecting_same_version_is_stable() {
        let mut selection = VersionSelection::new();
        selection.select("v1", "p1", "f1");

        assert_eq!(selection.select("v1", "p1", "f1"), None);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_by_folder_skips_unfocused_folders() {
        let mut selection = VersionSelection::new();
        selection.select("v1", "p1", "f1");
        selection.select("v2", "p2", "f1");
        selection.select("v3", "p3", "f2");
        selection.select("v4", "p4", "f3");

        let grouped = selection.by_folder(&["f1".to_string(), "f2".to_string()]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["f1"], vec!["v1".to_string(), "v2".to_string()]);
        assert_eq!(grouped["f2"], vec!["v3".to_string()]);
    }

    #[test]
    fn test_focusing_folders_resets_product_focus() {
        let store = BrowserStore::new();
        store.set_focused_products(vec!["p1".to_string()], vec!["v1".to_string()]);

        store.set_focused_folders(vec!["f1".to_string()]);

        let state = store.snapshot();
        assert_eq!(state.focused_folders, vec!["f1".to_string()]);
        assert!(state.focused_products.is_empty());
        assert!(state.focused_versions.is_empty());
    }
}
