//! Ayon product browser
//!
//! Product/version browsing logic on top of the query cache: the version
//! fetch coordinator, the product/version merge and the optimistic status
//! update flow, plus the entry points a view calls into.

pub mod browser;
pub mod coordinator;
pub mod endpoints;
pub mod error;
pub mod merge;
pub mod notify;
pub mod status;
pub mod store;

pub use browser::ProductBrowser;
pub use coordinator::{VersionChange, VersionCoordinator};
pub use endpoints::{
    FolderVersions, FolderVersionsArgs, ProductList, ProductListArgs, ProductsVersions,
    UpdateVersions, UpdateVersionsArgs, VersionDetail, VersionsArgs, DETAIL_TAG, PRODUCT_TAG,
    PRODUCTS_VERSION_TAG,
};
pub use error::{BrowserError, BrowserResult};
pub use merge::{merge_products, version_ids_for};
pub use notify::{Notification, NotificationLevel, NotificationLog, Notifier, TracingNotifier};
pub use status::{StatusChange, StatusOutcome, StatusUpdater};
pub use store::{BrowserState, BrowserStore, VersionSelection};
