use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::endpoint::{Endpoint, Mutation};
use crate::tag::Tag;

type Snapshot = Arc<dyn Any + Send + Sync>;
type Recipe = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;
type Replay = fn(&Snapshot, &[Layer]) -> Option<Snapshot>;

const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Address of one cached query result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub endpoint: &'static str,
    pub key: String,
}

impl QueryKey {
    pub fn of<E: Endpoint>(args: &E::Args) -> Self {
        Self {
            endpoint: E::NAME,
            key: E::cache_key(args),
        }
    }
}

/// Notifications about cache changes
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    Fetched { key: QueryKey },
    Patched { key: QueryKey },
    PatchUndone { key: QueryKey },
    Invalidated { tags: Vec<Tag>, keys: Vec<QueryKey> },
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries older than this are refetched on the next query
    pub stale_after: Option<Duration>,
    /// Buffered events per subscriber
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Skip the cached value and always hit the server
    pub force_refetch: bool,
}

impl QueryOptions {
    pub fn refetch() -> Self {
        Self {
            force_refetch: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutateOptions {
    /// Invalidate the mutation's declared tags on success
    pub invalidate: bool,
}

impl Default for MutateOptions {
    fn default() -> Self {
        Self { invalidate: true }
    }
}

impl MutateOptions {
    pub fn without_invalidation() -> Self {
        Self { invalidate: false }
    }
}

/// One optimistic patch applied on top of the last written value
struct Layer {
    id: u64,
    recipe: Recipe,
    /// Kept after its handle was dropped, until the next write replaces it
    committed: bool,
}

struct CacheEntry {
    /// Last value written by a fetch or upsert
    base: Snapshot,
    /// `base` with every layer applied in order
    data: Snapshot,
    layers: Vec<Layer>,
    replay: Option<Replay>,
    tags: Vec<Tag>,
    stale: bool,
    updated_at: Instant,
}

impl CacheEntry {
    fn rebuild(&mut self) {
        self.data = match self.replay {
            Some(replay) if !self.layers.is_empty() => {
                replay(&self.base, &self.layers).unwrap_or_else(|| self.base.clone())
            }
            _ => self.base.clone(),
        };
    }
}

fn replay<T: Clone + Send + Sync + 'static>(base: &Snapshot, layers: &[Layer]) -> Option<Snapshot> {
    let mut value = base.downcast_ref::<T>()?.clone();
    for layer in layers {
        (layer.recipe)(&mut value);
    }
    Some(Arc::new(value))
}

fn erase<T, F>(recipe: F) -> Recipe
where
    T: 'static,
    F: Fn(&mut T) + Send + Sync + 'static,
{
    Arc::new(move |value: &mut dyn Any| {
        if let Some(value) = value.downcast_mut::<T>() {
            recipe(value);
        }
    })
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
    events: broadcast::Sender<CacheEvent>,
    next_patch: AtomicU64,
    config: CacheConfig,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: CacheEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Key-addressed cache of query results.
///
/// Entries are written by queries, patched in place by optimistic updates
/// and marked stale by tag invalidation. Cloning is cheap and shares state.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                events,
                next_patch: AtomicU64::new(1),
                config,
            }),
        }
    }

    /// Subscribe to cache change events
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Return the cached result when fresh, otherwise fetch and store it
    pub async fn query<E: Endpoint>(
        &self,
        endpoint: &E,
        args: &E::Args,
        options: QueryOptions,
    ) -> Result<E::Output, E::Error> {
        let key = QueryKey::of::<E>(args);
        if !options.force_refetch {
            if let Some(hit) = self.fresh::<E>(&key) {
                debug!("Cache hit for {} {}", key.endpoint, key.key);
                return Ok(hit);
            }
        }

        debug!(
            "Fetching {} {} (forced: {})",
            key.endpoint, key.key, options.force_refetch
        );
        let output = endpoint.fetch(args).await?;
        let tags = E::provides_tags(args, &output);
        self.store(key.clone(), output.clone(), tags);
        self.inner.emit(CacheEvent::Fetched { key });
        Ok(output)
    }

    /// Cached result regardless of staleness
    pub fn read<E: Endpoint>(&self, args: &E::Args) -> Option<E::Output> {
        let key = QueryKey::of::<E>(args);
        let entries = self.inner.lock();
        entries
            .get(&key)
            .and_then(|entry| entry.data.downcast_ref::<E::Output>())
            .cloned()
    }

    /// Whether the cached entry would be refetched by the next query.
    /// `None` when nothing is cached.
    pub fn is_stale<E: Endpoint>(&self, args: &E::Args) -> Option<bool> {
        let key = QueryKey::of::<E>(args);
        let entries = self.inner.lock();
        entries.get(&key).map(|entry| self.entry_is_stale(entry))
    }

    /// Write a result directly, as if it had been fetched
    pub fn upsert_query_data<E: Endpoint>(&self, args: &E::Args, value: E::Output) {
        let key = QueryKey::of::<E>(args);
        let tags = E::provides_tags(args, &value);
        self.store(key, value, tags);
    }

    /// Mutate a cached result in place.
    ///
    /// The patch is kept as a layer over the last written value. Undoing it
    /// drops only that layer and replays the others, so overlapping patches
    /// can be undone in any order and a refetch that lands in between is not
    /// overwritten. Pending layers are replayed over refetched data; dropped
    /// (committed) handles are discarded by the next write. Patching a key
    /// with nothing cached does nothing and yields an inert handle.
    pub fn update_query_data<E, F>(&self, args: &E::Args, recipe: F) -> PatchHandle
    where
        E: Endpoint,
        F: Fn(&mut E::Output) + Send + Sync + 'static,
    {
        let key = QueryKey::of::<E>(args);
        let mut entries = self.inner.lock();

        let Some(entry) = entries.get_mut(&key) else {
            debug!("Nothing cached for {} {}, patch skipped", key.endpoint, key.key);
            return PatchHandle::inert(key);
        };
        let Some(current) = entry.data.downcast_ref::<E::Output>() else {
            warn!("Cached value for {} has an unexpected type", key.endpoint);
            return PatchHandle::inert(key);
        };

        let mut draft = current.clone();
        recipe(&mut draft);
        entry.data = Arc::new(draft);

        let id = self.inner.next_patch.fetch_add(1, Ordering::Relaxed);
        entry.layers.push(Layer {
            id,
            recipe: erase::<E::Output, F>(recipe),
            committed: false,
        });
        entry.replay = Some(replay::<E::Output>);
        drop(entries);

        self.inner.emit(CacheEvent::Patched { key: key.clone() });
        PatchHandle {
            cache: Arc::downgrade(&self.inner),
            key,
            id: Some(id),
        }
    }

    /// Mark every entry providing a matching tag as stale.
    /// Returns the keys that were marked.
    pub fn invalidate_tags(&self, tags: &[Tag]) -> Vec<QueryKey> {
        let mut entries = self.inner.lock();
        let mut keys = Vec::new();
        for (key, entry) in entries.iter_mut() {
            let hit = entry
                .tags
                .iter()
                .any(|provided| tags.iter().any(|tag| tag.matches(provided)));
            if hit {
                entry.stale = true;
                keys.push(key.clone());
            }
        }
        drop(entries);

        debug!(
            "Invalidated {} entries for tags [{}]",
            keys.len(),
            tags.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
        );
        self.inner.emit(CacheEvent::Invalidated {
            tags: tags.to_vec(),
            keys: keys.clone(),
        });
        keys
    }

    /// Run a mutation, invalidating its declared tags unless suppressed
    pub async fn mutate<M: Mutation>(
        &self,
        mutation: &M,
        args: &M::Args,
        options: MutateOptions,
    ) -> Result<M::Output, M::Error> {
        debug!("Running mutation {}", M::NAME);
        let output = mutation.execute(args).await?;
        if options.invalidate {
            let tags = M::invalidates_tags(args, &output);
            if !tags.is_empty() {
                self.invalidate_tags(&tags);
            }
        }
        Ok(output)
    }

    /// Drop one cached result
    pub fn remove<E: Endpoint>(&self, args: &E::Args) -> bool {
        let key = QueryKey::of::<E>(args);
        self.inner.lock().remove(&key).is_some()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fresh<E: Endpoint>(&self, key: &QueryKey) -> Option<E::Output> {
        let entries = self.inner.lock();
        let entry = entries.get(key)?;
        if self.entry_is_stale(entry) {
            return None;
        }
        entry.data.downcast_ref::<E::Output>().cloned()
    }

    fn entry_is_stale(&self, entry: &CacheEntry) -> bool {
        entry.stale
            || self
                .inner
                .config
                .stale_after
                .is_some_and(|max_age| entry.updated_at.elapsed() >= max_age)
    }

    fn store<T: Clone + Send + Sync + 'static>(&self, key: QueryKey, value: T, tags: Vec<Tag>) {
        let base: Snapshot = Arc::new(value);
        let mut entries = self.inner.lock();
        match entries.get_mut(&key) {
            Some(entry) => {
                entry.layers.retain(|layer| !layer.committed);
                entry.base = base;
                entry.tags = tags;
                entry.stale = false;
                entry.updated_at = Instant::now();
                if !entry.layers.is_empty() {
                    debug!(
                        "Replaying {} pending patches on {} {}",
                        entry.layers.len(),
                        key.endpoint,
                        key.key
                    );
                }
                entry.replay = Some(replay::<T>);
                entry.rebuild();
            }
            None => {
                entries.insert(
                    key,
                    CacheEntry {
                        data: base.clone(),
                        base,
                        layers: Vec::new(),
                        replay: None,
                        tags,
                        stale: false,
                        updated_at: Instant::now(),
                    },
                );
            }
        }
    }
}

/// Undo handle for one optimistic patch.
///
/// Dropping the handle (or calling [`PatchHandle::commit`]) keeps the patch
/// until fresh data is written for the entry.
#[must_use = "dropping a patch handle keeps the patch"]
pub struct PatchHandle {
    cache: Weak<Inner>,
    key: QueryKey,
    id: Option<u64>,
}

impl PatchHandle {
    fn inert(key: QueryKey) -> Self {
        Self {
            cache: Weak::new(),
            key,
            id: None,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Whether the patch actually changed a cached entry
    pub fn is_applied(&self) -> bool {
        self.id.is_some()
    }

    /// Keep the patch; the next write for the entry replaces it
    pub fn commit(mut self) {
        self.settle(false);
    }

    /// Remove this patch from the entry, keeping every other patch and any
    /// data written since
    pub fn undo(mut self) {
        self.settle(true);
    }

    fn settle(&mut self, revert: bool) {
        let Some(id) = self.id.take() else {
            return;
        };
        let Some(inner) = self.cache.upgrade() else {
            return;
        };

        let reverted = {
            let mut entries = inner.lock();
            let Some(entry) = entries.get_mut(&self.key) else {
                return;
            };
            let Some(position) = entry.layers.iter().position(|layer| layer.id == id) else {
                // Already replaced by a write
                return;
            };
            if revert {
                entry.layers.remove(position);
                entry.rebuild();
            } else {
                entry.layers[position].committed = true;
            }
            revert
        };

        if reverted {
            debug!("Reverted patch on {} {}", self.key.endpoint, self.key.key);
            inner.emit(CacheEvent::PatchUndone {
                key: self.key.clone(),
            });
        }
    }
}

impl Drop for PatchHandle {
    fn drop(&mut self) {
        self.settle(false);
    }
}
