//! Shared object caches: details and relations.
//!
//! Both stores are built once per process and handed to every open editor.
//! Cloning a store clones the handle, not the data. Each store sits behind a
//! single `parking_lot::Mutex`, so every operation is atomic with respect to
//! the others and readers never observe a half-applied merge.
//!
//! The map itself is held in an `Arc` and copied on write: a snapshot is a
//! reference-count bump, and a write only copies the map while some render
//! still holds an older snapshot.
//!
//! Entries for objects a newly opened document does not reference are simply
//! unused; nothing is purged unless [`DetailsStore::clear`] is called.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use folio_render::{DetailsSnapshot, RelationsSnapshot};
use folio_types::{ObjectDetails, ObjectId, Relation, RelationKey};

// ── Details ─────────────────────────────────────────────────────────────────

/// Per-object field bags (name, icon, cover, layout, flags).
#[derive(Clone, Debug, Default)]
pub struct DetailsStore {
    inner: Arc<Mutex<Arc<DetailsSnapshot>>>,
}

impl DetailsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write<R>(&self, f: impl FnOnce(&mut DetailsSnapshot) -> R) -> R {
        let mut guard = self.inner.lock();
        f(Arc::make_mut(&mut *guard))
    }

    pub fn get(&self, id: &ObjectId) -> Option<ObjectDetails> {
        self.inner.lock().get(id).cloned()
    }

    /// Replace the details of `id` wholesale.
    pub fn set(&self, id: ObjectId, details: ObjectDetails) {
        self.write(|map| map.insert(id, details));
    }

    /// Merge keys into the details of `id`, creating the entry if needed.
    pub fn merge(&self, id: ObjectId, details: &ObjectDetails) {
        self.write(|map| map.entry(id).or_default().merge(details));
    }

    /// Merge a batch of objects under one lock.
    pub fn merge_all<'a>(&self, batch: impl IntoIterator<Item = (&'a ObjectId, &'a ObjectDetails)>) {
        self.write(|map| {
            for (id, details) in batch {
                map.entry(id.clone()).or_default().merge(details);
            }
        });
    }

    /// Drop `keys` from the details of `id`. Unknown ids are ignored.
    pub fn unset<S: AsRef<str>>(&self, id: &ObjectId, keys: &[S]) {
        let mut guard = self.inner.lock();
        if !guard.contains_key(id) {
            return;
        }
        if let Some(details) = Arc::make_mut(&mut *guard).get_mut(id) {
            details.unset(keys);
        }
    }

    pub fn remove(&self, id: &ObjectId) -> Option<ObjectDetails> {
        let mut guard = self.inner.lock();
        if !guard.contains_key(id) {
            return None;
        }
        Arc::make_mut(&mut *guard).remove(id)
    }

    pub fn clear(&self) {
        *self.inner.lock() = Arc::default();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Point-in-time view for rendering. Later writes do not show through.
    pub fn snapshot(&self) -> Arc<DetailsSnapshot> {
        Arc::clone(&*self.inner.lock())
    }
}

// ── Relations ───────────────────────────────────────────────────────────────

/// Relation definitions keyed by relation key.
#[derive(Clone, Debug, Default)]
pub struct RelationStore {
    inner: Arc<Mutex<Arc<RelationsSnapshot>>>,
}

impl RelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write<R>(&self, f: impl FnOnce(&mut RelationsSnapshot) -> R) -> R {
        let mut guard = self.inner.lock();
        f(Arc::make_mut(&mut *guard))
    }

    pub fn get_by_key(&self, key: &RelationKey) -> Option<Relation> {
        self.inner.lock().get(key).cloned()
    }

    /// Every known relation, ordered by key.
    pub fn get_all(&self) -> Vec<Relation> {
        let mut all: Vec<Relation> = self.inner.lock().values().cloned().collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }

    /// Replace the whole store with `relations`.
    pub fn set(&self, relations: impl IntoIterator<Item = Relation>) {
        let next: HashMap<_, _> = relations.into_iter().map(|r| (r.key.clone(), r)).collect();
        *self.inner.lock() = Arc::new(next);
    }

    /// Insert or overwrite the given definitions, keeping the rest.
    pub fn merge(&self, relations: impl IntoIterator<Item = Relation>) {
        self.write(|map| {
            for relation in relations {
                map.insert(relation.key.clone(), relation);
            }
        });
    }

    pub fn remove(&self, keys: &[RelationKey]) {
        self.write(|map| {
            for key in keys {
                map.remove(key);
            }
        });
    }

    pub fn clear(&self) {
        *self.inner.lock() = Arc::default();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn snapshot(&self) -> Arc<RelationsSnapshot> {
        Arc::clone(&*self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::{RelationFormat, keys};

    #[test]
    fn test_merge_keeps_existing_keys() {
        let store = DetailsStore::new();
        let id = ObjectId::new("page");
        store.set(id.clone(), ObjectDetails::new().with(keys::NAME, "Old").with(keys::ICON_EMOJI, "📄"));
        store.merge(id.clone(), &ObjectDetails::new().with(keys::NAME, "New"));

        let details = store.get(&id).unwrap();
        assert_eq!(details.name(), Some("New"));
        assert_eq!(details.icon_emoji(), Some("📄"));
    }

    #[test]
    fn test_merge_creates_missing_entry() {
        let store = DetailsStore::new();
        let id = ObjectId::new("fresh");
        store.merge(id.clone(), &ObjectDetails::new().with(keys::NAME, "Fresh"));
        assert_eq!(store.get(&id).unwrap().name(), Some("Fresh"));
    }

    #[test]
    fn test_unset_and_remove() {
        let store = DetailsStore::new();
        let id = ObjectId::new("page");
        store.set(id.clone(), ObjectDetails::new().with(keys::NAME, "P").with(keys::IS_ARCHIVED, true));
        store.unset(&id, &[keys::IS_ARCHIVED]);
        assert!(!store.get(&id).unwrap().is_archived());

        store.unset(&ObjectId::new("ghost"), &[keys::NAME]);
        assert_eq!(store.len(), 1);

        assert!(store.remove(&id).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let store = DetailsStore::new();
        let other = store.clone();
        other.set(ObjectId::new("a"), ObjectDetails::new());
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = DetailsStore::new();
        store.set(ObjectId::new("a"), ObjectDetails::new());
        let snapshot = store.snapshot();
        store.clear();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_snapshot_shares_map_until_write() {
        let store = DetailsStore::new();
        store.set(ObjectId::new("a"), ObjectDetails::new().with(keys::NAME, "A"));

        let first = store.snapshot();
        let second = store.snapshot();
        assert!(Arc::ptr_eq(&first, &second));

        store.merge(ObjectId::new("a"), &ObjectDetails::new().with(keys::NAME, "B"));
        let third = store.snapshot();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first[&ObjectId::new("a")].name(), Some("A"));
        assert_eq!(third[&ObjectId::new("a")].name(), Some("B"));
    }

    #[test]
    fn test_relation_snapshot_survives_writes() {
        let store = RelationStore::new();
        store.set([Relation::new("tag", "Tag", RelationFormat::Tag)]);
        let before = store.snapshot();
        assert!(Arc::ptr_eq(&before, &store.snapshot()));

        store.merge([Relation::new("done", "Done", RelationFormat::Checkbox)]);
        store.remove(&[RelationKey::new("tag")]);

        assert_eq!(before.len(), 1);
        assert!(before.contains_key(&RelationKey::new("tag")));
        assert_eq!(store.get_all().len(), 1);
        assert!(store.get_by_key(&RelationKey::new("done")).is_some());
    }

    #[test]
    fn test_relation_store_merge_set_remove() {
        let store = RelationStore::new();
        store.set([
            Relation::new("status", "Status", RelationFormat::Status),
            Relation::new("tag", "Tag", RelationFormat::Tag),
        ]);
        store.merge([Relation::new("status", "State", RelationFormat::Status)]);

        assert_eq!(store.get_by_key(&RelationKey::new("status")).unwrap().name, "State");
        assert_eq!(store.len(), 2);

        store.remove(&[RelationKey::new("tag")]);
        let keys: Vec<_> = store.get_all().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![RelationKey::new("status")]);

        store.set([Relation::new("done", "Done", RelationFormat::Checkbox)]);
        assert!(store.get_by_key(&RelationKey::new("status")).is_none());
    }
}
