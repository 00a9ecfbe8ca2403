//! Documents and the concurrent map that holds them.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::http::date::truncate_to_seconds;

/// One stored text document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub path: String,
    pub content: String,
    pub revision: u64,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone)]
enum Slot {
    Live(Document),
    Gone,
}

/// Concurrent path → document map with tombstones.
#[derive(Debug, Default)]
pub struct DocumentStore {
    slots: DashMap<String, Slot>,
    revisions: AtomicU64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Document> {
        match self.slots.get(path).as_deref() {
            Some(Slot::Live(doc)) => Some(doc.clone()),
            _ => None,
        }
    }

    /// Whether `path` held a document that has since been deleted.
    pub fn was_deleted(&self, path: &str) -> bool {
        matches!(self.slots.get(path).as_deref(), Some(Slot::Gone))
    }

    /// Create or replace a document. Returns the stored version.
    pub fn put(&self, path: &str, content: impl Into<String>) -> Document {
        let doc = Document {
            path: path.to_string(),
            content: content.into(),
            revision: self.revisions.fetch_add(1, Ordering::Relaxed) + 1,
            modified: truncate_to_seconds(Utc::now()),
        };
        self.slots.insert(path.to_string(), Slot::Live(doc.clone()));
        tracing::debug!(path, revision = doc.revision, "Document stored");
        doc
    }

    /// Delete a live document, leaving a tombstone. `false` if there was none.
    pub fn delete(&self, path: &str) -> bool {
        match self.slots.get_mut(path) {
            Some(mut slot) if matches!(*slot, Slot::Live(_)) => {
                *slot = Slot::Gone;
                tracing::debug!(path, "Document deleted");
                true
            }
            _ => false,
        }
    }

    /// Live documents directly under the collection `prefix`, sorted by path.
    pub fn list(&self, prefix: &str) -> Vec<Document> {
        let mut docs: Vec<Document> = self
            .slots
            .iter()
            .filter_map(|entry| match entry.value() {
                Slot::Live(doc) if is_child(prefix, &doc.path) => Some(doc.clone()),
                _ => None,
            })
            .collect();
        docs.sort_by(|a, b| a.path.cmp(&b.path));
        docs
    }

    /// Number of live documents.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| matches!(entry.value(), Slot::Live(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_child(prefix: &str, path: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_bumps_revision() {
        let store = DocumentStore::new();
        let first = store.put("/a", "one");
        let second = store.put("/a", "two");
        assert!(second.revision > first.revision);
        assert_eq!(store.get("/a").unwrap().content, "two");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_leaves_tombstone() {
        let store = DocumentStore::new();
        store.put("/a", "one");
        assert!(store.delete("/a"));
        assert!(!store.delete("/a"));
        assert!(store.get("/a").is_none());
        assert!(store.was_deleted("/a"));
        assert!(!store.was_deleted("/b"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_revisions_survive_recreate() {
        let store = DocumentStore::new();
        let before = store.put("/a", "x");
        store.delete("/a");
        let after = store.put("/a", "x");
        assert_ne!(before.revision, after.revision);
        assert!(!store.was_deleted("/a"));
    }

    #[test]
    fn test_list_direct_children() {
        let store = DocumentStore::new();
        store.put("/notes/b", "2");
        store.put("/notes/a", "1");
        store.put("/notes/deep/c", "3");
        store.put("/other/d", "4");
        let paths: Vec<_> = store.list("/notes/").into_iter().map(|d| d.path).collect();
        assert_eq!(paths, vec!["/notes/a", "/notes/b"]);
    }
}
