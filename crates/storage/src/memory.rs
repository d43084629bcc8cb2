//! In-memory document store.
//!
//! Implements the same merge-write semantics as the hosted backend and
//! runs entirely in-process. Used as the offline store and as the test
//! double for everything built on [`DocumentStore`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use liftlog_domain::StorageError;
use serde_json::Value;

use crate::{Collection, Document, DocumentStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RefCell<BTreeMap<String, BTreeMap<String, Document>>>,
    next_id: Cell<u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn merge(target: &mut Document, data: Document) {
        for (field, value) in data {
            target.insert(field, value);
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn get_by_id(
        &self,
        collection: &Collection,
        id: &str,
    ) -> Result<Option<Document>, StorageError> {
        Ok(self
            .collections
            .borrow()
            .get(&collection.path())
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn query_equals(
        &self,
        collection: &Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Document)>, StorageError> {
        Ok(self
            .collections
            .borrow()
            .get(&collection.path())
            .map(|documents| {
                documents
                    .iter()
                    .filter(|(_, document)| document.get(field) == Some(value))
                    .map(|(id, document)| (id.clone(), document.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(
        &self,
        collection: &Collection,
        data: Document,
    ) -> Result<String, StorageError> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let id = format!("doc{id:04}");
        self.collections
            .borrow_mut()
            .entry(collection.path())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn set_merge(
        &self,
        collection: &Collection,
        id: &str,
        data: Document,
    ) -> Result<(), StorageError> {
        let mut collections = self.collections.borrow_mut();
        let documents = collections.entry(collection.path()).or_default();
        match documents.get_mut(id) {
            Some(existing) => Self::merge(existing, data),
            None => {
                documents.insert(id.to_string(), data);
            }
        }
        Ok(())
    }

    async fn update_merge(
        &self,
        collection: &Collection,
        id: &str,
        data: Document,
    ) -> Result<(), StorageError> {
        let mut collections = self.collections.borrow_mut();
        let existing = collections
            .get_mut(&collection.path())
            .and_then(|documents| documents.get_mut(id))
            .ok_or(StorageError::NotFound)?;
        Self::merge(existing, data);
        Ok(())
    }

    async fn delete(&self, collection: &Collection, id: &str) -> Result<(), StorageError> {
        if let Some(documents) = self.collections.borrow_mut().get_mut(&collection.path()) {
            documents.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(document) => document,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let store = MemoryStore::new();
        let first = store
            .create(&Collection::Sessions, Document::new())
            .await
            .unwrap();
        let second = store
            .create(&Collection::Sessions, Document::new())
            .await
            .unwrap();
        assert_ne!(first, second);
        assert!(
            store
                .get_by_id(&Collection::Sessions, &first)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_get_by_id_missing() {
        let store = MemoryStore::new();
        assert_eq!(
            store.get_by_id(&Collection::Sessions, "missing").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_set_merge_preserves_absent_fields() {
        let store = MemoryStore::new();
        store
            .set_merge(
                &Collection::Sessions,
                "s1",
                document(json!({"notes": "Felt strong today!", "week": 2})),
            )
            .await
            .unwrap();
        store
            .set_merge(
                &Collection::Sessions,
                "s1",
                document(json!({"week": 3})),
            )
            .await
            .unwrap();
        assert_eq!(
            store.get_by_id(&Collection::Sessions, "s1").await.unwrap(),
            Some(document(json!({"notes": "Felt strong today!", "week": 3})))
        );
    }

    #[tokio::test]
    async fn test_update_merge_requires_existing_document() {
        let store = MemoryStore::new();
        assert!(matches!(
            store
                .update_merge(&Collection::Programs, "missing", Document::new())
                .await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_merge_patches() {
        let store = MemoryStore::new();
        store
            .set_merge(
                &Collection::Programs,
                "p1",
                document(json!({"name": "Strength Block", "difficulty": "Beginner"})),
            )
            .await
            .unwrap();
        store
            .update_merge(
                &Collection::Programs,
                "p1",
                document(json!({"difficulty": "Intermediate"})),
            )
            .await
            .unwrap();
        assert_eq!(
            store.get_by_id(&Collection::Programs, "p1").await.unwrap(),
            Some(document(
                json!({"name": "Strength Block", "difficulty": "Intermediate"})
            ))
        );
    }

    #[tokio::test]
    async fn test_query_equals() {
        let store = MemoryStore::new();
        store
            .set_merge(
                &Collection::Sessions,
                "s1",
                document(json!({"workoutTemplateId": "a", "week": 1})),
            )
            .await
            .unwrap();
        store
            .set_merge(
                &Collection::Sessions,
                "s2",
                document(json!({"workoutTemplateId": "b", "week": 1})),
            )
            .await
            .unwrap();
        let matches = store
            .query_equals(&Collection::Sessions, "workoutTemplateId", &json!("a"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, "s1");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store
            .set_merge(&Collection::Programs, "p1", Document::new())
            .await
            .unwrap();
        store.delete(&Collection::Programs, "p1").await.unwrap();
        assert_eq!(
            store.get_by_id(&Collection::Programs, "p1").await.unwrap(),
            None
        );
        store.delete(&Collection::Programs, "p1").await.unwrap();
    }
}
