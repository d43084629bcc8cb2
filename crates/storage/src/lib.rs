#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use liftlog_domain::{StorageError, UserID};
use serde_json::Value;

pub mod memory;
pub mod models;
pub mod repository;
pub mod rest;

/// A stored document: named fields with JSON values.
pub type Document = serde_json::Map<String, Value>;

/// Addressable collections of the document store. Exercise templates
/// live in a per-user subcollection; sessions and programs are global
/// collections carrying the owning user in a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    ExerciseTemplates(UserID),
    Sessions,
    Programs,
}

impl Collection {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Collection::ExerciseTemplates(user_id) => {
                format!("users/{user_id}/exerciseTemplates")
            }
            Collection::Sessions => String::from("sessions"),
            Collection::Programs => String::from("programs"),
        }
    }
}

/// The narrow contract the repositories require from a document
/// database. Any key-value or document store satisfies it.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn get_by_id(
        &self,
        collection: &Collection,
        id: &str,
    ) -> Result<Option<Document>, StorageError>;
    /// Single-field equality query returning matching documents with
    /// their ids. Further predicates are applied by the caller.
    async fn query_equals(
        &self,
        collection: &Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Document)>, StorageError>;
    async fn create(&self, collection: &Collection, data: Document)
    -> Result<String, StorageError>;
    /// Write a document at a caller-chosen id. Fields absent from `data`
    /// are preserved; the document is created if it does not exist.
    async fn set_merge(
        &self,
        collection: &Collection,
        id: &str,
        data: Document,
    ) -> Result<(), StorageError>;
    /// Partial update of an existing document. Fails with
    /// [`StorageError::NotFound`] if the document does not exist.
    async fn update_merge(
        &self,
        collection: &Collection,
        id: &str,
        data: Document,
    ) -> Result<(), StorageError>;
    async fn delete(&self, collection: &Collection, id: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(
        Collection::ExerciseTemplates(UserID::from("alice")),
        "users/alice/exerciseTemplates"
    )]
    #[case(Collection::Sessions, "sessions")]
    #[case(Collection::Programs, "programs")]
    fn test_collection_path(#[case] collection: Collection, #[case] expected: &str) {
        assert_eq!(collection.path(), expected);
    }
}
