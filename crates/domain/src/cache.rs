use std::cell::RefCell;
use std::collections::HashMap;

use crate::{ExerciseTemplate, StandardizedName, UserID};

/// In-process cache of resolved exercise templates, keyed by user and
/// standardized name.
///
/// Unsynchronized by design: the runtime model processes one callback at
/// a time (see the concurrency notes in the service module). Entries are
/// kept for the lifetime of the owning service; there is no eviction.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: RefCell<HashMap<(UserID, StandardizedName), ExerciseTemplate>>,
}

impl TemplateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, user_id: &UserID, name: &StandardizedName) -> Option<ExerciseTemplate> {
        self.entries
            .borrow()
            .get(&(user_id.clone(), name.clone()))
            .cloned()
    }

    pub fn insert(&self, template: ExerciseTemplate) {
        self.entries.borrow_mut().insert(
            (template.user_id.clone(), template.standardized_name.clone()),
            template,
        );
    }

    pub fn invalidate(&self, user_id: &UserID, name: &StandardizedName) {
        self.entries
            .borrow_mut()
            .remove(&(user_id.clone(), name.clone()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use crate::TemplateID;

    use super::*;

    fn template(name: &str) -> ExerciseTemplate {
        ExerciseTemplate {
            id: TemplateID::from("t1"),
            name: name.to_string(),
            standardized_name: StandardizedName::new(name),
            category: String::from("Other"),
            default_sets: vec![],
            created_at: Utc::now(),
            user_id: UserID::from("alice"),
        }
    }

    #[test]
    fn test_template_cache_insert_and_get() {
        let cache = TemplateCache::new();
        let user_id = UserID::from("alice");
        let name = StandardizedName::new("Bench-Press");
        assert_eq!(cache.get(&user_id, &name), None);

        cache.insert(template("Bench Press"));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get(&user_id, &name).map(|t| t.id),
            Some(TemplateID::from("t1"))
        );
    }

    #[test]
    fn test_template_cache_scoped_by_user() {
        let cache = TemplateCache::new();
        cache.insert(template("Bench Press"));
        assert_eq!(
            cache.get(&UserID::from("bob"), &StandardizedName::new("bench press")),
            None
        );
    }

    #[test]
    fn test_template_cache_invalidate() {
        let cache = TemplateCache::new();
        let user_id = UserID::from("alice");
        let name = StandardizedName::new("bench press");
        cache.insert(template("Bench Press"));
        cache.invalidate(&user_id, &name);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&user_id, &name), None);
    }
}
