use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use derive_more::{AsRef, Display};

use crate::{
    CreateError, Exercise, ExerciseSet, ReadError, Reps, Rir, StandardizedName, UpdateError,
    UserID, Weight,
};

#[allow(async_fn_in_trait)]
pub trait ExerciseTemplateRepository {
    async fn read_template(
        &self,
        user_id: &UserID,
        id: &TemplateID,
    ) -> Result<Option<ExerciseTemplate>, ReadError>;
    async fn read_templates(&self, user_id: &UserID)
    -> Result<Vec<ExerciseTemplate>, ReadError>;
    async fn find_templates_by_name(
        &self,
        user_id: &UserID,
        name: &StandardizedName,
    ) -> Result<Vec<ExerciseTemplate>, ReadError>;
    async fn create_template(
        &self,
        user_id: &UserID,
        template: NewExerciseTemplate,
    ) -> Result<ExerciseTemplate, CreateError>;
    async fn modify_template(
        &self,
        user_id: &UserID,
        id: &TemplateID,
        name: Option<String>,
        standardized_name: Option<StandardizedName>,
        category: Option<String>,
        default_sets: Option<Vec<SetTemplate>>,
    ) -> Result<ExerciseTemplate, UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait TemplateService {
    /// Resolve the template for an exercise without ever creating one.
    ///
    /// Lookup order: cache by standardized name, then the exercise's own
    /// template id, then a name search against the store. A failed id
    /// verification falls through to the name search.
    async fn get_template(
        &self,
        user_id: &UserID,
        exercise: &Exercise,
    ) -> Result<Option<ExerciseTemplate>, ReadError>;
    async fn get_template_by_id(
        &self,
        user_id: &UserID,
        id: &TemplateID,
    ) -> Result<Option<ExerciseTemplate>, ReadError>;
    async fn get_exercise_templates(
        &self,
        user_id: &UserID,
    ) -> Result<Vec<ExerciseTemplate>, ReadError>;
    /// Full listing grouped by category for selection UIs. Advisory read:
    /// failures degrade to an empty map.
    async fn templates_by_category(
        &self,
        user_id: &UserID,
    ) -> BTreeMap<String, Vec<ExerciseTemplate>>;
    async fn create_template(
        &self,
        user_id: &UserID,
        exercise: &Exercise,
    ) -> Result<ExerciseTemplate, CreateError>;
    /// The only entry point that guarantees a template exists afterwards.
    async fn get_or_create_template(
        &self,
        user_id: &UserID,
        exercise: &Exercise,
    ) -> Result<ExerciseTemplate, CreateError>;
    async fn update_template(
        &self,
        user_id: &UserID,
        id: &TemplateID,
        name: Option<String>,
        category: Option<String>,
        default_sets: Option<Vec<SetTemplate>>,
    ) -> Result<ExerciseTemplate, UpdateError>;
    /// Ensure every exercise carries a template id. With `create_if_missing`
    /// templates are created on demand (save path); without it unresolvable
    /// exercises are passed through unchanged (load path).
    async fn resolve_exercise_templates(
        &self,
        user_id: &UserID,
        exercises: &[Exercise],
        create_if_missing: bool,
    ) -> Result<Vec<Exercise>, CreateError>;
    /// Copies for "carry to next week": fresh instance ids, same template
    /// ids. Template resolution failures are logged and skipped.
    async fn copy_exercises(
        &self,
        user_id: &UserID,
        exercises: &[Exercise],
        create_if_missing: bool,
    ) -> Vec<Exercise>;
}

/// Durable per-user identity for a named exercise, independent of any
/// specific week's instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseTemplate {
    pub id: TemplateID,
    pub name: String,
    pub standardized_name: StandardizedName,
    pub category: String,
    pub default_sets: Vec<SetTemplate>,
    pub created_at: DateTime<Utc>,
    pub user_id: UserID,
}

/// Store-assigned opaque identifier.
#[derive(AsRef, Debug, Display, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TemplateID(String);

impl From<&str> for TemplateID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TemplateID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExerciseTemplate {
    pub name: String,
    pub standardized_name: StandardizedName,
    pub category: String,
    pub default_sets: Vec<SetTemplate>,
    pub created_at: DateTime<Utc>,
}

impl NewExerciseTemplate {
    #[must_use]
    pub fn into_template(self, id: TemplateID, user_id: UserID) -> ExerciseTemplate {
        ExerciseTemplate {
            id,
            name: self.name,
            standardized_name: self.standardized_name,
            category: self.category,
            default_sets: self.default_sets,
            created_at: self.created_at,
            user_id,
        }
    }
}

/// One entry of a template's default set scheme.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SetTemplate {
    pub reps: Option<Reps>,
    pub weight: Option<Weight>,
    pub rir: Option<Rir>,
}

impl From<&ExerciseSet> for SetTemplate {
    fn from(set: &ExerciseSet) -> Self {
        Self {
            reps: set.reps,
            weight: set.weight,
            rir: set.rir,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_new_exercise_template_into_template() {
        let created_at = Utc::now();
        let template = NewExerciseTemplate {
            name: String::from("Bench Press"),
            standardized_name: StandardizedName::new("Bench Press"),
            category: String::from("Push"),
            default_sets: vec![SetTemplate::default()],
            created_at,
        }
        .into_template(TemplateID::from("t1"), UserID::from("alice"));
        assert_eq!(template.id, TemplateID::from("t1"));
        assert_eq!(template.user_id, UserID::from("alice"));
        assert_eq!(template.standardized_name, StandardizedName::new("bench press"));
        assert_eq!(template.created_at, created_at);
    }

    #[test]
    fn test_set_template_from_exercise_set() {
        let set = ExerciseSet {
            reps: Some(Reps::new(8).unwrap()),
            weight: Some(Weight::new(60.0).unwrap()),
            rir: Some(Rir::new(1).unwrap()),
            complete: true,
        };
        assert_eq!(
            SetTemplate::from(&set),
            SetTemplate {
                reps: Some(Reps::new(8).unwrap()),
                weight: Some(Weight::new(60.0).unwrap()),
                rir: Some(Rir::new(1).unwrap()),
            }
        );
    }
}
