//! Wire models.
//!
//! The camelCase field names are the contract shared with every other
//! client of the store; the structs define the complete set of accepted
//! fields and unknown fields are ignored rather than merged through.

use chrono::{DateTime, Utc};
use liftlog_domain as domain;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::Document;

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, domain::StorageError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(document)) => Ok(document),
        Ok(_) => Err(domain::StorageError::InvalidDocument(String::from(
            "expected an object",
        ))),
        Err(err) => Err(invalid(err)),
    }
}

pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, domain::StorageError> {
    serde_json::from_value(serde_json::Value::Object(document)).map_err(invalid)
}

fn invalid(err: impl std::fmt::Display) -> domain::StorageError {
    domain::StorageError::InvalidDocument(err.to_string())
}

fn other_category() -> String {
    String::from("Other")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDoc {
    pub name: String,
    pub standardized_name: String,
    #[serde(default = "other_category")]
    pub category: String,
    #[serde(default)]
    pub default_sets: Vec<SetTemplateDoc>,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

impl TemplateDoc {
    #[must_use]
    pub fn from_new(template: &domain::NewExerciseTemplate, user_id: &domain::UserID) -> Self {
        Self {
            name: template.name.clone(),
            standardized_name: template.standardized_name.to_string(),
            category: template.category.clone(),
            default_sets: template
                .default_sets
                .iter()
                .map(SetTemplateDoc::from_domain)
                .collect(),
            created_at: template.created_at,
            user_id: user_id.to_string(),
        }
    }

    pub fn into_template(
        self,
        id: domain::TemplateID,
    ) -> Result<domain::ExerciseTemplate, domain::StorageError> {
        Ok(domain::ExerciseTemplate {
            id,
            standardized_name: domain::StandardizedName::new(&self.standardized_name),
            name: self.name,
            category: self.category,
            default_sets: self
                .default_sets
                .into_iter()
                .map(SetTemplateDoc::into_domain)
                .collect::<Result<_, _>>()?,
            created_at: self.created_at,
            user_id: domain::UserID::from(self.user_id),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetTemplateDoc {
    pub reps: Option<u32>,
    pub weight: Option<f32>,
    pub rir: Option<u8>,
}

impl SetTemplateDoc {
    fn from_domain(set: &domain::SetTemplate) -> Self {
        Self {
            reps: set.reps.map(u32::from),
            weight: set.weight.map(f32::from),
            rir: set.rir.map(u8::from),
        }
    }

    fn into_domain(self) -> Result<domain::SetTemplate, domain::StorageError> {
        Ok(domain::SetTemplate {
            reps: self.reps.map(domain::Reps::new).transpose().map_err(invalid)?,
            weight: self
                .weight
                .map(domain::Weight::new)
                .transpose()
                .map_err(invalid)?,
            rir: self.rir.map(domain::Rir::new).transpose().map_err(invalid)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDoc {
    pub user_id: String,
    pub program_id: String,
    pub workout_id: Uuid,
    pub workout_template_id: Uuid,
    pub name: String,
    pub week: u32,
    #[serde(default)]
    pub exercises: Vec<ExerciseDoc>,
    #[serde(default)]
    pub notes: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl SessionDoc {
    #[must_use]
    pub fn from_domain(session: &domain::Session) -> Self {
        Self {
            user_id: session.user_id.to_string(),
            program_id: session.program_id.to_string(),
            workout_id: *session.workout_id,
            workout_template_id: *session.workout_template_id,
            name: session.name.clone(),
            week: session.week.into(),
            exercises: session
                .exercises
                .iter()
                .map(ExerciseDoc::from_domain)
                .collect(),
            notes: session.notes.clone(),
            timestamp: session.timestamp,
        }
    }

    pub fn into_domain(self) -> Result<domain::Session, domain::StorageError> {
        Ok(domain::Session {
            user_id: domain::UserID::from(self.user_id),
            program_id: domain::ProgramID::from(self.program_id),
            workout_id: self.workout_id.into(),
            workout_template_id: self.workout_template_id.into(),
            name: self.name,
            week: domain::Week::new(self.week).map_err(invalid)?,
            exercises: self
                .exercises
                .into_iter()
                .map(ExerciseDoc::into_domain)
                .collect::<Result<_, _>>()?,
            notes: self.notes,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDoc {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sets: Vec<SetDoc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ExerciseDoc {
    #[must_use]
    pub fn from_domain(exercise: &domain::Exercise) -> Self {
        Self {
            id: *exercise.id,
            template_id: exercise.template_id.as_ref().map(ToString::to_string),
            name: exercise.name.clone(),
            sets: exercise.sets.iter().map(SetDoc::from_domain).collect(),
            notes: exercise.notes.clone(),
            category: exercise.category.clone(),
        }
    }

    pub fn into_domain(self) -> Result<domain::Exercise, domain::StorageError> {
        Ok(domain::Exercise {
            id: self.id.into(),
            template_id: self.template_id.map(domain::TemplateID::from),
            name: self.name,
            sets: self
                .sets
                .into_iter()
                .map(SetDoc::into_domain)
                .collect::<Result<_, _>>()?,
            notes: self.notes,
            category: self.category,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDoc {
    pub reps: Option<u32>,
    pub weight: Option<f32>,
    pub rir: Option<u8>,
    #[serde(default)]
    pub complete: bool,
}

impl SetDoc {
    fn from_domain(set: &domain::ExerciseSet) -> Self {
        Self {
            reps: set.reps.map(u32::from),
            weight: set.weight.map(f32::from),
            rir: set.rir.map(u8::from),
            complete: set.complete,
        }
    }

    fn into_domain(self) -> Result<domain::ExerciseSet, domain::StorageError> {
        Ok(domain::ExerciseSet {
            reps: self.reps.map(domain::Reps::new).transpose().map_err(invalid)?,
            weight: self
                .weight
                .map(domain::Weight::new)
                .transpose()
                .map_err(invalid)?,
            rir: self.rir.map(domain::Rir::new).transpose().map_err(invalid)?,
            complete: self.complete,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDoc {
    pub id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    pub week: u32,
    #[serde(default)]
    pub exercises: Vec<ExerciseDoc>,
}

impl WorkoutDoc {
    #[must_use]
    pub fn from_domain(workout: &domain::Workout) -> Self {
        Self {
            id: *workout.id,
            template_id: *workout.template_id,
            name: workout.name.clone(),
            week: workout.week.into(),
            exercises: workout
                .exercises
                .iter()
                .map(ExerciseDoc::from_domain)
                .collect(),
        }
    }

    pub fn into_domain(self) -> Result<domain::Workout, domain::StorageError> {
        Ok(domain::Workout {
            id: self.id.into(),
            template_id: self.template_id.into(),
            name: self.name,
            week: domain::Week::new(self.week).map_err(invalid)?,
            exercises: self
                .exercises
                .into_iter()
                .map(ExerciseDoc::into_domain)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDoc {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration: u32,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub workouts: Vec<WorkoutDoc>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl ProgramDoc {
    #[must_use]
    pub fn from_draft(draft: &domain::ProgramDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            duration: draft.duration.into(),
            difficulty: draft.difficulty.clone(),
            workouts: draft.workouts.iter().map(WorkoutDoc::from_domain).collect(),
            created_by: draft.created_by.to_string(),
            created_at: draft.created_at,
        }
    }

    pub fn into_domain(
        self,
        id: domain::ProgramID,
    ) -> Result<domain::Program, domain::StorageError> {
        Ok(domain::Program {
            id,
            name: self.name,
            description: self.description,
            duration: domain::WeekCount::from(self.duration),
            difficulty: self.difficulty,
            workouts: self
                .workouts
                .into_iter()
                .map(WorkoutDoc::into_domain)
                .collect::<Result<_, _>>()?,
            created_by: domain::UserID::from(self.created_by),
            created_at: self.created_at,
        })
    }
}
