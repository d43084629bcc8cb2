//! Repositories over a document store.
//!
//! One adapter implements every domain repository trait by mapping the
//! domain operations onto the narrow [`DocumentStore`] contract.

use liftlog_domain as domain;
use serde_json::Value;

use crate::models::{
    ProgramDoc, SessionDoc, SetTemplateDoc, TemplateDoc, WorkoutDoc, from_document, to_document,
};
use crate::{Collection, Document, DocumentStore};

pub struct DocumentRepository<S> {
    store: S,
}

impl<S> DocumentRepository<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

fn map_update_error(err: domain::StorageError) -> domain::UpdateError {
    match err {
        domain::StorageError::NotFound => domain::UpdateError::NotFound,
        err => domain::UpdateError::Storage(err),
    }
}

impl<S: DocumentStore> domain::ExerciseTemplateRepository for DocumentRepository<S> {
    async fn read_template(
        &self,
        user_id: &domain::UserID,
        id: &domain::TemplateID,
    ) -> Result<Option<domain::ExerciseTemplate>, domain::ReadError> {
        let collection = Collection::ExerciseTemplates(user_id.clone());
        let Some(document) = self.store.get_by_id(&collection, id.as_ref()).await? else {
            return Ok(None);
        };
        let template = from_document::<TemplateDoc>(document)?.into_template(id.clone())?;
        Ok(Some(template))
    }

    async fn read_templates(
        &self,
        user_id: &domain::UserID,
    ) -> Result<Vec<domain::ExerciseTemplate>, domain::ReadError> {
        let collection = Collection::ExerciseTemplates(user_id.clone());
        let documents = self
            .store
            .query_equals(&collection, "userId", &Value::String(user_id.to_string()))
            .await?;
        documents
            .into_iter()
            .map(|(id, document)| {
                Ok(from_document::<TemplateDoc>(document)?
                    .into_template(domain::TemplateID::from(id))?)
            })
            .collect()
    }

    async fn find_templates_by_name(
        &self,
        user_id: &domain::UserID,
        name: &domain::StandardizedName,
    ) -> Result<Vec<domain::ExerciseTemplate>, domain::ReadError> {
        let collection = Collection::ExerciseTemplates(user_id.clone());
        let documents = self
            .store
            .query_equals(
                &collection,
                "standardizedName",
                &Value::String(name.to_string()),
            )
            .await?;
        documents
            .into_iter()
            .map(|(id, document)| {
                Ok(from_document::<TemplateDoc>(document)?
                    .into_template(domain::TemplateID::from(id))?)
            })
            .collect()
    }

    async fn create_template(
        &self,
        user_id: &domain::UserID,
        template: domain::NewExerciseTemplate,
    ) -> Result<domain::ExerciseTemplate, domain::CreateError> {
        let collection = Collection::ExerciseTemplates(user_id.clone());
        let document = to_document(&TemplateDoc::from_new(&template, user_id))?;
        let id = self.store.create(&collection, document).await?;
        Ok(template.into_template(domain::TemplateID::from(id), user_id.clone()))
    }

    async fn modify_template(
        &self,
        user_id: &domain::UserID,
        id: &domain::TemplateID,
        name: Option<String>,
        standardized_name: Option<domain::StandardizedName>,
        category: Option<String>,
        default_sets: Option<Vec<domain::SetTemplate>>,
    ) -> Result<domain::ExerciseTemplate, domain::UpdateError> {
        let collection = Collection::ExerciseTemplates(user_id.clone());
        let mut patch = Document::new();
        if let Some(name) = name {
            patch.insert(String::from("name"), Value::String(name));
        }
        if let Some(standardized_name) = standardized_name {
            patch.insert(
                String::from("standardizedName"),
                Value::String(standardized_name.to_string()),
            );
        }
        if let Some(category) = category {
            patch.insert(String::from("category"), Value::String(category));
        }
        if let Some(default_sets) = default_sets {
            let default_sets = default_sets
                .iter()
                .map(|set| {
                    to_document(&SetTemplateDoc {
                        reps: set.reps.map(u32::from),
                        weight: set.weight.map(f32::from),
                        rir: set.rir.map(u8::from),
                    })
                    .map(Value::Object)
                })
                .collect::<Result<Vec<_>, _>>()?;
            patch.insert(String::from("defaultSets"), Value::Array(default_sets));
        }
        self.store
            .update_merge(&collection, id.as_ref(), patch)
            .await
            .map_err(map_update_error)?;
        self.read_template(user_id, id)
            .await?
            .ok_or(domain::UpdateError::NotFound)
    }
}

impl<S: DocumentStore> domain::SessionRepository for DocumentRepository<S> {
    async fn read_session(
        &self,
        key: &domain::SessionKey,
    ) -> Result<Option<domain::Session>, domain::ReadError> {
        let Some(document) = self
            .store
            .get_by_id(&Collection::Sessions, key.as_ref())
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(from_document::<SessionDoc>(document)?.into_domain()?))
    }

    async fn find_sessions_by_template(
        &self,
        user_id: &domain::UserID,
        template_id: domain::WorkoutID,
        week: domain::Week,
    ) -> Result<Vec<domain::Session>, domain::ReadError> {
        let documents = self
            .store
            .query_equals(
                &Collection::Sessions,
                "workoutTemplateId",
                &Value::String(template_id.to_string()),
            )
            .await?;
        // single-field query; user and week are filtered here
        let mut sessions = Vec::new();
        for (_, document) in documents {
            let session = from_document::<SessionDoc>(document)?.into_domain()?;
            if &session.user_id == user_id && session.week == week {
                sessions.push(session);
            }
        }
        Ok(sessions)
    }

    async fn write_session(
        &self,
        key: &domain::SessionKey,
        session: &domain::Session,
    ) -> Result<(), domain::UpdateError> {
        let document = to_document(&SessionDoc::from_domain(session))?;
        Ok(self
            .store
            .set_merge(&Collection::Sessions, key.as_ref(), document)
            .await?)
    }
}

impl<S: DocumentStore> domain::ProgramRepository for DocumentRepository<S> {
    async fn read_program(
        &self,
        id: &domain::ProgramID,
    ) -> Result<Option<domain::Program>, domain::ReadError> {
        let Some(document) = self
            .store
            .get_by_id(&Collection::Programs, id.as_ref())
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(
            from_document::<ProgramDoc>(document)?.into_domain(id.clone())?,
        ))
    }

    async fn read_user_programs(
        &self,
        user_id: &domain::UserID,
    ) -> Result<Vec<domain::Program>, domain::ReadError> {
        let documents = self
            .store
            .query_equals(
                &Collection::Programs,
                "createdBy",
                &Value::String(user_id.to_string()),
            )
            .await?;
        documents
            .into_iter()
            .map(|(id, document)| {
                Ok(from_document::<ProgramDoc>(document)?
                    .into_domain(domain::ProgramID::from(id))?)
            })
            .collect()
    }

    async fn create_program(
        &self,
        program: domain::ProgramDraft,
    ) -> Result<domain::Program, domain::CreateError> {
        let document = to_document(&ProgramDoc::from_draft(&program))?;
        let id = self.store.create(&Collection::Programs, document).await?;
        Ok(program.into_program(domain::ProgramID::from(id)))
    }

    async fn modify_program(
        &self,
        id: &domain::ProgramID,
        name: Option<String>,
        description: Option<String>,
        difficulty: Option<String>,
    ) -> Result<(), domain::UpdateError> {
        let mut patch = Document::new();
        if let Some(name) = name {
            patch.insert(String::from("name"), Value::String(name));
        }
        if let Some(description) = description {
            patch.insert(String::from("description"), Value::String(description));
        }
        if let Some(difficulty) = difficulty {
            patch.insert(String::from("difficulty"), Value::String(difficulty));
        }
        self.store
            .update_merge(&Collection::Programs, id.as_ref(), patch)
            .await
            .map_err(map_update_error)
    }

    async fn replace_workouts(
        &self,
        id: &domain::ProgramID,
        workouts: Vec<domain::Workout>,
    ) -> Result<(), domain::UpdateError> {
        let workouts = workouts
            .iter()
            .map(|workout| to_document(&WorkoutDoc::from_domain(workout)).map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;
        let mut patch = Document::new();
        patch.insert(String::from("workouts"), Value::Array(workouts));
        self.store
            .update_merge(&Collection::Programs, id.as_ref(), patch)
            .await
            .map_err(map_update_error)
    }

    async fn delete_program(
        &self,
        id: &domain::ProgramID,
    ) -> Result<domain::ProgramID, domain::DeleteError> {
        self.store
            .delete(&Collection::Programs, id.as_ref())
            .await?;
        Ok(id.clone())
    }
}
