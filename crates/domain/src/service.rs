use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Utc;
use log::{debug, error};

use crate::{
    CreateError, DeleteError, Exercise, ExerciseTemplate, ExerciseTemplateRepository,
    NewExerciseTemplate, Program, ProgramDraft, ProgramID, ProgramRepository, ProgramService,
    ReadError, Session, SessionKey, SessionRepository, SessionService, SetTemplate,
    StandardizedName, TemplateCache, TemplateID, TemplateService, UpdateError, UserID, Week,
    Workout, WorkoutID, expand_by_weeks, most_recent,
};

/// Order applied to templates sharing a standardized name before the
/// first one is picked. The default keeps store order ("first match
/// wins"); there is deliberately no smarter tie-break, as duplicates can
/// only arise from the unguarded creation race.
pub type TemplateTieBreak = fn(&ExerciseTemplate, &ExerciseTemplate) -> Ordering;

/// Application service over a repository.
///
/// All storage operations are asynchronous request/response on a single
/// logical thread of control; there is no locking and no retry. Resolved
/// templates are cached for the lifetime of the service.
pub struct Service<R> {
    repository: R,
    template_cache: TemplateCache,
    template_tie_break: TemplateTieBreak,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            template_cache: TemplateCache::new(),
            template_tie_break: |_, _| Ordering::Equal,
        }
    }

    #[must_use]
    pub fn with_template_tie_break(mut self, tie_break: TemplateTieBreak) -> Self {
        self.template_tie_break = tie_break;
        self
    }

    #[must_use]
    pub fn template_cache(&self) -> &TemplateCache {
        &self.template_cache
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ExerciseTemplateRepository> Service<R> {
    async fn resolve_exercise(
        &self,
        user_id: &UserID,
        exercise: &Exercise,
        create_if_missing: bool,
    ) -> Result<Exercise, CreateError> {
        if let Some(id) = &exercise.template_id {
            match self.repository.read_template(user_id, id).await {
                Ok(Some(_)) => return Ok(exercise.clone()),
                Ok(None) => {}
                Err(err) => error!("failed to verify template {id}: {err}"),
            }
        }

        let template = if create_if_missing {
            Some(self.get_or_create_template(user_id, exercise).await?)
        } else {
            self.get_template(user_id, exercise).await?
        };

        Ok(match template {
            Some(template) => exercise.with_template(template.id),
            None => exercise.clone(),
        })
    }

    /// Load-path variant of template resolution: never creates, never
    /// mutates storage, and degrades per exercise on failure.
    async fn heal_exercises(&self, user_id: &UserID, exercises: &[Exercise]) -> Vec<Exercise> {
        let mut result = Vec::with_capacity(exercises.len());
        for exercise in exercises {
            match self.resolve_exercise(user_id, exercise, false).await {
                Ok(resolved) => result.push(resolved),
                Err(err) => {
                    error!("failed to resolve template for {}: {err}", exercise.name);
                    result.push(exercise.clone());
                }
            }
        }
        result
    }
}

impl<R: ExerciseTemplateRepository> TemplateService for Service<R> {
    async fn get_template(
        &self,
        user_id: &UserID,
        exercise: &Exercise,
    ) -> Result<Option<ExerciseTemplate>, ReadError> {
        let standardized_name = exercise.standardized_name();

        if let Some(template) = self.template_cache.get(user_id, &standardized_name) {
            return Ok(Some(template));
        }

        if let Some(id) = &exercise.template_id {
            match self.repository.read_template(user_id, id).await {
                Ok(Some(template)) => {
                    self.template_cache.insert(template.clone());
                    return Ok(Some(template));
                }
                Ok(None) => {}
                // fall through to the name search
                Err(err) => error!("failed to verify template {id}: {err}"),
            }
        }

        let mut matches = log_on_error!(
            self.repository
                .find_templates_by_name(user_id, &standardized_name),
            ReadError,
            "search",
            "templates"
        )?;
        matches.sort_by(self.template_tie_break);
        Ok(matches.into_iter().next().inspect(|template| {
            self.template_cache.insert(template.clone());
        }))
    }

    async fn get_template_by_id(
        &self,
        user_id: &UserID,
        id: &TemplateID,
    ) -> Result<Option<ExerciseTemplate>, ReadError> {
        log_on_error!(
            self.repository.read_template(user_id, id),
            ReadError,
            "get",
            "template"
        )
    }

    async fn get_exercise_templates(
        &self,
        user_id: &UserID,
    ) -> Result<Vec<ExerciseTemplate>, ReadError> {
        log_on_error!(
            self.repository.read_templates(user_id),
            ReadError,
            "get",
            "templates"
        )
    }

    async fn templates_by_category(
        &self,
        user_id: &UserID,
    ) -> BTreeMap<String, Vec<ExerciseTemplate>> {
        match self.get_exercise_templates(user_id).await {
            Ok(templates) => {
                let mut result: BTreeMap<String, Vec<ExerciseTemplate>> = BTreeMap::new();
                for template in templates {
                    let category = if template.category.trim().is_empty() {
                        String::from("Other")
                    } else {
                        template.category.clone()
                    };
                    result.entry(category).or_default().push(template);
                }
                result
            }
            Err(_) => BTreeMap::new(),
        }
    }

    async fn create_template(
        &self,
        user_id: &UserID,
        exercise: &Exercise,
    ) -> Result<ExerciseTemplate, CreateError> {
        // Best-effort duplicate check; not transactional. Two racing
        // creations for the same name can still both get through.
        if let Some(existing) = self.get_template(user_id, exercise).await? {
            return Ok(existing);
        }

        let template = log_on_error!(
            self.repository.create_template(
                user_id,
                NewExerciseTemplate {
                    name: exercise.name.clone(),
                    standardized_name: exercise.standardized_name(),
                    category: exercise.category_or_other(),
                    default_sets: exercise.seed_sets(),
                    created_at: Utc::now(),
                },
            ),
            CreateError,
            "create",
            "template"
        )?;
        self.template_cache.insert(template.clone());
        Ok(template)
    }

    async fn get_or_create_template(
        &self,
        user_id: &UserID,
        exercise: &Exercise,
    ) -> Result<ExerciseTemplate, CreateError> {
        if let Some(template) = self.get_template(user_id, exercise).await? {
            return Ok(template);
        }
        self.create_template(user_id, exercise).await
    }

    async fn update_template(
        &self,
        user_id: &UserID,
        id: &TemplateID,
        name: Option<String>,
        category: Option<String>,
        default_sets: Option<Vec<SetTemplate>>,
    ) -> Result<ExerciseTemplate, UpdateError> {
        let standardized_name = name.as_deref().map(StandardizedName::new);
        let template = log_on_error!(
            self.repository.modify_template(
                user_id,
                id,
                name,
                standardized_name,
                category,
                default_sets
            ),
            UpdateError,
            "update",
            "template"
        )?;
        self.template_cache.insert(template.clone());
        Ok(template)
    }

    async fn resolve_exercise_templates(
        &self,
        user_id: &UserID,
        exercises: &[Exercise],
        create_if_missing: bool,
    ) -> Result<Vec<Exercise>, CreateError> {
        let mut result = Vec::with_capacity(exercises.len());
        for exercise in exercises {
            result.push(
                self.resolve_exercise(user_id, exercise, create_if_missing)
                    .await?,
            );
        }
        Ok(result)
    }

    async fn copy_exercises(
        &self,
        user_id: &UserID,
        exercises: &[Exercise],
        create_if_missing: bool,
    ) -> Vec<Exercise> {
        let mut result = Vec::with_capacity(exercises.len());
        for exercise in exercises {
            let mut copy = exercise.duplicated();
            copy.category = Some(exercise.category_or_other());
            if copy.template_id.is_none() {
                let resolved = if create_if_missing {
                    self.get_or_create_template(user_id, exercise)
                        .await
                        .map(Some)
                        .unwrap_or_else(|err| {
                            error!("failed to resolve template for {}: {err}", exercise.name);
                            None
                        })
                } else {
                    self.get_template(user_id, exercise)
                        .await
                        .unwrap_or_else(|err| {
                            error!("failed to resolve template for {}: {err}", exercise.name);
                            None
                        })
                };
                copy.template_id = resolved.map(|template| template.id);
            }
            result.push(copy);
        }
        result
    }
}

impl<R: SessionRepository + ExerciseTemplateRepository> SessionService for Service<R> {
    async fn save_session(&self, mut session: Session) -> Result<SessionKey, UpdateError> {
        let exercises = self
            .resolve_exercise_templates(&session.user_id, &session.exercises, true)
            .await?;
        session.exercises = exercises;
        let key = session.key();
        log_on_error!(
            self.repository.write_session(&key, &session),
            UpdateError,
            "save",
            "session"
        )?;
        Ok(key)
    }

    async fn load_session(
        &self,
        user_id: &UserID,
        program_id: &ProgramID,
        workout_id: WorkoutID,
        week: Week,
        program_workout: &Workout,
    ) -> Session {
        let key = SessionKey::new(user_id, program_id, workout_id, week);
        match self.repository.read_session(&key).await {
            Ok(Some(mut session)) => {
                session.exercises = self.heal_exercises(user_id, &session.exercises).await;
                return session;
            }
            Ok(None) => debug!("no stored session for {key}"),
            Err(err) => error!("failed to read session {key}: {err}"),
        }

        // The workout instance id may have changed across a program edit;
        // a session saved under the old id is still reachable through the
        // workout's template id.
        let template_id = program_workout.template_id;
        if !template_id.is_nil() {
            match self
                .repository
                .find_sessions_by_template(user_id, template_id, week)
                .await
            {
                Ok(sessions) => {
                    if let Some(session) = most_recent(sessions) {
                        return session;
                    }
                }
                Err(err) => {
                    error!("failed to search sessions for template {template_id}: {err}");
                }
            }
        }

        let mut session =
            Session::from_workout(user_id.clone(), program_id.clone(), workout_id, week, program_workout);
        session.exercises = self.heal_exercises(user_id, &session.exercises).await;
        session
    }

    async fn previous_week_session(
        &self,
        user_id: &UserID,
        workout_template_id: WorkoutID,
        week: Week,
    ) -> Option<Session> {
        let previous = week.previous()?;
        match self
            .repository
            .find_sessions_by_template(user_id, workout_template_id, previous)
            .await
        {
            Ok(sessions) => most_recent(sessions),
            Err(err) => {
                error!("failed to read previous week sessions: {err}");
                None
            }
        }
    }
}

impl<R: ProgramRepository> ProgramService for Service<R> {
    async fn create_program(&self, draft: ProgramDraft) -> Result<Program, CreateError> {
        let workouts = expand_by_weeks(&draft.workouts, draft.duration);
        log_on_error!(
            self.repository.create_program(ProgramDraft { workouts, ..draft }),
            CreateError,
            "create",
            "program"
        )
    }

    async fn get_program(&self, id: &ProgramID) -> Result<Option<Program>, ReadError> {
        log_on_error!(
            self.repository.read_program(id),
            ReadError,
            "get",
            "program"
        )
    }

    async fn get_user_programs(&self, user_id: &UserID) -> Result<Vec<Program>, ReadError> {
        log_on_error!(
            self.repository.read_user_programs(user_id),
            ReadError,
            "get",
            "programs"
        )
    }

    async fn update_program(
        &self,
        id: &ProgramID,
        name: Option<String>,
        description: Option<String>,
        difficulty: Option<String>,
    ) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.modify_program(id, name, description, difficulty),
            UpdateError,
            "update",
            "program"
        )
    }

    async fn delete_program(&self, id: &ProgramID) -> Result<ProgramID, DeleteError> {
        log_on_error!(
            self.repository.delete_program(id),
            DeleteError,
            "delete",
            "program"
        )
    }

    async fn add_workout(&self, id: &ProgramID, workout: Workout) -> Result<WorkoutID, UpdateError> {
        let Some(mut program) = self.repository.read_program(id).await? else {
            return Err(UpdateError::NotFound);
        };
        let workout_id = workout.id;
        program.workouts.push(workout);
        self.repository.replace_workouts(id, program.workouts).await?;
        Ok(workout_id)
    }

    async fn rename_workout(
        &self,
        id: &ProgramID,
        workout_id: WorkoutID,
        name: &str,
    ) -> Result<(), UpdateError> {
        let Some(mut program) = self.repository.read_program(id).await? else {
            return Err(UpdateError::NotFound);
        };
        for workout in &mut program.workouts {
            if workout.id == workout_id {
                workout.name = name.to_string();
            }
        }
        self.repository.replace_workouts(id, program.workouts).await
    }
}
