use chrono::{DateTime, Utc};
use derive_more::{AsRef, Deref, Display, Into};
use uuid::Uuid;

use crate::{CreateError, DeleteError, Exercise, ReadError, UpdateError, UserID};

#[allow(async_fn_in_trait)]
pub trait ProgramRepository {
    async fn read_program(&self, id: &ProgramID) -> Result<Option<Program>, ReadError>;
    async fn read_user_programs(&self, user_id: &UserID) -> Result<Vec<Program>, ReadError>;
    async fn create_program(&self, program: ProgramDraft) -> Result<Program, CreateError>;
    async fn modify_program(
        &self,
        id: &ProgramID,
        name: Option<String>,
        description: Option<String>,
        difficulty: Option<String>,
    ) -> Result<(), UpdateError>;
    async fn replace_workouts(
        &self,
        id: &ProgramID,
        workouts: Vec<Workout>,
    ) -> Result<(), UpdateError>;
    async fn delete_program(&self, id: &ProgramID) -> Result<ProgramID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait ProgramService {
    /// Persist a new program. The draft's workouts are expanded into one
    /// instance per workout per week before the write.
    async fn create_program(&self, draft: ProgramDraft) -> Result<Program, CreateError>;
    async fn get_program(&self, id: &ProgramID) -> Result<Option<Program>, ReadError>;
    async fn get_user_programs(&self, user_id: &UserID) -> Result<Vec<Program>, ReadError>;
    async fn update_program(
        &self,
        id: &ProgramID,
        name: Option<String>,
        description: Option<String>,
        difficulty: Option<String>,
    ) -> Result<(), UpdateError>;
    async fn delete_program(&self, id: &ProgramID) -> Result<ProgramID, DeleteError>;
    async fn add_workout(&self, id: &ProgramID, workout: Workout) -> Result<WorkoutID, UpdateError>;
    async fn rename_workout(
        &self,
        id: &ProgramID,
        workout_id: WorkoutID,
        name: &str,
    ) -> Result<(), UpdateError>;
}

/// Container of all workout instances of a multi-week plan, flattened
/// across weeks after expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: ProgramID,
    pub name: String,
    pub description: String,
    pub duration: WeekCount,
    pub difficulty: String,
    pub workouts: Vec<Workout>,
    pub created_by: UserID,
    pub created_at: DateTime<Utc>,
}

impl Program {
    #[must_use]
    pub fn workout(&self, id: WorkoutID) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }
}

#[derive(AsRef, Debug, Display, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProgramID(String);

impl From<&str> for ProgramID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProgramID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramDraft {
    pub name: String,
    pub description: String,
    pub duration: WeekCount,
    pub difficulty: String,
    pub workouts: Vec<Workout>,
    pub created_by: UserID,
    pub created_at: DateTime<Utc>,
}

impl ProgramDraft {
    #[must_use]
    pub fn into_program(self, id: ProgramID) -> Program {
        Program {
            id,
            name: self.name,
            description: self.description,
            duration: self.duration,
            difficulty: self.difficulty,
            workouts: self.workouts,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

/// A named collection of exercises scheduled for one specific week.
///
/// `template_id` is shared by the instances of the same workout across
/// weeks; `id` is unique per instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: WorkoutID,
    pub template_id: WorkoutID,
    pub name: String,
    pub week: Week,
    pub exercises: Vec<Exercise>,
}

impl Workout {
    /// Instance of this workout for the given week: fresh ids for the
    /// workout and its exercises, template linkage preserved.
    #[must_use]
    pub fn instantiate(&self, week: Week) -> Workout {
        Workout {
            id: WorkoutID::random(),
            template_id: self.template_id,
            name: self.name.clone(),
            week,
            exercises: self.exercises.iter().map(Exercise::duplicated).collect(),
        }
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(Uuid);

impl WorkoutID {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for WorkoutID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

impl std::fmt::Display for WorkoutID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based week number within a program.
#[derive(Debug, Display, Clone, Copy, Into, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Week(u32);

impl Week {
    pub const ONE: Week = Week(1);

    pub fn new(value: u32) -> Result<Self, WeekError> {
        if value == 0 {
            return Err(WeekError::OutOfRange);
        }

        Ok(Self(value))
    }

    /// The preceding week, or `None` for week 1.
    #[must_use]
    pub fn previous(self) -> Option<Week> {
        if self.0 > 1 { Some(Week(self.0 - 1)) } else { None }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeekError {
    #[error("Week must be 1 or greater")]
    OutOfRange,
}

/// Program duration in weeks.
///
/// Construction is total: non-numeric or non-positive input falls back to
/// a single week, mirroring the forgiving coercion of the program form.
#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct WeekCount(u32);

impl WeekCount {
    pub fn weeks(self) -> impl Iterator<Item = Week> {
        (1..=self.0).map(Week)
    }
}

impl Default for WeekCount {
    fn default() -> Self {
        Self(1)
    }
}

impl From<u32> for WeekCount {
    fn from(value: u32) -> Self {
        Self(value.max(1))
    }
}

impl From<&str> for WeekCount {
    fn from(value: &str) -> Self {
        value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|weeks| *weeks > 0)
            .map_or_else(Self::default, Self)
    }
}

/// One instance per workout per week, in week-major order: all of week 1
/// in the original workout order, then all of week 2, and so on.
#[must_use]
pub fn expand_by_weeks(workouts: &[Workout], duration: WeekCount) -> Vec<Workout> {
    duration
        .weeks()
        .flat_map(|week| workouts.iter().map(move |workout| workout.instantiate(week)))
        .collect()
}
