#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod cache;
pub mod error;
pub mod exercise;
pub mod name;
pub mod program;
pub mod service;
pub mod session;
pub mod template;
pub mod user;

pub use cache::TemplateCache;
pub use error::{CreateError, DeleteError, ReadError, StorageError, UpdateError};
pub use exercise::{
    Exercise, ExerciseInstanceID, ExerciseSet, Reps, RepsError, Rir, RirError, Weight, WeightError,
};
pub use name::{StandardizedName, standardize_name};
pub use program::{
    Program, ProgramDraft, ProgramID, ProgramRepository, ProgramService, Week, WeekCount,
    WeekError, Workout, WorkoutID, expand_by_weeks,
};
pub use service::{Service, TemplateTieBreak};
pub use session::{Session, SessionKey, SessionRepository, SessionService, most_recent};
pub use template::{
    ExerciseTemplate, ExerciseTemplateRepository, NewExerciseTemplate, SetTemplate, TemplateID,
    TemplateService,
};
pub use user::UserID;
