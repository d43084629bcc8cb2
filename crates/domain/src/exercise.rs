use derive_more::{Deref, Display, Into};
use uuid::Uuid;

use crate::{SetTemplate, StandardizedName, TemplateID};

/// One occurrence of an exercise within a specific workout and week.
///
/// The instance id is unique per week; the template id is the durable
/// identity shared by all occurrences of the same exercise across weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseInstanceID,
    pub template_id: Option<TemplateID>,
    pub name: String,
    pub sets: Vec<ExerciseSet>,
    pub notes: String,
    pub category: Option<String>,
}

impl Exercise {
    #[must_use]
    pub fn standardized_name(&self) -> StandardizedName {
        StandardizedName::new(&self.name)
    }

    #[must_use]
    pub fn category_or_other(&self) -> String {
        self.category
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| String::from("Other"))
    }

    /// Copy of this exercise with a fresh instance id. The template id is
    /// carried over so the copy remains the same exercise across weeks.
    #[must_use]
    pub fn duplicated(&self) -> Exercise {
        Exercise {
            id: ExerciseInstanceID::random(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_template(&self, template_id: TemplateID) -> Exercise {
        Exercise {
            template_id: Some(template_id),
            ..self.clone()
        }
    }

    /// Seed for a new template's default sets. An exercise without sets
    /// yields a single empty placeholder.
    #[must_use]
    pub fn seed_sets(&self) -> Vec<SetTemplate> {
        if self.sets.is_empty() {
            vec![SetTemplate::default()]
        } else {
            self.sets.iter().map(SetTemplate::from).collect()
        }
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseInstanceID(Uuid);

impl ExerciseInstanceID {
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

impl From<Uuid> for ExerciseInstanceID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseInstanceID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// One logged set: target or actual values, all optional until filled in.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExerciseSet {
    pub reps: Option<Reps>,
    pub weight: Option<Weight>,
    pub rir: Option<Rir>,
    pub complete: bool,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        if (value * 10.0 % 1.0).abs() > f32::EPSILON {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1 kg")]
    InvalidResolution,
    #[error("Weight must be a decimal")]
    ParseError,
}

/// Reps in reserve at the end of a set.
#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rir(u8);

impl Rir {
    pub fn new(value: u8) -> Result<Self, RirError> {
        if value > 10 {
            return Err(RirError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Rir {
    type Error = RirError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u8>() {
            Ok(parsed_value) => Rir::new(parsed_value),
            Err(_) => Err(RirError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RirError {
    #[error("RIR must be in the range 0 to 10")]
    OutOfRange,
    #[error("RIR must be an integer")]
    ParseError,
}
