use chrono::{DateTime, Utc};
use derive_more::{AsRef, Display};

use crate::{Exercise, ProgramID, ReadError, UpdateError, UserID, Week, Workout, WorkoutID};

#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn read_session(&self, key: &SessionKey) -> Result<Option<Session>, ReadError>;
    async fn find_sessions_by_template(
        &self,
        user_id: &UserID,
        template_id: WorkoutID,
        week: Week,
    ) -> Result<Vec<Session>, ReadError>;
    async fn write_session(&self, key: &SessionKey, session: &Session)
    -> Result<(), UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait SessionService {
    /// Persist performed work under the deterministic session key.
    /// Every exercise is guaranteed a template id before the write.
    async fn save_session(&self, session: Session) -> Result<SessionKey, UpdateError>;
    /// Load the session to display for a program/workout/week.
    ///
    /// Total: falls back from the direct key to a template+week search,
    /// then to the as-designed program workout, so the caller always has
    /// something to render.
    async fn load_session(
        &self,
        user_id: &UserID,
        program_id: &ProgramID,
        workout_id: WorkoutID,
        week: Week,
        program_workout: &Workout,
    ) -> Session;
    /// Most recent session recorded for the same workout in the previous
    /// week. Advisory: `None` for week 1 and on any failure.
    async fn previous_week_session(
        &self,
        user_id: &UserID,
        workout_template_id: WorkoutID,
        week: Week,
    ) -> Option<Session>;
}

/// Record of actually performed work for one program/workout/week tuple,
/// distinct from the as-designed program data.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserID,
    pub program_id: ProgramID,
    pub workout_id: WorkoutID,
    pub workout_template_id: WorkoutID,
    pub name: String,
    pub week: Week,
    pub exercises: Vec<Exercise>,
    pub notes: String,
    /// Set by the caller at save time. `None` only on a session
    /// synthesized from program data, which is never stored.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Session {
    #[must_use]
    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.user_id, &self.program_id, self.workout_id, self.week)
    }

    /// Session synthesized from the as-designed program workout, used when
    /// no stored session exists yet.
    #[must_use]
    pub fn from_workout(
        user_id: UserID,
        program_id: ProgramID,
        workout_id: WorkoutID,
        week: Week,
        workout: &Workout,
    ) -> Session {
        Session {
            user_id,
            program_id,
            workout_id,
            workout_template_id: workout.template_id,
            name: workout.name.clone(),
            week,
            exercises: workout.exercises.clone(),
            notes: String::new(),
            timestamp: None,
        }
    }
}

/// Deterministic storage key. Saving twice for the same tuple overwrites
/// (merge) instead of duplicating.
#[derive(AsRef, Debug, Display, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionKey(String);

impl SessionKey {
    #[must_use]
    pub fn new(
        user_id: &UserID,
        program_id: &ProgramID,
        workout_id: WorkoutID,
        week: Week,
    ) -> Self {
        Self(format!("{user_id}_{program_id}_{workout_id}_{week}"))
    }
}

/// First element of a timestamp-descending sort; sessions without a
/// timestamp sort last, ties keep store order.
#[must_use]
pub fn most_recent(mut sessions: Vec<Session>) -> Option<Session> {
    sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sessions.into_iter().next()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn session(notes: &str, timestamp: Option<DateTime<Utc>>) -> Session {
        Session {
            user_id: UserID::from("alice"),
            program_id: ProgramID::from("p1"),
            workout_id: 1.into(),
            workout_template_id: 10.into(),
            name: String::from("Upper Day 1"),
            week: Week::ONE,
            exercises: vec![],
            notes: notes.to_string(),
            timestamp,
        }
    }

    #[test]
    fn test_session_key_format() {
        let key = SessionKey::new(
            &UserID::from("alice"),
            &ProgramID::from("p1"),
            1.into(),
            Week::new(2).unwrap(),
        );
        assert_eq!(
            key.to_string(),
            "alice_p1_00000000-0000-0000-0000-000000000001_2"
        );
    }

    #[test]
    fn test_session_key_deterministic() {
        let user_id = UserID::from("alice");
        let program_id = ProgramID::from("p1");
        assert_eq!(
            SessionKey::new(&user_id, &program_id, 1.into(), Week::ONE),
            SessionKey::new(&user_id, &program_id, 1.into(), Week::ONE)
        );
        assert_ne!(
            SessionKey::new(&user_id, &program_id, 1.into(), Week::ONE),
            SessionKey::new(&user_id, &program_id, 1.into(), Week::new(2).unwrap())
        );
    }

    #[test]
    fn test_most_recent_prefers_later_timestamp() {
        let older = session("older", Some(Utc.with_ymd_and_hms(2025, 11, 17, 14, 0, 0).unwrap()));
        let newer = session("newer", Some(Utc.with_ymd_and_hms(2025, 11, 24, 14, 0, 0).unwrap()));
        assert_eq!(
            most_recent(vec![older.clone(), newer.clone()]),
            Some(newer.clone())
        );
        assert_eq!(most_recent(vec![newer.clone(), older]), Some(newer));
    }

    #[test]
    fn test_most_recent_missing_timestamp_sorts_last() {
        let stored = session("stored", Some(Utc.with_ymd_and_hms(2025, 11, 17, 14, 0, 0).unwrap()));
        let synthesized = session("synthesized", None);
        assert_eq!(
            most_recent(vec![synthesized, stored.clone()]),
            Some(stored)
        );
    }

    #[test]
    fn test_most_recent_tie_keeps_store_order() {
        let timestamp = Some(Utc.with_ymd_and_hms(2025, 11, 17, 14, 0, 0).unwrap());
        let first = session("first", timestamp);
        let second = session("second", timestamp);
        assert_eq!(most_recent(vec![first.clone(), second]), Some(first));
    }

    #[test]
    fn test_most_recent_empty() {
        assert_eq!(most_recent(vec![]), None);
    }

    #[test]
    fn test_session_from_workout() {
        let workout = Workout {
            id: 1.into(),
            template_id: 10.into(),
            name: String::from("Upper Day 1"),
            week: Week::ONE,
            exercises: vec![],
        };
        let session = Session::from_workout(
            UserID::from("alice"),
            ProgramID::from("p1"),
            workout.id,
            Week::new(2).unwrap(),
            &workout,
        );
        assert_eq!(session.workout_template_id, 10.into());
        assert_eq!(session.week, Week::new(2).unwrap());
        assert_eq!(session.name, "Upper Day 1");
        assert_eq!(session.timestamp, None);
    }
}
