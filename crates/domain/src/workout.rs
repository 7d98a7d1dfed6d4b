use chrono::{DateTime, Utc};
use derive_more::Deref;
use uuid::Uuid;

use crate::{CreateError, ExerciseID, MuscleGroup, ReadError, RoutineID, UserID};

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn get_workout_logs(&self) -> Result<Vec<WorkoutLog>, ReadError>;
    async fn get_performance_logs(
        &self,
        workout_log_id: WorkoutLogID,
    ) -> Result<Vec<PerformanceLog>, ReadError>;
    async fn create_workout_log(
        &self,
        workout_log: WorkoutLog,
        performance_logs: Vec<PerformanceLog>,
    ) -> Result<WorkoutLog, CreateError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_workout_logs(&self) -> Result<Vec<WorkoutLog>, ReadError>;
    async fn read_performance_logs(
        &self,
        workout_log_id: WorkoutLogID,
    ) -> Result<Vec<PerformanceLog>, ReadError>;
    /// Stores the workout log together with its performance logs.
    ///
    /// Either all records are written or none.
    async fn create_workout_log(
        &self,
        workout_log: WorkoutLog,
        performance_logs: Vec<PerformanceLog>,
    ) -> Result<WorkoutLog, CreateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutLog {
    pub id: WorkoutLogID,
    pub user_id: UserID,
    pub routine_id: RoutineID,
    pub routine_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_seconds: u64,
    pub total_volume: f32,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutLogID(Uuid);

impl WorkoutLogID {
    #[must_use]
    pub fn new() -> Self {
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

impl From<Uuid> for WorkoutLogID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutLogID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// One performed set of a finished workout.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceLog {
    pub workout_log_id: WorkoutLogID,
    pub exercise_id: ExerciseID,
    pub exercise_name: String,
    pub muscle_group: MuscleGroup,
    pub set_number: u32,
    pub reps: u32,
    pub weight: f32,
    pub rest_seconds: u32,
}

impl PerformanceLog {
    #[must_use]
    pub fn volume(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let reps = self.reps as f32;
        self.weight * reps
    }
}
