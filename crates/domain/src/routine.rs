use derive_more::Deref;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{CreateError, ExerciseID, MuscleGroup, Name, ReadError, Reps, UpdateError, Weight};

#[allow(async_fn_in_trait)]
pub trait RoutineService {
    async fn get_routines(&self) -> Result<Vec<Routine>, ReadError>;
    async fn observe_routine(
        &self,
        id: RoutineID,
    ) -> Result<watch::Receiver<Option<Routine>>, ReadError>;
    async fn create_routine(
        &self,
        name: Name,
        exercises: Vec<RoutineExercise>,
    ) -> Result<Routine, CreateError>;
    async fn update_rest_duration(
        &self,
        routine_id: RoutineID,
        exercise_id: ExerciseID,
        rest_seconds: u32,
    ) -> Result<(), UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait RoutineRepository {
    async fn read_routines(&self) -> Result<Vec<Routine>, ReadError>;
    /// Returns a receiver that sees every later change of the routine.
    ///
    /// The value is `None` while the routine does not exist.
    async fn observe_routine(
        &self,
        id: RoutineID,
    ) -> Result<watch::Receiver<Option<Routine>>, ReadError>;
    async fn create_routine(
        &self,
        name: Name,
        exercises: Vec<RoutineExercise>,
    ) -> Result<Routine, CreateError>;
    async fn update_rest_duration(
        &self,
        routine_id: RoutineID,
        exercise_id: ExerciseID,
        rest_seconds: u32,
    ) -> Result<(), UpdateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    pub id: RoutineID,
    pub name: Name,
    pub exercises: Vec<RoutineExercise>,
}

impl Routine {
    #[must_use]
    pub fn exercise(&self, id: ExerciseID) -> Option<&RoutineExercise> {
        self.exercises.iter().find(|e| e.exercise_id == id)
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoutineID(Uuid);

impl RoutineID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for RoutineID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for RoutineID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutineExercise {
    pub exercise_id: ExerciseID,
    pub name: Name,
    pub muscle_group: MuscleGroup,
    pub rest_seconds: u32,
    pub sets: Vec<PlannedSet>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PlannedSet {
    pub reps: Reps,
    pub weight: Option<Weight>,
}
