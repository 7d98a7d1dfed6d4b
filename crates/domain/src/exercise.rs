use derive_more::Deref;
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{CreateError, DeleteError, Name, ReadError};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(
        &self,
        name: Name,
        muscle_group: MuscleGroup,
    ) -> Result<Exercise, CreateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;

    async fn get_exercises_by_muscle_group(
        &self,
        muscle_group: MuscleGroup,
    ) -> Result<Vec<Exercise>, ReadError> {
        Ok(self
            .get_exercises()
            .await?
            .into_iter()
            .filter(|e| e.muscle_group == muscle_group)
            .collect())
    }
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(
        &self,
        name: Name,
        muscle_group: MuscleGroup,
    ) -> Result<Exercise, CreateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub muscle_group: MuscleGroup,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Legs,
    Glutes,
    Core,
    #[strum(to_string = "Full Body", serialize = "FullBody")]
    FullBody,
    Cardio,
}
