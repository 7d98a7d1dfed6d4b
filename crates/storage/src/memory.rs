//! In-memory storage
//!
//! Keeps all data in process memory. Clones share the same data. While the storage is offline,
//! every modification fails with `StorageError::NoConnection` and leaves the data untouched.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use liftlog_domain as domain;
use log::debug;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Arc<Mutex<Data>>,
}

#[derive(Default)]
struct Data {
    offline: bool,
    user: Option<domain::User>,
    exercises: Vec<domain::Exercise>,
    routines: BTreeMap<domain::RoutineID, watch::Sender<Option<domain::Routine>>>,
    workout_logs: Vec<domain::WorkoutLog>,
    performance_logs: Vec<domain::PerformanceLog>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        debug!("memory storage {}", if offline { "offline" } else { "online" });
        self.data().offline = offline;
    }

    fn data(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn writable_data(&self) -> Result<MutexGuard<'_, Data>, domain::StorageError> {
        let data = self.data();
        if data.offline {
            return Err(domain::StorageError::NoConnection);
        }
        Ok(data)
    }
}

impl domain::UserRepository for MemoryStorage {
    async fn read_user(&self) -> Result<Option<domain::User>, domain::ReadError> {
        Ok(self.data().user.clone())
    }

    async fn create_user(&self, name: domain::Name) -> Result<domain::User, domain::CreateError> {
        let mut data = self.writable_data()?;
        if data.user.is_some() {
            return Err(domain::CreateError::Conflict);
        }
        let user = domain::User {
            id: Uuid::new_v4().into(),
            name,
        };
        data.user = Some(user.clone());
        Ok(user)
    }
}

impl domain::ExerciseRepository for MemoryStorage {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self.data().exercises.clone())
    }

    async fn create_exercise(
        &self,
        name: domain::Name,
        muscle_group: domain::MuscleGroup,
    ) -> Result<domain::Exercise, domain::CreateError> {
        let mut data = self.writable_data()?;
        if data.exercises.iter().any(|e| e.name.matches(&name)) {
            return Err(domain::CreateError::Conflict);
        }
        let exercise = domain::Exercise {
            id: Uuid::new_v4().into(),
            name,
            muscle_group,
        };
        data.exercises.push(exercise.clone());
        Ok(exercise)
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        let mut data = self.writable_data()?;
        let len = data.exercises.len();
        data.exercises.retain(|e| e.id != id);
        if data.exercises.len() == len {
            return Err(domain::DeleteError::NotFound);
        }
        Ok(id)
    }
}

impl domain::RoutineRepository for MemoryStorage {
    async fn read_routines(&self) -> Result<Vec<domain::Routine>, domain::ReadError> {
        let mut routines = self
            .data()
            .routines
            .values()
            .filter_map(|routine| routine.borrow().clone())
            .collect::<Vec<_>>();
        routines.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(routines)
    }

    async fn observe_routine(
        &self,
        id: domain::RoutineID,
    ) -> Result<watch::Receiver<Option<domain::Routine>>, domain::ReadError> {
        Ok(self
            .data()
            .routines
            .entry(id)
            .or_insert_with(|| watch::channel(None).0)
            .subscribe())
    }

    async fn create_routine(
        &self,
        name: domain::Name,
        exercises: Vec<domain::RoutineExercise>,
    ) -> Result<domain::Routine, domain::CreateError> {
        let mut data = self.writable_data()?;
        if data
            .routines
            .values()
            .any(|r| r.borrow().as_ref().is_some_and(|r| r.name.matches(&name)))
        {
            return Err(domain::CreateError::Conflict);
        }
        let routine = domain::Routine {
            id: Uuid::new_v4().into(),
            name,
            exercises,
        };
        data.routines
            .insert(routine.id, watch::channel(Some(routine.clone())).0);
        Ok(routine)
    }

    async fn update_rest_duration(
        &self,
        routine_id: domain::RoutineID,
        exercise_id: domain::ExerciseID,
        rest_seconds: u32,
    ) -> Result<(), domain::UpdateError> {
        let data = self.writable_data()?;
        let Some(routine) = data.routines.get(&routine_id) else {
            return Err(domain::UpdateError::NotFound);
        };

        let mut found = false;
        routine.send_if_modified(|routine| {
            let mut modified = false;
            for exercise in routine
                .iter_mut()
                .flat_map(|r| r.exercises.iter_mut())
                .filter(|e| e.exercise_id == exercise_id)
            {
                found = true;
                if exercise.rest_seconds != rest_seconds {
                    exercise.rest_seconds = rest_seconds;
                    modified = true;
                }
            }
            modified
        });

        if found {
            Ok(())
        } else {
            Err(domain::UpdateError::NotFound)
        }
    }
}

impl domain::WorkoutRepository for MemoryStorage {
    async fn read_workout_logs(&self) -> Result<Vec<domain::WorkoutLog>, domain::ReadError> {
        Ok(self.data().workout_logs.clone())
    }

    async fn read_performance_logs(
        &self,
        workout_log_id: domain::WorkoutLogID,
    ) -> Result<Vec<domain::PerformanceLog>, domain::ReadError> {
        Ok(self
            .data()
            .performance_logs
            .iter()
            .filter(|p| p.workout_log_id == workout_log_id)
            .cloned()
            .collect())
    }

    async fn create_workout_log(
        &self,
        workout_log: domain::WorkoutLog,
        performance_logs: Vec<domain::PerformanceLog>,
    ) -> Result<domain::WorkoutLog, domain::CreateError> {
        let mut data = self.writable_data()?;
        if data.workout_logs.iter().any(|l| l.id == workout_log.id) {
            return Err(domain::CreateError::Conflict);
        }
        data.performance_logs
            .extend(performance_logs.into_iter().map(|p| domain::PerformanceLog {
                workout_log_id: workout_log.id,
                ..p
            }));
        data.workout_logs.push(workout_log.clone());
        Ok(workout_log)
    }
}
