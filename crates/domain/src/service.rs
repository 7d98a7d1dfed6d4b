use log::{debug, error};
use tokio::sync::watch;

use crate::{
    CreateError, DeleteError, Exercise, ExerciseID, ExerciseRepository, ExerciseService,
    MuscleGroup, Name, PerformanceLog, ReadError, Routine, RoutineExercise, RoutineID,
    RoutineRepository, RoutineService, UpdateError, User, UserRepository, UserService, WorkoutLog,
    WorkoutLogID, WorkoutRepository, WorkoutService,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
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

impl<R: UserRepository> UserService for Service<R> {
    async fn get_user(&self) -> Result<Option<User>, ReadError> {
        log_on_error!(self.repository.read_user(), ReadError, "get", "user")
    }

    async fn create_user(&self, name: Name) -> Result<User, CreateError> {
        log_on_error!(
            self.repository.create_user(name),
            CreateError,
            "create",
            "user"
        )
    }
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn create_exercise(
        &self,
        name: Name,
        muscle_group: MuscleGroup,
    ) -> Result<Exercise, CreateError> {
        log_on_error!(
            self.repository.create_exercise(name, muscle_group),
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            self.repository.delete_exercise(id),
            DeleteError,
            "delete",
            "exercise"
        )
    }
}

impl<R: RoutineRepository> RoutineService for Service<R> {
    async fn get_routines(&self) -> Result<Vec<Routine>, ReadError> {
        log_on_error!(
            self.repository.read_routines(),
            ReadError,
            "get",
            "routines"
        )
    }

    async fn observe_routine(
        &self,
        id: RoutineID,
    ) -> Result<watch::Receiver<Option<Routine>>, ReadError> {
        log_on_error!(
            self.repository.observe_routine(id),
            ReadError,
            "observe",
            "routine"
        )
    }

    async fn create_routine(
        &self,
        name: Name,
        exercises: Vec<RoutineExercise>,
    ) -> Result<Routine, CreateError> {
        log_on_error!(
            self.repository.create_routine(name, exercises),
            CreateError,
            "create",
            "routine"
        )
    }

    async fn update_rest_duration(
        &self,
        routine_id: RoutineID,
        exercise_id: ExerciseID,
        rest_seconds: u32,
    ) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository
                .update_rest_duration(routine_id, exercise_id, rest_seconds),
            UpdateError,
            "update",
            "rest duration"
        )
    }
}

impl<R: WorkoutRepository> WorkoutService for Service<R> {
    async fn get_workout_logs(&self) -> Result<Vec<WorkoutLog>, ReadError> {
        log_on_error!(
            self.repository.read_workout_logs(),
            ReadError,
            "get",
            "workout logs"
        )
    }

    async fn get_performance_logs(
        &self,
        workout_log_id: WorkoutLogID,
    ) -> Result<Vec<PerformanceLog>, ReadError> {
        log_on_error!(
            self.repository.read_performance_logs(workout_log_id),
            ReadError,
            "get",
            "performance logs"
        )
    }

    async fn create_workout_log(
        &self,
        workout_log: WorkoutLog,
        performance_logs: Vec<PerformanceLog>,
    ) -> Result<WorkoutLog, CreateError> {
        log_on_error!(
            self.repository
                .create_workout_log(workout_log, performance_logs),
            CreateError,
            "create",
            "workout log"
        )
    }
}
