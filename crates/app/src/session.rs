use chrono::{DateTime, Utc};
use liftlog_domain::{
    self as domain, ExerciseID, MuscleGroup, PerformanceLog, Reps, Routine, RoutineID, UserID,
    Weight, WorkoutLog, WorkoutLogID,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No routine data has arrived yet.
    #[default]
    Loading,
    Idle,
    CountingDown,
    Active,
    Finished,
}

/// Snapshot of an ongoing workout.
///
/// A session is never modified in place. Every change goes through [`Session::update`], which
/// derives a new snapshot from the current one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Session {
    pub routine_id: RoutineID,
    pub routine_name: String,
    pub exercises: Vec<SessionExercise>,
    pub phase: Phase,
    pub countdown_remaining: u32,
    pub elapsed_seconds: u64,
    pub rest_remaining: u32,
    pub rest_active: bool,
    /// Incremented whenever a rest timer is started. Ticks of earlier runs are ignored.
    pub rest_run: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionExercise {
    pub exercise_id: ExerciseID,
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub sets: Vec<SessionSet>,
    pub rest_seconds: u32,
}

impl SessionExercise {
    #[must_use]
    pub fn muscle_group_label(&self) -> String {
        self.muscle_group.to_string()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionSet {
    pub number: u32,
    pub target_weight: Option<Weight>,
    pub target_reps: Reps,
    pub weight: String,
    pub reps: String,
    pub completed: bool,
}

impl SessionSet {
    #[must_use]
    pub fn volume(&self) -> f32 {
        if self.completed {
            domain::set_volume(&self.weight, &self.reps)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    RoutineChanged(Routine),

    StartCountdown(u32),
    CountdownTick,
    ElapsedTick,
    Finished,

    SetChanged {
        exercise_idx: usize,
        set_idx: usize,
        weight: String,
        reps: String,
    },
    SetAdded(usize),
    SetCompleted(usize, usize, bool),
    RestTimeChanged(usize, u32),

    RestStarted(u32),
    RestTick(u64),
    RestStopped,
    RestExtended(u32),
}

impl Session {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    #[must_use]
    pub fn is_counting_down(&self) -> bool {
        self.phase == Phase::CountingDown
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    #[must_use]
    pub fn set(&self, exercise_idx: usize, set_idx: usize) -> Option<&SessionSet> {
        self.exercises.get(exercise_idx)?.sets.get(set_idx)
    }

    #[must_use]
    pub fn total_volume(&self) -> f32 {
        self.exercises
            .iter()
            .flat_map(|e| &e.sets)
            .map(SessionSet::volume)
            .sum()
    }

    #[must_use]
    pub fn update(&self, msg: Msg) -> Session {
        let mut next = self.clone();

        match msg {
            Msg::RoutineChanged(routine) => {
                if !self.is_finished() {
                    if self.phase == Phase::Loading {
                        next.phase = Phase::Idle;
                    }
                    next.routine_id = routine.id;
                    next.routine_name = routine.name.to_string();
                    next.exercises = exercises(&routine);
                }
            }

            Msg::StartCountdown(seconds) => {
                if self.phase == Phase::Idle {
                    next.countdown_remaining = seconds;
                    next.phase = if seconds == 0 {
                        Phase::Active
                    } else {
                        Phase::CountingDown
                    };
                }
            }
            Msg::CountdownTick => {
                if self.is_counting_down() {
                    next.countdown_remaining = self.countdown_remaining.saturating_sub(1);
                    if next.countdown_remaining == 0 {
                        next.phase = Phase::Active;
                    }
                }
            }
            Msg::ElapsedTick => {
                if self.is_active() {
                    next.elapsed_seconds += 1;
                }
            }
            Msg::Finished => {
                if self.is_active() {
                    next.phase = Phase::Finished;
                    next.rest_active = false;
                    next.rest_remaining = 0;
                }
            }

            Msg::SetChanged {
                exercise_idx,
                set_idx,
                weight,
                reps,
            } => {
                if let Some(set) = next.active_set_mut(exercise_idx, set_idx) {
                    set.weight = weight;
                    set.reps = reps;
                }
            }
            Msg::SetAdded(exercise_idx) => {
                if self.is_active() {
                    if let Some(exercise) = next.exercises.get_mut(exercise_idx) {
                        let set = match exercise.sets.last() {
                            Some(last) => SessionSet {
                                number: last.number + 1,
                                completed: false,
                                ..last.clone()
                            },
                            None => SessionSet {
                                number: 1,
                                ..SessionSet::default()
                            },
                        };
                        exercise.sets.push(set);
                    }
                }
            }
            Msg::SetCompleted(exercise_idx, set_idx, completed) => {
                if let Some(set) = next.active_set_mut(exercise_idx, set_idx) {
                    set.completed = completed;
                }
            }
            Msg::RestTimeChanged(exercise_idx, seconds) => {
                if let Some(exercise) = next.exercises.get_mut(exercise_idx) {
                    exercise.rest_seconds = seconds;
                }
            }

            Msg::RestStarted(seconds) => {
                next.rest_run += 1;
                next.rest_remaining = seconds;
                next.rest_active = seconds > 0;
            }
            Msg::RestTick(run) => {
                if self.rest_active && run == self.rest_run {
                    next.rest_remaining = self.rest_remaining.saturating_sub(1);
                    next.rest_active = next.rest_remaining > 0;
                }
            }
            Msg::RestStopped => {
                next.rest_remaining = 0;
                next.rest_active = false;
            }
            Msg::RestExtended(seconds) => {
                if self.rest_active {
                    next.rest_remaining = self.rest_remaining.saturating_add(seconds);
                }
            }
        }

        next
    }

    fn active_set_mut(&mut self, exercise_idx: usize, set_idx: usize) -> Option<&mut SessionSet> {
        if !self.is_active() {
            return None;
        }
        self.exercises.get_mut(exercise_idx)?.sets.get_mut(set_idx)
    }

    #[must_use]
    pub fn workout_log(&self, id: WorkoutLogID, user_id: UserID, end: DateTime<Utc>) -> WorkoutLog {
        let elapsed = chrono::Duration::try_seconds(
            i64::try_from(self.elapsed_seconds).unwrap_or(i64::MAX),
        )
        .unwrap_or_default();
        WorkoutLog {
            id,
            user_id,
            routine_id: self.routine_id,
            routine_name: self.routine_name.clone(),
            start: end - elapsed,
            end,
            duration_seconds: self.elapsed_seconds,
            total_volume: self.total_volume(),
        }
    }

    /// One entry per completed set.
    #[must_use]
    pub fn performance_logs(&self, workout_log_id: WorkoutLogID) -> Vec<PerformanceLog> {
        self.exercises
            .iter()
            .flat_map(|exercise| {
                exercise
                    .sets
                    .iter()
                    .filter(|set| set.completed)
                    .map(move |set| PerformanceLog {
                        workout_log_id,
                        exercise_id: exercise.exercise_id,
                        exercise_name: exercise.name.clone(),
                        muscle_group: exercise.muscle_group,
                        set_number: set.number,
                        reps: domain::parse_reps_or_zero(&set.reps),
                        weight: domain::parse_weight_or_zero(&set.weight),
                        rest_seconds: exercise.rest_seconds,
                    })
            })
            .collect()
    }
}

fn exercises(routine: &Routine) -> Vec<SessionExercise> {
    routine
        .exercises
        .iter()
        .map(|exercise| SessionExercise {
            exercise_id: exercise.exercise_id,
            name: exercise.name.to_string(),
            muscle_group: exercise.muscle_group,
            sets: (1..)
                .zip(&exercise.sets)
                .map(|(number, planned)| SessionSet {
                    number,
                    target_weight: planned.weight,
                    target_reps: planned.reps,
                    weight: planned.weight.map(|w| w.to_string()).unwrap_or_default(),
                    reps: planned.reps.to_string(),
                    completed: false,
                })
                .collect(),
            rest_seconds: exercise.rest_seconds,
        })
        .collect()
}

/// Payload of the navigation event emitted once a session has been finished.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSummary {
    pub routine_name: String,
    pub duration_seconds: u64,
    pub total_volume: f32,
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use liftlog_domain::{Name, PlannedSet, RoutineExercise};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn push_day() -> Routine {
        Routine {
            id: 1.into(),
            name: Name::new("Push Day").unwrap(),
            exercises: vec![
                RoutineExercise {
                    exercise_id: 1.into(),
                    name: Name::new("Bench Press").unwrap(),
                    muscle_group: MuscleGroup::Chest,
                    rest_seconds: 90,
                    sets: vec![
                        PlannedSet {
                            reps: Reps::new(10).unwrap(),
                            weight: Some(Weight::new(60.0).unwrap()),
                        };
                        2
                    ],
                },
                RoutineExercise {
                    exercise_id: 2.into(),
                    name: Name::new("Dips").unwrap(),
                    muscle_group: MuscleGroup::Triceps,
                    rest_seconds: 60,
                    sets: vec![],
                },
            ],
        }
    }

    fn loaded() -> Session {
        Session::default().update(Msg::RoutineChanged(push_day()))
    }

    fn active() -> Session {
        loaded().update(Msg::StartCountdown(0))
    }

    fn set_changed(exercise_idx: usize, set_idx: usize, weight: &str, reps: &str) -> Msg {
        Msg::SetChanged {
            exercise_idx,
            set_idx,
            weight: weight.to_string(),
            reps: reps.to_string(),
        }
    }

    #[test]
    fn test_routine_changed() {
        let session = loaded();

        assert_eq!(session.routine_id, RoutineID::from(1));
        assert_eq!(session.routine_name, "Push Day");
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.exercises.len(), 2);
        assert_eq!(session.exercises[0].muscle_group_label(), "Chest");
        assert_eq!(session.exercises[0].rest_seconds, 90);
        assert_eq!(
            session.exercises[0].sets,
            vec![
                SessionSet {
                    number: 1,
                    target_weight: Some(Weight::new(60.0).unwrap()),
                    target_reps: Reps::new(10).unwrap(),
                    weight: "60".to_string(),
                    reps: "10".to_string(),
                    completed: false,
                },
                SessionSet {
                    number: 2,
                    target_weight: Some(Weight::new(60.0).unwrap()),
                    target_reps: Reps::new(10).unwrap(),
                    weight: "60".to_string(),
                    reps: "10".to_string(),
                    completed: false,
                },
            ]
        );
    }

    #[test]
    fn test_start_countdown_ignored_while_loading() {
        let session = Session::default();
        assert_eq!(session.phase, Phase::Loading);

        assert_eq!(session.update(Msg::StartCountdown(0)), session);
        assert_eq!(session.update(Msg::StartCountdown(3)), session);
        assert_eq!(session.update(Msg::SetAdded(0)), session);
    }

    #[test]
    fn test_routine_changed_replaces_edits_but_keeps_lifecycle() {
        let session = active()
            .update(Msg::ElapsedTick)
            .update(set_changed(0, 0, "80", "5"))
            .update(Msg::RoutineChanged(push_day()));

        assert_eq!(session.phase, Phase::Active);
        assert_eq!(session.elapsed_seconds, 1);
        assert_eq!(session.exercises[0].sets[0].weight, "60");
    }

    #[test]
    fn test_routine_changed_ignored_after_finish() {
        let session = active()
            .update(Msg::SetCompleted(0, 0, true))
            .update(Msg::Finished);

        assert_eq!(session.update(Msg::RoutineChanged(push_day())), session);
    }

    #[test]
    fn test_countdown() {
        let session = loaded().update(Msg::StartCountdown(3));
        assert_eq!(session.phase, Phase::CountingDown);
        assert_eq!(session.countdown_remaining, 3);

        let session = session.update(Msg::CountdownTick).update(Msg::CountdownTick);
        assert_eq!(session.phase, Phase::CountingDown);
        assert_eq!(session.countdown_remaining, 1);

        let session = session.update(Msg::CountdownTick);
        assert_eq!(session.phase, Phase::Active);
        assert_eq!(session.countdown_remaining, 0);

        assert_eq!(session.update(Msg::CountdownTick), session);
    }

    #[test]
    fn test_start_countdown_only_from_idle() {
        let counting_down = loaded().update(Msg::StartCountdown(3)).update(Msg::CountdownTick);
        assert_eq!(counting_down.update(Msg::StartCountdown(3)), counting_down);

        let active = active();
        assert_eq!(active.update(Msg::StartCountdown(3)), active);
    }

    #[test]
    fn test_elapsed_tick_only_while_active() {
        assert_eq!(loaded().update(Msg::ElapsedTick).elapsed_seconds, 0);
        assert_eq!(
            active()
                .update(Msg::ElapsedTick)
                .update(Msg::ElapsedTick)
                .elapsed_seconds,
            2
        );
        assert_eq!(
            active()
                .update(Msg::Finished)
                .update(Msg::ElapsedTick)
                .elapsed_seconds,
            0
        );
    }

    #[rstest]
    #[case::set_changed(set_changed(0, 0, "70", "8"))]
    #[case::set_added(Msg::SetAdded(0))]
    #[case::set_completed(Msg::SetCompleted(0, 0, true))]
    fn test_set_mutations_ignored_unless_active(#[case] msg: Msg) {
        let idle = loaded();
        assert_eq!(idle.update(msg.clone()), idle);

        let counting_down = loaded().update(Msg::StartCountdown(3));
        assert_eq!(counting_down.update(msg.clone()), counting_down);

        let finished = active().update(Msg::Finished);
        assert_eq!(finished.update(msg), finished);
    }

    #[rstest]
    #[case::exercise_out_of_range(set_changed(5, 0, "70", "8"))]
    #[case::set_out_of_range(set_changed(0, 9, "70", "8"))]
    #[case::set_added_out_of_range(Msg::SetAdded(5))]
    #[case::set_completed_out_of_range(Msg::SetCompleted(0, 2, true))]
    #[case::rest_time_out_of_range(Msg::RestTimeChanged(2, 30))]
    fn test_out_of_range_indices_ignored(#[case] msg: Msg) {
        let session = active();
        assert_eq!(session.update(msg), session);
    }

    #[test]
    fn test_set_changed() {
        let session = active().update(set_changed(0, 1, "62.5", "eight"));

        assert_eq!(session.exercises[0].sets[1].weight, "62.5");
        assert_eq!(session.exercises[0].sets[1].reps, "eight");
        assert_eq!(session.exercises[0].sets[0].weight, "60");
    }

    #[test]
    fn test_set_added_copies_last_set() {
        let session = active()
            .update(set_changed(0, 1, "65", "8"))
            .update(Msg::SetCompleted(0, 1, true))
            .update(Msg::SetAdded(0))
            .update(Msg::SetAdded(0));

        let sets = &session.exercises[0].sets;
        assert_eq!(sets.iter().map(|s| s.number).collect::<Vec<_>>(), [1, 2, 3, 4]);
        for set in &sets[2..] {
            assert_eq!(set.target_weight, Some(Weight::new(60.0).unwrap()));
            assert_eq!(set.target_reps, Reps::new(10).unwrap());
            assert_eq!(set.weight, "65");
            assert_eq!(set.reps, "8");
            assert!(!set.completed);
        }
    }

    #[test]
    fn test_set_added_to_exercise_without_sets() {
        let session = active().update(Msg::SetAdded(1));

        assert_eq!(
            session.exercises[1].sets,
            vec![SessionSet {
                number: 1,
                ..SessionSet::default()
            }]
        );
    }

    #[test]
    fn test_rest_time_changed_in_any_phase() {
        assert_eq!(
            loaded()
                .update(Msg::RestTimeChanged(0, 120))
                .exercises[0]
                .rest_seconds,
            120
        );
        assert_eq!(
            active()
                .update(Msg::Finished)
                .update(Msg::RestTimeChanged(1, 45))
                .exercises[1]
                .rest_seconds,
            45
        );
    }

    #[test]
    fn test_rest_timer() {
        let session = active().update(Msg::RestStarted(2));
        assert!(session.rest_active);
        assert_eq!(session.rest_remaining, 2);
        assert_eq!(session.rest_run, 1);

        let session = session.update(Msg::RestTick(1));
        assert!(session.rest_active);
        assert_eq!(session.rest_remaining, 1);

        let session = session.update(Msg::RestTick(1));
        assert!(!session.rest_active);
        assert_eq!(session.rest_remaining, 0);
    }

    #[test]
    fn test_rest_started_restarts_without_stacking() {
        let session = active()
            .update(Msg::RestStarted(90))
            .update(Msg::RestTick(1))
            .update(Msg::RestStarted(60));

        assert_eq!(session.rest_remaining, 60);
        assert_eq!(session.rest_run, 2);
        assert_eq!(session.update(Msg::RestTick(1)), session);
        assert_eq!(session.update(Msg::RestTick(2)).rest_remaining, 59);
    }

    #[test]
    fn test_rest_started_with_zero_seconds() {
        let session = active().update(Msg::RestStarted(0));
        assert!(!session.rest_active);
        assert_eq!(session.rest_remaining, 0);
    }

    #[test]
    fn test_rest_stopped_and_extended() {
        let session = active().update(Msg::RestStarted(10));
        assert_eq!(session.update(Msg::RestExtended(30)).rest_remaining, 40);

        let stopped = session.update(Msg::RestStopped);
        assert!(!stopped.rest_active);
        assert_eq!(stopped.rest_remaining, 0);
        assert_eq!(stopped.update(Msg::RestExtended(30)), stopped);
    }

    #[test]
    fn test_total_volume() {
        let session = active()
            .update(set_changed(0, 0, "60", "10"))
            .update(Msg::SetCompleted(0, 0, true))
            .update(set_changed(0, 1, "100", "100"))
            .update(Msg::SetAdded(1))
            .update(set_changed(1, 0, "bodyweight", "12"))
            .update(Msg::SetCompleted(1, 0, true));

        assert_approx_eq!(session.total_volume(), 600.0);
    }

    #[test]
    fn test_total_volume_independent_of_completion_order() {
        let base = active().update(set_changed(0, 1, "62.5", "8"));
        let forward = base
            .update(Msg::SetCompleted(0, 0, true))
            .update(Msg::SetCompleted(0, 1, true));
        let backward = base
            .update(Msg::SetCompleted(0, 1, true))
            .update(Msg::SetCompleted(0, 0, true));

        assert_approx_eq!(forward.total_volume(), 1100.0);
        assert_approx_eq!(backward.total_volume(), forward.total_volume());
        assert_approx_eq!(
            forward.update(Msg::SetCompleted(0, 1, false)).total_volume(),
            600.0
        );
    }

    #[test]
    fn test_workout_log() {
        let end = DateTime::parse_from_rfc3339("2026-05-01T19:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut session = active().update(Msg::SetCompleted(0, 0, true));
        for _ in 0..1800 {
            session = session.update(Msg::ElapsedTick);
        }

        let workout_log = session.workout_log(7.into(), 3.into(), end);

        assert_eq!(
            workout_log,
            WorkoutLog {
                id: 7.into(),
                user_id: 3.into(),
                routine_id: 1.into(),
                routine_name: "Push Day".to_string(),
                start: DateTime::parse_from_rfc3339("2026-05-01T18:30:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
                end,
                duration_seconds: 1800,
                total_volume: 600.0,
            }
        );
    }

    #[test]
    fn test_performance_logs() {
        let session = active()
            .update(Msg::RestTimeChanged(0, 120))
            .update(set_changed(0, 1, "62.5", "x"))
            .update(Msg::SetCompleted(0, 1, true))
            .update(Msg::SetAdded(1))
            .update(set_changed(1, 0, "", "12"))
            .update(Msg::SetCompleted(1, 0, true));

        assert_eq!(
            session.performance_logs(7.into()),
            vec![
                PerformanceLog {
                    workout_log_id: 7.into(),
                    exercise_id: 1.into(),
                    exercise_name: "Bench Press".to_string(),
                    muscle_group: MuscleGroup::Chest,
                    set_number: 2,
                    reps: 0,
                    weight: 62.5,
                    rest_seconds: 120,
                },
                PerformanceLog {
                    workout_log_id: 7.into(),
                    exercise_id: 2.into(),
                    exercise_name: "Dips".to_string(),
                    muscle_group: MuscleGroup::Triceps,
                    set_number: 1,
                    reps: 12,
                    weight: 0.0,
                    rest_seconds: 60,
                },
            ]
        );
    }
}
