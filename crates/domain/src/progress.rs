use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{ExerciseID, PerformanceLog, WorkoutLog};

/// Total volume of each workout, ordered by start time.
#[must_use]
pub fn volume_per_workout(workout_logs: &[WorkoutLog]) -> Vec<(NaiveDate, f32)> {
    let mut logs = workout_logs.iter().collect::<Vec<_>>();
    logs.sort_by_key(|l| l.start);
    logs.iter()
        .map(|l| (l.start.date_naive(), l.total_volume))
        .collect()
}

/// The heaviest set of each exercise; more reps win on equal weight.
#[must_use]
pub fn best_set_per_exercise(
    performance_logs: &[PerformanceLog],
) -> BTreeMap<ExerciseID, &PerformanceLog> {
    let mut result: BTreeMap<ExerciseID, &PerformanceLog> = BTreeMap::new();
    for log in performance_logs {
        result
            .entry(log.exercise_id)
            .and_modify(|best| {
                if (log.weight, log.reps) > (best.weight, best.reps) {
                    *best = log;
                }
            })
            .or_insert(log);
    }
    result
}

/// Epley estimate of the one-repetition maximum.
#[must_use]
pub fn estimated_one_rep_max(weight: f32, reps: u32) -> f32 {
    match reps {
        0 => 0.0,
        1 => weight,
        #[allow(clippy::cast_precision_loss)]
        _ => weight * (1.0 + reps as f32 / 30.0),
    }
}
