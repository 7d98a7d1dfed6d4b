use std::{
    ops::ControlFlow,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::Utc;
use liftlog_domain::{
    CreateError, ReadError, Routine, RoutineID, RoutineService, UserService, WorkoutLogID,
    WorkoutService,
};
use log::{debug, info, warn};
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
};

use crate::{
    Msg, Phase, Session, Settings, WorkoutSummary,
    timer::{TICK, Ticker},
};

#[derive(thiserror::Error, Debug)]
pub enum FinishError {
    #[error("session is not active")]
    NotActive,
    #[error("no user")]
    NoUser,
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Create(#[from] CreateError),
}

/// Drives one workout session of a routine.
///
/// The controller owns the session state and three independent timers: the countdown before the
/// start, the elapsed time while the session is active and the rest timer between sets. A
/// fourth task follows changes of the routine. All tasks are cancelled when the controller is
/// dropped.
pub struct SessionController<S> {
    service: S,
    settings: Settings,
    routine: watch::Receiver<Option<Routine>>,
    inner: Arc<Inner>,
    routine_task: JoinHandle<()>,
    finishing: AtomicBool,
    navigation: Mutex<Option<oneshot::Sender<WorkoutSummary>>>,
    navigation_receiver: Mutex<Option<oneshot::Receiver<WorkoutSummary>>>,
}

impl<S> SessionController<S>
where
    S: RoutineService + UserService + WorkoutService,
{
    pub async fn new(
        service: S,
        routine_id: RoutineID,
        settings: Settings,
    ) -> Result<Self, ReadError> {
        let mut routine = service.observe_routine(routine_id).await?;

        let session = match routine.borrow_and_update().clone() {
            Some(routine) => Session::default().update(Msg::RoutineChanged(routine)),
            None => {
                debug!("routine {} not available yet", *routine_id);
                Session::default()
            }
        };
        let (state, _) = watch::channel(session);
        let inner = Arc::new(Inner {
            state,
            timers: Mutex::default(),
        });
        let routine_task = tokio::spawn(follow_routine(Arc::downgrade(&inner), routine.clone()));
        let (navigation, navigation_receiver) = oneshot::channel();

        Ok(Self {
            service,
            settings,
            routine,
            inner,
            routine_task,
            finishing: AtomicBool::new(false),
            navigation: Mutex::new(Some(navigation)),
            navigation_receiver: Mutex::new(Some(navigation_receiver)),
        })
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Returns the receiver of the navigation event on the first call and `None` afterwards.
    pub fn take_navigation(&self) -> Option<oneshot::Receiver<WorkoutSummary>> {
        lock(&self.navigation_receiver).take()
    }

    /// Starts the countdown of an idle session or finishes an active one.
    ///
    /// Has no effect while the routine is still loading.
    pub async fn request_toggle(&self) -> Result<(), FinishError> {
        match self.snapshot().phase {
            Phase::Active => self.finish().await.map(|_| ()),
            Phase::Loading | Phase::Idle | Phase::CountingDown | Phase::Finished => {
                self.start();
                Ok(())
            }
        }
    }

    pub fn start(&self) {
        let transition = self
            .inner
            .dispatch(Msg::StartCountdown(self.settings.countdown_seconds));

        match transition.before.phase {
            Phase::Idle => {}
            Phase::Loading => {
                debug!("ignored start before routine is loaded");
                return;
            }
            Phase::CountingDown | Phase::Active | Phase::Finished => return,
        }

        match transition.after.phase {
            Phase::CountingDown => {
                info!(
                    "starting {} in {} s",
                    transition.after.routine_name, transition.after.countdown_remaining
                );
                self.inner.start_countdown();
            }
            Phase::Active => {
                info!("started {}", transition.after.routine_name);
                self.inner.start_elapsed();
            }
            Phase::Loading | Phase::Idle | Phase::Finished => {}
        }
    }

    pub fn update_set(&self, exercise_idx: usize, set_idx: usize, weight: &str, reps: &str) {
        self.dispatch_set_msg(
            "set change",
            Msg::SetChanged {
                exercise_idx,
                set_idx,
                weight: weight.to_string(),
                reps: reps.to_string(),
            },
        );
    }

    pub fn add_set(&self, exercise_idx: usize) {
        self.dispatch_set_msg("added set", Msg::SetAdded(exercise_idx));
    }

    pub fn update_rest_time(&self, exercise_idx: usize, seconds: u32) {
        self.inner
            .dispatch(Msg::RestTimeChanged(exercise_idx, seconds));
    }

    /// Marks a set as completed or not completed.
    ///
    /// Completing a set (re)starts the rest timer with the current rest duration of the exercise.
    /// Marking a set as not completed leaves a running rest timer untouched.
    pub fn set_completion(&self, exercise_idx: usize, set_idx: usize, completed: bool) {
        let transition = self.dispatch_set_msg(
            "set completion",
            Msg::SetCompleted(exercise_idx, set_idx, completed),
        );
        let was_completed = transition
            .before
            .set(exercise_idx, set_idx)
            .is_some_and(|s| s.completed);
        let is_completed = transition
            .after
            .set(exercise_idx, set_idx)
            .is_some_and(|s| s.completed);

        if !was_completed && is_completed {
            if let Some(exercise) = transition.after.exercises.get(exercise_idx) {
                self.inner.start_rest(exercise.rest_seconds);
            }
        }
    }

    pub fn stop_rest(&self) {
        self.inner.stop_rest();
    }

    pub fn extend_rest(&self) {
        self.inner
            .dispatch(Msg::RestExtended(self.settings.rest_extension_seconds));
    }

    /// Stores the workout and ends the session.
    ///
    /// On error the session stays active and finishing can be retried.
    pub async fn finish(&self) -> Result<WorkoutSummary, FinishError> {
        if self.finishing.swap(true, Ordering::SeqCst) {
            return Err(FinishError::NotActive);
        }
        let result = self.finish_active().await;
        self.finishing.store(false, Ordering::SeqCst);
        result
    }

    /// Cancels all timers and discards the session without storing anything.
    pub fn abandon(self) {
        info!("abandoned {}", self.inner.state.borrow().routine_name);
    }

    async fn finish_active(&self) -> Result<WorkoutSummary, FinishError> {
        if !self.inner.state.borrow().is_active() {
            return Err(FinishError::NotActive);
        }

        let Some(user) = self.service.get_user().await? else {
            warn!("failed to finish session: no user");
            return Err(FinishError::NoUser);
        };

        self.inner.timers().elapsed.stop();

        let session = self.snapshot();
        let workout_log = session.workout_log(WorkoutLogID::new(), user.id, Utc::now());
        let performance_logs = session.performance_logs(workout_log.id);

        let workout_log = match self
            .service
            .create_workout_log(workout_log, performance_logs)
            .await
        {
            Ok(workout_log) => workout_log,
            Err(err) => {
                self.inner.start_elapsed();
                return Err(err.into());
            }
        };

        self.inner.timers().stop_all();
        self.inner.dispatch(Msg::Finished);

        self.write_back_rest_durations(&session).await;

        let summary = WorkoutSummary {
            routine_name: workout_log.routine_name,
            duration_seconds: workout_log.duration_seconds,
            total_volume: workout_log.total_volume,
        };
        info!(
            "finished {} after {} s with volume {}",
            summary.routine_name, summary.duration_seconds, summary.total_volume
        );

        if let Some(navigation) = lock(&self.navigation).take() {
            let _ = navigation.send(summary.clone());
        }

        Ok(summary)
    }

    async fn write_back_rest_durations(&self, session: &Session) {
        let changes = match self.routine.borrow().as_ref() {
            Some(routine) => session
                .exercises
                .iter()
                .filter(|exercise| {
                    routine
                        .exercise(exercise.exercise_id)
                        .is_some_and(|e| e.rest_seconds != exercise.rest_seconds)
                })
                .map(|exercise| (exercise.exercise_id, exercise.rest_seconds))
                .collect::<Vec<_>>(),
            None => vec![],
        };

        for (exercise_id, rest_seconds) in changes {
            if let Err(err) = self
                .service
                .update_rest_duration(session.routine_id, exercise_id, rest_seconds)
                .await
            {
                warn!(
                    "rest duration of exercise {} not kept: {err}",
                    *exercise_id
                );
            }
        }
    }

    fn dispatch_set_msg(&self, action: &str, msg: Msg) -> Transition {
        let transition = self.inner.dispatch(msg);
        if !transition.before.is_active() {
            debug!("ignored {action} outside of active session");
        }
        transition
    }
}

impl<S> Drop for SessionController<S> {
    fn drop(&mut self) {
        self.routine_task.abort();
        self.inner.timers().stop_all();
    }
}

struct Inner {
    state: watch::Sender<Session>,
    timers: Mutex<Timers>,
}

#[derive(Default)]
struct Timers {
    countdown: Ticker,
    elapsed: Ticker,
    rest: Ticker,
}

impl Timers {
    fn stop_all(&mut self) {
        self.countdown.stop();
        self.elapsed.stop();
        self.rest.stop();
    }
}

#[derive(Default)]
struct Transition {
    before: Session,
    after: Session,
}

impl Inner {
    /// Replaces the session by the snapshot derived from the message.
    fn dispatch(&self, msg: Msg) -> Transition {
        let mut transition = Transition::default();
        self.state.send_if_modified(|session| {
            let next = session.update(msg);
            let modified = next != *session;
            transition.after = next.clone();
            transition.before = std::mem::replace(session, next);
            modified
        });
        transition
    }

    fn timers(&self) -> MutexGuard<'_, Timers> {
        lock(&self.timers)
    }

    fn start_countdown(self: &Arc<Self>) {
        let inner = Arc::downgrade(self);
        self.timers().countdown.start(TICK, move || {
            let Some(inner) = inner.upgrade() else {
                return ControlFlow::Break(());
            };
            let session = inner.dispatch(Msg::CountdownTick).after;
            if session.is_active() {
                info!("started {}", session.routine_name);
                inner.start_elapsed();
                ControlFlow::Break(())
            } else if session.is_counting_down() {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });
    }

    fn start_elapsed(self: &Arc<Self>) {
        let inner = Arc::downgrade(self);
        self.timers().elapsed.start(TICK, move || {
            let Some(inner) = inner.upgrade() else {
                return ControlFlow::Break(());
            };
            if inner.dispatch(Msg::ElapsedTick).after.is_active() {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });
    }

    fn start_rest(self: &Arc<Self>, seconds: u32) {
        let mut timers = self.timers();
        timers.rest.stop();

        let run = self.dispatch(Msg::RestStarted(seconds)).after.rest_run;
        if seconds == 0 {
            return;
        }

        let inner = Arc::downgrade(self);
        timers.rest.start(TICK, move || {
            let Some(inner) = inner.upgrade() else {
                return ControlFlow::Break(());
            };
            let session = inner.dispatch(Msg::RestTick(run)).after;
            if session.rest_active && session.rest_run == run {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });
    }

    fn stop_rest(&self) {
        self.timers().rest.stop();
        self.dispatch(Msg::RestStopped);
    }
}

async fn follow_routine(inner: Weak<Inner>, mut routine: watch::Receiver<Option<Routine>>) {
    while routine.changed().await.is_ok() {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let changed = routine.borrow_and_update().clone();
        match changed {
            Some(routine) => {
                debug!("routine {} changed", routine.name);
                inner.dispatch(Msg::RoutineChanged(routine));
            }
            None => warn!("routine removed during session"),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
