use std::{ops::ControlFlow, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

pub const TICK: Duration = Duration::from_secs(1);

/// A periodic task that can be cancelled at any time.
///
/// The first tick fires one period after [`Ticker::start`]. The task ends when the tick function
/// returns [`ControlFlow::Break`], when [`Ticker::stop`] is called or when the ticker is dropped.
#[derive(Default)]
pub struct Ticker {
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Starts ticking, cancelling a previously started task of this ticker.
    pub fn start<F>(&mut self, period: Duration, mut tick: F)
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        self.stop();
        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tick().is_break() {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
