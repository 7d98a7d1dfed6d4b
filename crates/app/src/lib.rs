#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod controller;
pub mod log;
mod service;
mod session;
mod settings;
pub mod timer;

pub use controller::{FinishError, SessionController};
pub use service::Service;
pub use session::{Msg, Phase, Session, SessionExercise, SessionSet, WorkoutSummary};
pub use settings::{Settings, SettingsRepository, SettingsService};
