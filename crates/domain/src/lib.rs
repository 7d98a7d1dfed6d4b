#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
mod name;
pub mod progress;
mod quantity;
mod routine;
mod service;
mod user;
mod workout;

pub use error::*;
pub use exercise::*;
pub use name::*;
pub use quantity::*;
pub use routine::*;
pub use service::*;
pub use user::*;
pub use workout::*;
