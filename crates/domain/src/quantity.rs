use std::fmt;

use derive_more::Into;

#[derive(Debug, Default, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if value >= 1000 {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

impl fmt::Display for Reps {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// A weight in kilograms.
#[derive(Debug, Default, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        if (value * 10.0 % 1.0).abs() > f32::EPSILON {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

/// Formats without a trailing `.0`, so 60 kg is shown as `60` and 62.5 kg as `62.5`.
impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1 kg")]
    InvalidResolution,
    #[error("Weight must be a decimal")]
    ParseError,
}

/// Parses free-form weight input, treating anything unparseable as zero.
#[must_use]
pub fn parse_weight_or_zero(input: &str) -> f32 {
    input
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|w| w.is_finite())
        .unwrap_or_default()
}

/// Parses free-form reps input, treating anything unparseable as zero.
#[must_use]
pub fn parse_reps_or_zero(input: &str) -> u32 {
    input.trim().parse::<u32>().unwrap_or_default()
}

/// Weight times reps of a single set as entered by the user.
#[must_use]
pub fn set_volume(weight: &str, reps: &str) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let reps = parse_reps_or_zero(reps) as f32;
    parse_weight_or_zero(weight) * reps
}
