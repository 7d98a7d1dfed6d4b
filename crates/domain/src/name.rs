use derive_more::{AsRef, Display};

/// A user, exercise or routine name.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);

impl Name {
    pub const MAX_LEN: usize = 64;

    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed.chars().count();

        if len > Self::MAX_LEN {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed.to_string()))
    }

    #[must_use]
    pub fn matches(&self, other: &Name) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Push Day", Ok(Name("Push Day".to_string())))]
    #[case("  Bench Press \n", Ok(Name("Bench Press".to_string())))]
    #[case("   ", Err(NameError::Empty))]
    #[case(&"x".repeat(64), Ok(Name("x".repeat(64))))]
    #[case(&"x".repeat(65), Err(NameError::TooLong(65)))]
    #[case(&"ü".repeat(64), Ok(Name("ü".repeat(64))))]
    fn test_name_new(#[case] name: &str, #[case] expected: Result<Name, NameError>) {
        assert_eq!(Name::new(name), expected);
    }

    #[test]
    fn test_name_matches_ignores_case() {
        let name = Name::new("Bench Press").unwrap();
        assert!(name.matches(&Name::new("bench press").unwrap()));
        assert!(!name.matches(&Name::new("Bench").unwrap()));
    }
}
