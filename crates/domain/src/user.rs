use derive_more::Deref;
use uuid::Uuid;

use crate::{CreateError, Name, ReadError};

#[allow(async_fn_in_trait)]
pub trait UserService {
    /// Returns the local user, if one has been created.
    async fn get_user(&self) -> Result<Option<User>, ReadError>;
    async fn create_user(&self, name: Name) -> Result<User, CreateError>;
}

#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn read_user(&self) -> Result<Option<User>, ReadError>;
    async fn create_user(&self, name: Name) -> Result<User, CreateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub name: Name,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserID(Uuid);

impl UserID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for UserID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for UserID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_user_id_nil() {
        assert!(UserID::nil().is_nil());
        assert_eq!(UserID::nil(), UserID::default());
        assert!(!UserID::from(1).is_nil());
    }
}
