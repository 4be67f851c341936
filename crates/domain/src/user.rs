use crate::shared::entity::{Entity, ID};

/// A `User` of the platform. Owned by the account management side, the
/// reminder core only reads the name and email.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}
