use super::IUserRepo;
use crate::repos::shared::inmemory_repo::*;
use eventhub_domain::{User, ID};

pub struct InMemoryUserRepo {
    users: std::sync::Mutex<Vec<User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: std::sync::Mutex::new(vec![]),
        }
    }

    /// Stands in for the account side registering a `User`
    pub fn insert(&self, user: &User) {
        insert(user, &self.users);
    }
}

impl Default for InMemoryUserRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<User>> {
        Ok(find(user_id, &self.users))
    }
}
