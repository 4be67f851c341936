mod inmemory;
mod mongo;

use eventhub_domain::{User, ID};
pub use inmemory::InMemoryUserRepo;
pub use mongo::MongoUserRepo;

/// Read access to the `User`s managed by the account side of the platform
#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_inserted_users_only() {
        let repo = InMemoryUserRepo::new();
        let user = User::new("An", "an@example.com");
        repo.insert(&user);

        assert_eq!(repo.find(&user.id).await.expect("To query"), Some(user));
        assert!(repo.find(&ID::new()).await.expect("To query").is_none());
    }
}
