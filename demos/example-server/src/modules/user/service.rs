use super::model::{CreateUserRequest, User};
use rapidfast::prelude::*;
use serde_json::Value;

#[derive(Injectable)]
pub struct UserService {
    users: Arc<dyn Repository<User>>,
}

impl UserService {
    pub async fn create(&self, req: CreateUserRequest) -> Result<User> {
        let user = User {
            id: String::new(),
            name: req.name,
            email: req.email,
        };
        let user = self.users.save(user).await?;
        tracing::debug!(id = %user.id, "User created");
        Ok(user)
    }

    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        self.users.find_one_by(id).await
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.users.find().await
    }

    pub async fn update(&self, id: &str, patch: Value) -> Result<Option<User>> {
        self.users.update(id, patch).await
    }

    pub async fn remove(&self, id: &str) -> Result<bool> {
        self.users.delete(id).await
    }
}
