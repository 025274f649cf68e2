use std::collections::HashMap;

use anyhow::Result;

pub type Username = String;
pub type Password = String;

/// Credential-verification capability. `Ok(false)` rejects the login and
/// leaves the session alive; `Err` is a hard failure that terminates it.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, user: &str, pass: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct User {
    pub username: Username,
    pub password: Password,
}

/// [`Authorizer`] backed by a static user table.
pub struct UserTable {
    users: HashMap<Username, Password>,
}

impl UserTable {
    pub fn new(users: Vec<User>) -> UserTable {
        let users = users
            .into_iter()
            .map(|user| (user.username, user.password))
            .collect();
        UserTable { users }
    }
}

impl Authorizer for UserTable {
    fn authorize(&self, user: &str, pass: &str) -> Result<bool> {
        Ok(self.users.get(user).map_or(false, |known| known == pass))
    }
}
