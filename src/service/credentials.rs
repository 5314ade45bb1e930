use crate::db::Storage;
use crate::error::StockError;
use tracing::{debug, info};

/// Registers accounts and checks username/password pairs.
///
/// Passwords are compared and stored as plain text. No session is created
/// here; what happens after a successful login is up to the caller.
#[derive(Clone)]
pub struct CredentialService {
    storage: Storage,
}

impl CredentialService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Create an account. `Ok(false)` means the username is already taken.
    /// Empty fields are rejected before touching storage.
    pub async fn register(&self, username: &str, password: &str) -> Result<bool, StockError> {
        if username.is_empty() {
            return Err(StockError::validation("username", "required"));
        }
        if password.is_empty() {
            return Err(StockError::validation("password", "required"));
        }

        match self.storage.insert_user(username, password).await? {
            Some(id) => {
                info!(user_id = id, username, "user registered");
                Ok(true)
            }
            None => {
                info!(username, "registration rejected: username exists");
                Ok(false)
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<bool, StockError> {
        let ok = self.storage.find_user(username, password).await?;
        debug!(username, success = ok, "login attempt");
        Ok(ok)
    }
}
