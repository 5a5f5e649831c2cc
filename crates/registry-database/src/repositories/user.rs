//! User repository implementation.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use registry_core::error::AppError;
use registry_core::result::AppResult;
use registry_core::traits::{Collection, Record, RecordStore};
use registry_entity::user::User;

use super::codec;

const COLLECTION: Collection = Collection::Users;
const USERNAME_KEYS: &[&str] = &["username", "usuario"];
const PASSWORD_KEYS: &[&str] = &["password_hash", "senha"];

fn username_of(record: &Record) -> Option<&str> {
    codec::string_field(record, USERNAME_KEYS)
}

/// Repository for user accounts.
#[derive(Debug)]
pub struct UserRepository {
    store: Arc<dyn RecordStore>,
    lock: Mutex<()>,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// All accounts in registration order.
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        let records = self.store.load(COLLECTION).await?;
        Ok(codec::decode_all(COLLECTION, records))
    }

    /// Find an account by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let records = self.store.load(COLLECTION).await?;
        records
            .into_iter()
            .find(|r| username_of(r) == Some(username))
            .map(codec::decode::<User>)
            .transpose()
            .map_err(AppError::from)
    }

    /// Number of stored accounts.
    pub async fn count(&self) -> AppResult<usize> {
        Ok(self.store.load(COLLECTION).await?.len())
    }

    /// Insert a new account. Fails with Conflict if the username is taken.
    pub async fn create(&self, user: &User) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.store.load(COLLECTION).await?;

        if records
            .iter()
            .any(|r| username_of(r) == Some(user.username.as_str()))
        {
            return Err(AppError::conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }

        records.push(codec::encode(user)?);
        self.store.save(COLLECTION, &records).await?;
        debug!(username = %user.username, "User record created");
        Ok(())
    }

    /// Replace the stored password hash of an account.
    ///
    /// A legacy `senha` key is dropped in favour of `password_hash`; other
    /// fields are left as they are.
    pub async fn update_password_hash(&self, username: &str, password_hash: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.store.load(COLLECTION).await?;

        let record = records
            .iter_mut()
            .find(|r| username_of(r) == Some(username))
            .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;
        for key in PASSWORD_KEYS {
            record.shift_remove(*key);
        }
        record.insert(
            "password_hash".to_string(),
            serde_json::Value::String(password_hash.to_string()),
        );

        self.store.save(COLLECTION, &records).await?;
        debug!(username = %username, "Password hash replaced");
        Ok(())
    }

    /// Remove an account. Fails with NotFound if it does not exist.
    pub async fn delete(&self, username: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.store.load(COLLECTION).await?;

        let before = records.len();
        records.retain(|r| username_of(r) != Some(username));
        if records.len() == before {
            return Err(AppError::not_found(format!("User '{username}' not found")));
        }

        self.store.save(COLLECTION, &records).await?;
        debug!(username = %username, "User record deleted");
        Ok(())
    }
}
