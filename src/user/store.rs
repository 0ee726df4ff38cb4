//! JSON file holding the whole user collection.
//!
//! Every operation reads the file again, mutations write the full collection
//! to a sibling temporary file and rename it over the original.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::user::{NewUser, User};

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("users file `{}` is corrupt: {source}", .path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to serialize users: {0}")]
    Serialize(serde_json::Error),
}

/// Users collection persisted as a JSON array.
#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    // Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl UserStore {
    /// Create a new [`UserStore`]. The file is only created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every user, in insertion order.
    pub async fn list(&self) -> Result<Vec<User>> {
        self.load().await
    }

    /// Find a user using its `id`.
    pub async fn find(&self, id: u64) -> Result<Option<User>> {
        Ok(self.load().await?.into_iter().find(|user| user.id == id))
    }

    /// Store `user` under the next identifier.
    pub async fn append(&self, user: NewUser) -> Result<User> {
        self.modify(|users| Ok::<_, StoreError>(push_next(users, user)))
            .await
    }

    /// Remove user `id`. Returns `false`, without writing, if absent.
    pub async fn delete(&self, id: u64) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut users = self.load().await?;

        let Some(index) = users.iter().position(|user| user.id == id) else {
            return Ok(false);
        };
        users.remove(index);

        self.persist(&users).await?;
        Ok(true)
    }

    /// Run `f` on the current collection and persist the result.
    ///
    /// Nothing is written if `f` fails.
    pub async fn modify<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Vec<User>) -> std::result::Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut users = self.load().await?;

        let value = f(&mut users)?;

        self.persist(&users).await?;
        Ok(value)
    }

    /// Sibling file receiving writes before the rename, `<file name>.tmp`.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn load(&self) -> Result<Vec<User>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "users file not found, starting empty");
                return Ok(Vec::new());
            },
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| {
            tracing::error!(path = %self.path.display(), error = %source, "users file is corrupt");
            StoreError::CorruptStore {
                path: self.path.clone(),
                source,
            }
        })
    }

    async fn persist(&self, users: &[User]) -> Result<()> {
        let body =
            serde_json::to_vec_pretty(users).map_err(StoreError::Serialize)?;
        let tmp = self.tmp_path();

        if let Some(parent) =
            self.path.parent().filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), users = users.len(), "users file written");
        Ok(())
    }
}

/// Append `user` with identifier `max(id) + 1`, or 1 on an empty collection.
pub fn push_next(users: &mut Vec<User>, user: NewUser) -> User {
    let id = users.iter().map(|u| u.id).max().map_or(1, |max| max + 1);
    let user = user.with_id(id);
    users.push(user.clone());
    user
}
