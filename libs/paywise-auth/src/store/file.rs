use std::path::{Path, PathBuf};

use async_trait::async_trait;
use paywise_utils::SecretString;
use tokio::sync::Mutex;

use super::{SessionError, SessionStore, StoredSession};
use crate::session::{Session, UserProfile};

/// JSON file session store used by the CLI.
///
/// The file is the source of truth: every read goes to disk, so two
/// processes sharing a file see each other's token rotations. A missing file
/// is an empty session. Writes go through a temporary file and a rename, and
/// on unix the file is created with mode `0600`.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    write_guard: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_guard: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoredSession, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoredSession::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, state: &StoredSession) -> Result<(), SessionError> {
        if state.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = zeroize::Zeroizing::new(serde_json::to_vec_pretty(state)?);
        let tmp = self.path.with_extension("json.tmp");
        write_private(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "session file written");
        Ok(())
    }

    async fn update(&self, f: impl FnOnce(&mut StoredSession) + Send) -> Result<(), SessionError> {
        let _guard = self.write_guard.lock().await;
        let mut state = self.load().await?;
        f(&mut state);
        self.persist(&state).await
    }
}

#[cfg(unix)]
async fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[cfg(not(unix))]
async fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(path, bytes).await
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn access_token(&self) -> Result<Option<SecretString>, SessionError> {
        Ok(self.load().await?.access_token)
    }

    async fn refresh_token(&self) -> Result<Option<SecretString>, SessionError> {
        Ok(self.load().await?.refresh_token)
    }

    async fn user(&self) -> Result<Option<UserProfile>, SessionError> {
        Ok(self.load().await?.user)
    }

    async fn set_access_token(&self, token: SecretString) -> Result<(), SessionError> {
        self.update(move |state| state.access_token = Some(token))
            .await
    }

    async fn save(&self, session: Session) -> Result<(), SessionError> {
        self.update(move |state| *state = session.into()).await
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.update(|state| *state = StoredSession::default()).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            access_token: "acc".into(),
            refresh_token: "ref".into(),
            user: UserProfile {
                id: 11,
                email: "dev@paywise.in".to_owned(),
                first_name: Some("Dev".to_owned()),
                last_name: Some("Rao".to_owned()),
                is_email_verified: Some(false),
            },
        }
    }

    #[tokio::test]
    async fn missing_file_is_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_creates_parent_dirs_and_uses_wire_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".paywise").join("session.json");
        let store = FileSessionStore::new(&path);

        store.save(session()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["access_token"], "acc");
        assert_eq!(raw["refresh_token"], "ref");
        assert_eq!(raw["user"]["email"], "dev@paywise.in");
    }

    #[tokio::test]
    async fn rotation_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        FileSessionStore::new(&path).save(session()).await.unwrap();
        FileSessionStore::new(&path)
            .set_access_token("acc-2".into())
            .await
            .unwrap();

        let reopened = FileSessionStore::new(&path);
        assert_eq!(
            reopened.access_token().await.unwrap(),
            Some(SecretString::from("acc-2"))
        );
        assert_eq!(
            reopened.refresh_token().await.unwrap(),
            Some(SecretString::from("ref"))
        );
    }

    #[tokio::test]
    async fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);

        store.save(session()).await.unwrap();
        assert!(path.exists());
        store.clear().await.unwrap();
        assert!(!path.exists());
        // clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(
            store.access_token().await,
            Err(SessionError::Serde(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileSessionStore::new(&path).save(session()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
