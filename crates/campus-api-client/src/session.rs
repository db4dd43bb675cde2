//! Application session context.
//!
//! The session (bearer token plus cached user object) is owned by an explicit
//! `SessionContext` that is passed to whatever needs it. It is loaded once at
//! startup from a `SessionStore` and cleared at logout or when the backend
//! rejects the token.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use campus_core::models::{Role, SessionUser};
use campus_core::{AppError, Capabilities};
use serde::{Deserialize, Serialize};

/// Persisted session state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

/// Local persistent key-value storage for the session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Session, AppError>;
    fn save(&self, session: &Session) -> Result<(), AppError>;
    fn clear(&self) -> Result<(), AppError>;
}

/// Session persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, AppError> {
        if !self.path.exists() {
            return Ok(Session::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Session::default());
        }
        serde_json::from_str(&raw).map_err(|e| {
            AppError::Session(format!(
                "Corrupt session file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, session: &Session) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store, for tests and one-shot invocations.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session, AppError> {
        Ok(self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, session: &Session) -> Result<(), AppError> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Session::default();
        Ok(())
    }
}

/// Shared handle on the current session. Cheap to clone.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    state: Arc<RwLock<Session>>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .field("role", &self.role())
            .finish()
    }
}

impl SessionContext {
    /// Empty (logged out) context backed by `store`; nothing is read yet.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(Session::default())),
        }
    }

    /// Context for a process that never persists anything.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Load the persisted session. A corrupt store is discarded and the user
    /// starts logged out.
    pub fn load_at_startup(store: Arc<dyn SessionStore>) -> Self {
        let context = Self::new(store);
        match context.store.load() {
            Ok(session) => *context.write() = session,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session");
                if let Err(e) = context.store.clear() {
                    tracing::warn!(error = %e, "Failed to clear unreadable session");
                }
            }
        }
        context
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a successful login and persist it.
    pub fn establish(&self, token: String, user: SessionUser) -> Result<(), AppError> {
        let session = Session {
            token: Some(token),
            user: Some(user),
        };
        self.store.save(&session)?;
        *self.write() = session;
        Ok(())
    }

    /// End the session (logout or rejected token).
    pub fn clear(&self) -> Result<(), AppError> {
        *self.write() = Session::default();
        self.store.clear()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    /// Role of the cached user; `Student` when nobody is logged in.
    pub fn role(&self) -> Role {
        self.read()
            .user
            .as_ref()
            .map(|u| u.role)
            .unwrap_or_default()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(self.role())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> SessionUser {
        SessionUser {
            id: Some(1),
            name: Some("Root".to_string()),
            role: Role::Admin,
            ..Default::default()
        }
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&path));

        let context = SessionContext::load_at_startup(store.clone());
        assert!(!context.is_authenticated());

        context.establish("tok".to_string(), admin()).unwrap();
        assert!(path.exists());

        let reloaded = SessionContext::load_at_startup(store.clone());
        assert_eq!(reloaded.token().as_deref(), Some("tok"));
        assert_eq!(reloaded.role(), Role::Admin);
        assert!(reloaded.capabilities().can_delete);

        reloaded.clear().unwrap();
        assert!(!path.exists());
        assert!(!reloaded.is_authenticated());
        assert_eq!(reloaded.role(), Role::Student);
    }

    #[test]
    fn test_corrupt_session_file_starts_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let context = SessionContext::load_at_startup(Arc::new(FileSessionStore::new(&path)));
        assert!(!context.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn test_clones_share_state() {
        let context = SessionContext::in_memory();
        let other = context.clone();
        context.establish("t".to_string(), admin()).unwrap();
        assert!(other.is_authenticated());
        other.clear().unwrap();
        assert!(!context.is_authenticated());
    }
}
