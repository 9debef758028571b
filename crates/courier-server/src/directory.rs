//! Process-wide session registry.
//!
//! The directory is the sole authority for username/email uniqueness and
//! peer lookup. Registration performs its uniqueness check and the insert
//! inside one critical section, so two racing registrations cannot both
//! claim a name.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;

use crate::session::Session;

/// Why a registration was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// Another session owns the username.
    #[error("username already registered: {0}")]
    UsernameTaken(String),

    /// Another session owns the email address.
    #[error("email already registered: {0}")]
    EmailTaken(String),
}

/// Registry of every session ever registered, keyed by username.
#[derive(Debug, Default)]
pub struct Directory {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl Directory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Arc<Session>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a session owns this username.
    pub fn has_username(&self, username: &str) -> bool {
        self.sessions().contains_key(username)
    }

    /// Whether a session owns this email address.
    pub fn has_email(&self, email: &str) -> bool {
        self.sessions().values().any(|session| session.email() == email)
    }

    /// Insert a freshly created session, enforcing uniqueness of both
    /// username and email atomically.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError`] without inserting when either identity is
    /// already claimed.
    pub fn register(&self, session: Arc<Session>) -> Result<(), RegisterError> {
        let mut sessions = self.sessions();
        if sessions.contains_key(session.username()) {
            return Err(RegisterError::UsernameTaken(session.username().to_owned()));
        }
        if sessions.values().any(|existing| existing.email() == session.email()) {
            return Err(RegisterError::EmailTaken(session.email().to_owned()));
        }
        sessions.insert(session.username().to_owned(), session);
        Ok(())
    }

    /// Resolve a username to its session.
    pub fn lookup(&self, username: &str) -> Option<Arc<Session>> {
        self.sessions().get(username).cloned()
    }

    /// Drop a session from the registry.
    ///
    /// Sessions persist across disconnects by design; this hook exists for
    /// rolling back a registration whose `SUCCESS` reply never reached the
    /// client.
    pub fn remove(&self, username: &str) -> Option<Arc<Session>> {
        self.sessions().remove(username)
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    /// Whether no session has registered yet.
    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_lookup() {
        let directory = Directory::new();
        let session = Session::new("alice", "alice@example.com", "pw");

        directory.register(Arc::clone(&session)).unwrap();

        assert!(directory.has_username("alice"));
        assert!(directory.has_email("alice@example.com"));
        let found = directory.lookup("alice").unwrap();
        assert!(Arc::ptr_eq(&found, &session));
    }

    #[test]
    fn duplicate_username_is_refused() {
        let directory = Directory::new();
        directory.register(Session::new("alice", "a@example.com", "pw")).unwrap();

        let err = directory.register(Session::new("alice", "b@example.com", "pw")).unwrap_err();
        assert_eq!(err, RegisterError::UsernameTaken("alice".to_owned()));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn duplicate_email_is_refused() {
        let directory = Directory::new();
        directory.register(Session::new("alice", "shared@example.com", "pw")).unwrap();

        let err = directory.register(Session::new("bob", "shared@example.com", "pw")).unwrap_err();
        assert_eq!(err, RegisterError::EmailTaken("shared@example.com".to_owned()));
        assert!(!directory.has_username("bob"));
    }

    #[test]
    fn lookup_unknown_is_none() {
        let directory = Directory::new();
        assert!(directory.lookup("nobody").is_none());
        assert!(directory.is_empty());
    }

    #[test]
    fn remove_unregisters() {
        let directory = Directory::new();
        directory.register(Session::new("alice", "a@example.com", "pw")).unwrap();

        assert!(directory.remove("alice").is_some());
        assert!(!directory.has_username("alice"));
        assert!(directory.remove("alice").is_none());
    }
}
