use crate::backend::Caller;
use crate::types::{AuthToken, Identity, Level};
use async_trait::async_trait;

/// Persisted `(token, identity)` pair.
///
/// Read at startup, written on successful login, cleared on logout. The
/// storage mechanism (browser storage, a config file) is the caller's choice.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoredCredentials {
    pub token: AuthToken,
    pub identity: Identity,
}

/// Durable storage interface for session credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the persisted credentials, if any.
    async fn load(&self) -> Option<StoredCredentials>;

    /// Persists credentials, replacing any previous pair.
    async fn store(&self, credentials: StoredCredentials);

    /// Clears persisted credentials.
    async fn clear(&self);
}

/// No-op credential store; every session starts anonymous.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentialStore;

#[async_trait]
impl CredentialStore for NoCredentialStore {
    async fn load(&self) -> Option<StoredCredentials> {
        None
    }

    async fn store(&self, _credentials: StoredCredentials) {}

    async fn clear(&self) {}
}

/// The current caller's session: token, identity, and backend-derived level.
///
/// A session never upgrades its own level; it is re-derived from the backend
/// on every refresh. An explicit value object rather than ambient global
/// state, so the coordinator can stamp requests from it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Session {
    credentials: Option<StoredCredentials>,
    level: Level,
}

impl Session {
    /// An anonymous session with no credentials.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session the backend classified at the given level.
    pub fn classified(credentials: StoredCredentials, level: Level) -> Self {
        Self {
            credentials: Some(credentials),
            level,
        }
    }

    /// Current authorization level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Identity the session is attributed to, if signed in.
    pub fn identity(&self) -> Option<&Identity> {
        self.credentials.as_ref().map(|c| &c.identity)
    }

    /// The `(identity, token)` pair to stamp on authenticated calls.
    ///
    /// `None` for anonymous sessions, including classified-but-rejected ones.
    pub fn caller(&self) -> Option<Caller> {
        if self.level == Level::Anonymous {
            return None;
        }
        self.credentials.as_ref().map(|c| Caller {
            identity: c.identity.clone(),
            token: c.token.clone(),
        })
    }
}
