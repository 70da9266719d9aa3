//! Explicit session object shared by every client of one app.
//!
//! Built once at startup and handed out as `Arc<Session>`. Holds the bearer
//! credential (mirrored into a `CredentialStore`) and broadcasts session
//! changes on a single channel.

use jifeng_core::{Result, SessionScope, UserInfo};
use jifeng_persistence::CredentialStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 16;

/// Session lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { username: String },
    LoggedOut,
    /// The backend rejected the credential; it has already been cleared
    Invalidated { message: String },
}

pub struct Session {
    scope: SessionScope,
    store: Arc<dyn CredentialStore>,
    token: RwLock<Option<String>>,
    profile: RwLock<Option<UserInfo>>,
    events: broadcast::Sender<SessionEvent>,
    /// Set from an invalidation until the next credential is stored
    invalidating: AtomicBool,
}

impl Session {
    /// Create an empty session for `scope`
    pub fn new(scope: SessionScope, store: Arc<dyn CredentialStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            scope,
            store,
            token: RwLock::new(None),
            profile: RwLock::new(None),
            events,
            invalidating: AtomicBool::new(false),
        }
    }

    /// Create a session and load any credential persisted for `scope`
    pub async fn restore(scope: SessionScope, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let session = Self::new(scope, store);
        let saved = session.store.get(scope.storage_key()).await?;
        if saved.is_some() {
            debug!("Restored {:?} credential from store", scope);
        }
        *session.token.write().await = saved;
        Ok(session)
    }

    pub fn scope(&self) -> SessionScope {
        self.scope
    }

    /// Current bearer credential, read before every outgoing call
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub async fn profile(&self) -> Option<UserInfo> {
        self.profile.read().await.clone()
    }

    /// Store a freshly issued credential
    pub async fn set_credential(&self, token: &str, profile: Option<UserInfo>) -> Result<()> {
        self.store.set(self.scope.storage_key(), token).await?;
        *self.token.write().await = Some(token.to_string());

        let username = profile
            .as_ref()
            .map(|p| p.username.clone())
            .unwrap_or_default();
        *self.profile.write().await = profile;

        self.invalidating.store(false, Ordering::SeqCst);
        info!("{:?} session established for {}", self.scope, username);
        let _ = self.events.send(SessionEvent::LoggedIn { username });
        Ok(())
    }

    /// Explicit logout
    pub async fn clear(&self) -> Result<()> {
        self.token.write().await.take();
        self.profile.write().await.take();
        self.store.remove(self.scope.storage_key()).await?;
        let _ = self.events.send(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Drop the credential after the backend rejected it.
    ///
    /// Returns `false` without doing anything if the credential was
    /// already invalidated and no new one has been set since.
    pub async fn invalidate(&self, message: &str) -> bool {
        if self.invalidating.swap(true, Ordering::SeqCst) {
            debug!("Invalidation already in progress, suppressing: {}", message);
            return false;
        }

        self.token.write().await.take();
        self.profile.write().await.take();
        if let Err(e) = self.store.remove(self.scope.storage_key()).await {
            warn!("Failed to remove stored credential: {}", e);
        }

        warn!("{:?} session invalidated: {}", self.scope, message);
        let _ = self.events.send(SessionEvent::Invalidated {
            message: message.to_string(),
        });
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jifeng_persistence::MemoryCredentialStore;

    fn profile() -> UserInfo {
        UserInfo {
            user_id: "u-1".into(),
            username: "alice".into(),
            nickname: None,
        }
    }

    #[tokio::test]
    async fn test_restore_reads_scope_key() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.set("admin_token", "admin-abc").await.unwrap();

        let member = Session::restore(SessionScope::Member, store.clone()).await.unwrap();
        let admin = Session::restore(SessionScope::Admin, store).await.unwrap();

        assert_eq!(member.token().await, None);
        assert_eq!(admin.token().await.as_deref(), Some("admin-abc"));
    }

    #[tokio::test]
    async fn test_set_and_clear_persist_through_store() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = Session::new(SessionScope::Member, store.clone());
        let mut events = session.subscribe();

        session.set_credential("abc", Some(profile())).await.unwrap();
        assert_eq!(store.get("token").await.unwrap().as_deref(), Some("abc"));
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedIn { username: "alice".into() }
        );

        session.clear().await.unwrap();
        assert!(!session.is_authenticated().await);
        assert_eq!(store.get("token").await.unwrap(), None);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent_until_next_login() {
        let store = Arc::new(MemoryCredentialStore::new());
        let session = Session::new(SessionScope::Member, store.clone());
        session.set_credential("abc", Some(profile())).await.unwrap();
        let mut events = session.subscribe();

        assert!(session.invalidate("登录已过期").await);
        assert!(!session.invalidate("登录已过期").await);
        assert_eq!(session.token().await, None);
        assert_eq!(store.get("token").await.unwrap(), None);

        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::Invalidated { message: "登录已过期".into() }
        );
        assert!(events.try_recv().is_err());

        // Logging out does not re-arm; a fresh credential does
        session.clear().await.unwrap();
        assert!(!session.invalidate("again").await);
        session.set_credential("def", Some(profile())).await.unwrap();
        assert!(session.invalidate("again").await);
    }
}
