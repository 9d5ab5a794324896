//! Session storage and lifecycle.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::info;

use super::{ChannelId, OwnerId, SessionContext};
use crate::error::ChatShellError;
use crate::Result;

/// A chat user's emulated shell.
#[derive(Debug, Clone)]
pub struct Session {
    /// User who started the session; the store key.
    pub owner: OwnerId,
    /// Only messages from this channel drive the session.
    pub channel: ChannelId,
    /// Working directory, history and last output.
    pub context: SessionContext,
    /// Message handle the renderer keeps updated. Opaque to the engine.
    pub render_target: Option<String>,
    /// Time when session was created.
    pub created_at: Instant,
    /// Time of last activity.
    pub last_activity: Instant,
}

impl Session {
    /// Create a new session rooted at `initial_dir`.
    pub fn new(owner: OwnerId, channel: ChannelId, initial_dir: impl Into<String>) -> Self {
        let now = Instant::now();
        Self {
            owner,
            channel,
            context: SessionContext::new(initial_dir),
            render_target: None,
            created_at: now,
            last_activity: now,
        }
    }

    /// The virtual working directory.
    pub fn current_dir(&self) -> &str {
        self.context.current_dir()
    }

    /// Update the last activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Get the idle duration since last activity.
    pub fn idle_duration(&self) -> Duration {
        self.last_activity.elapsed()
    }
}

/// A session shared between the store and in-flight commands.
///
/// Holding the mutex for the whole of a command serializes execution per
/// owner, so a `cd` can't race the command sent right after it.
pub type SharedSession = Arc<Mutex<Session>>;

/// Thread-safe registry of at most one session per owner.
pub struct SessionStore {
    sessions: RwLock<HashMap<OwnerId, SharedSession>>,
}

impl SessionStore {
    /// Create a new empty session store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session for `owner`.
    ///
    /// Fails with [`ChatShellError::AlreadyActiveSession`] if the owner
    /// already has one; the existing session is left untouched.
    pub fn start(
        &self,
        owner: OwnerId,
        channel: ChannelId,
        initial_dir: impl Into<String>,
    ) -> Result<SharedSession> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| ChatShellError::LockPoisoned)?;

        if sessions.contains_key(&owner) {
            return Err(ChatShellError::AlreadyActiveSession(owner.to_string()));
        }

        let session = Arc::new(Mutex::new(Session::new(
            owner.clone(),
            channel,
            initial_dir,
        )));
        sessions.insert(owner.clone(), Arc::clone(&session));
        info!(%owner, "session started");
        Ok(session)
    }

    /// End the session owned by `owner` on behalf of `requester`.
    ///
    /// Only the owner may end their session.
    pub fn end(&self, owner: &OwnerId, requester: &OwnerId) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| ChatShellError::LockPoisoned)?;

        if !sessions.contains_key(owner) {
            return Err(ChatShellError::SessionNotFound(owner.to_string()));
        }

        if owner != requester {
            return Err(ChatShellError::PermissionDenied {
                owner: owner.to_string(),
                requester: requester.to_string(),
            });
        }

        sessions.remove(owner);
        info!(%owner, "session ended");
        Ok(())
    }

    /// Look up the session for `owner`.
    pub fn get(&self, owner: &OwnerId) -> Result<Option<SharedSession>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| ChatShellError::LockPoisoned)?;
        Ok(sessions.get(owner).cloned())
    }

    /// Check if an owner has a session.
    pub fn contains(&self, owner: &OwnerId) -> Result<bool> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| ChatShellError::LockPoisoned)?;
        Ok(sessions.contains_key(owner))
    }

    /// Attach the renderer's message handle to a session.
    pub async fn set_render_target(&self, owner: &OwnerId, target: impl Into<String>) -> Result<()> {
        let session = self
            .get(owner)?
            .ok_or_else(|| ChatShellError::SessionNotFound(owner.to_string()))?;
        session.lock().await.render_target = Some(target.into());
        Ok(())
    }

    /// Get the number of sessions in the store.
    pub fn count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// List all owners with an active session.
    pub fn owners(&self) -> Result<Vec<OwnerId>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| ChatShellError::LockPoisoned)?;
        Ok(sessions.keys().cloned().collect())
    }

    /// Remove sessions idle for at least `max_idle`.
    ///
    /// A session whose mutex is held has a command in flight and is never
    /// evicted. Returns the owners that were removed.
    pub fn evict_idle(&self, max_idle: Duration) -> Result<Vec<OwnerId>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| ChatShellError::LockPoisoned)?;

        let mut evicted = Vec::new();
        sessions.retain(|owner, session| match session.try_lock() {
            Ok(guard) if guard.idle_duration() >= max_idle => {
                evicted.push(owner.clone());
                false
            }
            _ => true,
        });

        Ok(evicted)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name)
    }

    #[test]
    fn test_start_session() {
        let store = SessionStore::new();
        store
            .start(owner("alice"), ChannelId::new("ops"), "/tmp")
            .unwrap();

        assert!(store.contains(&owner("alice")).unwrap());
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_get_session() {
        let store = SessionStore::new();
        store
            .start(owner("alice"), ChannelId::new("ops"), "/srv/app")
            .unwrap();

        let session = store.get(&owner("alice")).unwrap().unwrap();
        let session = session.lock().await;
        assert_eq!(session.owner, owner("alice"));
        assert_eq!(session.channel, ChannelId::new("ops"));
        assert_eq!(session.current_dir(), "/srv/app");
    }

    #[test]
    fn test_get_nonexistent() {
        let store = SessionStore::new();
        assert!(store.get(&owner("nobody")).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_start_twice_rejected() {
        let store = SessionStore::new();
        store
            .start(owner("alice"), ChannelId::new("ops"), "/tmp")
            .unwrap();

        let err = store
            .start(owner("alice"), ChannelId::new("other"), "/")
            .unwrap_err();
        assert!(matches!(err, ChatShellError::AlreadyActiveSession(_)));

        // Original session is untouched
        let session = store.get(&owner("alice")).unwrap().unwrap();
        let session = session.lock().await;
        assert_eq!(session.channel, ChannelId::new("ops"));
        assert_eq!(session.current_dir(), "/tmp");
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_end_by_owner() {
        let store = SessionStore::new();
        store
            .start(owner("alice"), ChannelId::new("ops"), "/tmp")
            .unwrap();

        store.end(&owner("alice"), &owner("alice")).unwrap();
        assert!(store.get(&owner("alice")).unwrap().is_none());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_end_by_non_owner_rejected() {
        let store = SessionStore::new();
        store
            .start(owner("alice"), ChannelId::new("ops"), "/tmp")
            .unwrap();

        let err = store.end(&owner("alice"), &owner("mallory")).unwrap_err();
        assert!(matches!(err, ChatShellError::PermissionDenied { .. }));
        assert!(store.get(&owner("alice")).unwrap().is_some());
    }

    #[test]
    fn test_end_missing_session() {
        let store = SessionStore::new();
        let err = store.end(&owner("alice"), &owner("alice")).unwrap_err();
        assert!(matches!(err, ChatShellError::SessionNotFound(_)));
    }

    #[test]
    fn test_set_render_target() {
        let store = SessionStore::new();
        store
            .start(owner("alice"), ChannelId::new("ops"), "/tmp")
            .unwrap();

        tokio_test::block_on(async {
            store
                .set_render_target(&owner("alice"), "msg-123")
                .await
                .unwrap();

            let session = store.get(&owner("alice")).unwrap().unwrap();
            assert_eq!(
                session.lock().await.render_target.as_deref(),
                Some("msg-123")
            );
            assert!(store.set_render_target(&owner("bob"), "x").await.is_err());
        });
    }

    #[test]
    fn test_owners() {
        let store = SessionStore::new();
        store.start(owner("a"), ChannelId::new("c"), "/").unwrap();
        store.start(owner("b"), ChannelId::new("c"), "/").unwrap();

        let mut owners = store.owners().unwrap();
        owners.sort();
        assert_eq!(owners, vec![owner("a"), owner("b")]);
    }

    #[test]
    fn test_evict_idle() {
        let store = SessionStore::new();
        store.start(owner("a"), ChannelId::new("c"), "/").unwrap();

        assert!(store.evict_idle(Duration::from_secs(3600)).unwrap().is_empty());
        assert_eq!(store.count(), 1);

        let evicted = store.evict_idle(Duration::ZERO).unwrap();
        assert_eq!(evicted, vec![owner("a")]);
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_evict_skips_busy_session() {
        let store = SessionStore::new();
        let session = store.start(owner("a"), ChannelId::new("c"), "/").unwrap();

        let _guard = session.lock().await;
        assert!(store.evict_idle(Duration::ZERO).unwrap().is_empty());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_concurrent_start_same_owner() {
        use std::thread;

        let store = Arc::new(SessionStore::new());
        let mut handles = vec![];

        for i in 0..50 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store
                    .start(owner("alice"), ChannelId::new(format!("c{i}")), "/")
                    .is_ok()
            }));
        }

        let started = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(started, 1);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_concurrent_start_distinct_owners() {
        use std::thread;

        let store = Arc::new(SessionStore::new());
        let handles: Vec<_> = (0..100)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .start(owner(&format!("user{i}")), ChannelId::new("c"), "/")
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.count(), 100);
    }
}
