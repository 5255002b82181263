//! Per-user locked session store.

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use {
    dashmap::DashMap,
    tokio::sync::{Mutex, OwnedMutexGuard},
    tracing::debug,
};

#[cfg(feature = "metrics")]
use quandary_metrics::{counter, gauge, sessions as session_metrics};

use crate::{MemorySessionBackend, Result, Session, SessionBackend, User};

type Locks = DashMap<String, Arc<Mutex<()>>>;

/// Exclusive access to one user for the length of a dispatch.
///
/// The record is read from the backend when the guard is taken. Changes are
/// only kept if [`SessionStore::save`] is called before the guard drops.
pub struct UserGuard {
    user: User,
    lock: Option<OwnedMutexGuard<()>>,
    locks: Arc<Locks>,
}

impl Deref for UserGuard {
    type Target = User;

    fn deref(&self) -> &User {
        &self.user
    }
}

impl DerefMut for UserGuard {
    fn deref_mut(&mut self) -> &mut User {
        &mut self.user
    }
}

impl Drop for UserGuard {
    fn drop(&mut self) {
        drop(self.lock.take());
        // Only the map's own reference left: nobody holds or waits on the lock.
        self.locks
            .remove_if(&self.user.id, |_, lock| Arc::strong_count(lock) == 1);
        #[cfg(feature = "metrics")]
        gauge!(session_metrics::ACTIVE).set(self.locks.len() as f64);
    }
}

/// Finds or creates users and serializes access per user id.
///
/// The backend holds the record. The in-memory map only carries a lock per
/// user with a dispatch in flight, and the entry goes away with the last
/// guard. Different users proceed in parallel. A second event from the same
/// user waits until the first dispatch drops its [`UserGuard`].
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    locks: Arc<Locks>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionBackend::new()))
    }

    /// Lock the user, then load their record from the backend or create it.
    pub async fn find_or_create(&self, user_id: &str) -> Result<UserGuard> {
        let lock = self.lock(user_id).await;
        // Built before the read so an error still releases the lock entry.
        let mut user = self.guard(User::new(user_id), lock);
        match self.backend.get(user_id).await? {
            Some(session) => user.session = session,
            None => {
                debug!(user_id, "new user");
                #[cfg(feature = "metrics")]
                counter!(session_metrics::CREATED_TOTAL).increment(1);
            },
        }
        Ok(user)
    }

    /// Persist the user's session. Call while still holding the guard.
    pub async fn save(&self, user: &User) -> Result<()> {
        self.backend.put(&user.id, &user.session).await
    }

    /// Read a user's stored session without creating the user.
    pub async fn load(&self, user_id: &str) -> Result<Option<Session>> {
        self.backend.get(user_id).await
    }

    /// Forget a user entirely. Waits for any in-flight dispatch for them.
    pub async fn clear(&self, user_id: &str) -> Result<bool> {
        let lock = self.lock(user_id).await;
        let guard = self.guard(User::new(user_id), lock);
        let deleted = self.backend.delete(user_id).await;
        drop(guard);
        deleted
    }

    /// Users with a dispatch in flight or waiting for one.
    pub fn active(&self) -> usize {
        self.locks.len()
    }

    async fn lock(&self, user_id: &str) -> OwnedMutexGuard<()> {
        // Clone the lock out so no map shard stays locked across the await.
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_default()
            .value()
            .clone();
        #[cfg(feature = "metrics")]
        gauge!(session_metrics::ACTIVE).set(self.locks.len() as f64);
        lock.lock_owned().await
    }

    fn guard(&self, user: User, lock: OwnedMutexGuard<()>) -> UserGuard {
        UserGuard {
            user,
            lock: Some(lock),
            locks: Arc::clone(&self.locks),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{SessionKey, SqliteSessionBackend},
        quandary_common::Command,
        std::time::Duration,
    };

    #[tokio::test]
    async fn saved_record_is_seen_by_the_next_lookup() {
        let store = SessionStore::in_memory();
        {
            let mut user = store.find_or_create("u1").await.unwrap();
            assert_eq!(user.id, "u1");
            user.session.set_pending_command(Command::WasItAQuestion);
            store.save(&user).await.unwrap();
        }
        let user = store.find_or_create("u1").await.unwrap();
        assert_eq!(user.session.pending_command(), Some(Command::WasItAQuestion));
        assert_eq!(store.active(), 1);
    }

    #[tokio::test]
    async fn unsaved_changes_are_dropped_with_the_guard() {
        let store = SessionStore::in_memory();
        {
            let mut user = store.find_or_create("u1").await.unwrap();
            user.session.set(SessionKey::LastAnswer, "Yes");
        }
        let user = store.find_or_create("u1").await.unwrap();
        assert_eq!(user.session.last_answer(), None);
    }

    #[tokio::test]
    async fn loads_saved_session_from_backend() {
        let backend = Arc::new(MemorySessionBackend::new());
        let mut session = Session::new();
        session.set(SessionKey::NeedsCorrection, "blah");
        backend.put("u1", &session).await.unwrap();

        let store = SessionStore::new(backend);
        let user = store.find_or_create("u1").await.unwrap();
        assert_eq!(user.session.needs_correction(), Some("blah"));
    }

    #[tokio::test]
    async fn save_persists_through_backend() {
        let backend = Arc::new(MemorySessionBackend::new());
        let store = SessionStore::new(backend.clone());
        {
            let mut user = store.find_or_create("u1").await.unwrap();
            user.session.set(SessionKey::LastAnswer, "Probably yes");
            store.save(&user).await.unwrap();
        }
        let stored = backend.get("u1").await.unwrap().unwrap();
        assert_eq!(stored.last_answer(), Some("Probably yes"));
    }

    #[tokio::test]
    async fn same_user_is_serialized() {
        let store = Arc::new(SessionStore::in_memory());
        let first = store.find_or_create("u1").await.unwrap();

        let waiting = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut user = store.find_or_create("u1").await.unwrap();
                user.session.increment_failures()
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(first);
        assert_eq!(waiting.await.unwrap(), 1);
        assert_eq!(store.active(), 0);
    }

    #[tokio::test]
    async fn different_users_do_not_block() {
        let store = SessionStore::in_memory();
        let _a = store.find_or_create("a").await.unwrap();
        let b = tokio::time::timeout(Duration::from_secs(1), store.find_or_create("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn released_users_leave_no_entry_behind() {
        let store = SessionStore::in_memory();
        for i in 0..1000 {
            let user = store.find_or_create(&format!("sender-{i}")).await.unwrap();
            store.save(&user).await.unwrap();
        }
        assert_eq!(store.active(), 0);
        assert!(store.load("sender-999").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_forgets_stored_record() {
        let store = SessionStore::in_memory();
        {
            let mut user = store.find_or_create("u1").await.unwrap();
            user.session.set(SessionKey::LastAnswer, "x");
            store.save(&user).await.unwrap();
        }
        assert!(store.clear("u1").await.unwrap());
        assert!(store.load("u1").await.unwrap().is_none());
        assert_eq!(store.active(), 0);

        let user = store.find_or_create("u1").await.unwrap();
        assert_eq!(user.session.last_answer(), None);
    }

    #[tokio::test]
    async fn clear_through_another_store_is_not_undone() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("s.db").display());
        let gateway = SessionStore::new(Arc::new(SqliteSessionBackend::connect(&url).await.unwrap()));
        let cli = SessionStore::new(Arc::new(SqliteSessionBackend::connect(&url).await.unwrap()));

        {
            let mut user = gateway.find_or_create("u1").await.unwrap();
            user.session.set(SessionKey::NeedsCorrection, "blah");
            gateway.save(&user).await.unwrap();
        }
        assert!(cli.clear("u1").await.unwrap());

        let user = gateway.find_or_create("u1").await.unwrap();
        assert_eq!(user.session.needs_correction(), None);
        gateway.save(&user).await.unwrap();
        drop(user);

        let stored = cli.load("u1").await.unwrap().unwrap();
        assert_eq!(stored.needs_correction(), None);
    }

    #[tokio::test]
    async fn load_does_not_create() {
        let store = SessionStore::in_memory();
        assert!(store.load("ghost").await.unwrap().is_none());
        assert_eq!(store.active(), 0);
        assert!(!store.clear("ghost").await.unwrap());
    }
}
