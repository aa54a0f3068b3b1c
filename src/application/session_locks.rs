//! Per-session turn serialization.
//!
//! Message turns for one session must not interleave: each turn reads the
//! aggregate, calls the generator, and writes back, so two concurrent turns
//! would race on sequence numbers and coverage. Turns for different sessions
//! proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::domain::foundation::SessionId;

/// Registry of per-session async mutexes.
///
/// The outer std mutex only guards the map itself and is never held across
/// an await point.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and takes the turn lock for the given session.
    pub async fn acquire(&self, session_id: SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry(session_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drops the lock entry for a session that reached a terminal status.
    ///
    /// The entry stays while any guard is held or awaited. Removing it then
    /// would let a later `acquire` mint a fresh mutex and run concurrently
    /// with the holder of the old one.
    pub fn release(&self, session_id: &SessionId) {
        let mut locks = self.locks.lock().unwrap();
        if let Some(lock) = locks.get(session_id) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(session_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn serializes_turns_for_the_same_session() {
        let locks = Arc::new(SessionLocks::new());
        let session_id = SessionId::new();
        let in_flight = Arc::new(AtomicU32::new(0));
        let max_in_flight = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let in_flight = in_flight.clone();
            let max_in_flight = max_in_flight.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(session_id).await;
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_sessions_do_not_block_each_other() {
        let locks = SessionLocks::new();
        let first = locks.acquire(SessionId::new()).await;
        // Acquiring a second session's lock must not deadlock while the
        // first is held.
        let second = locks.acquire(SessionId::new()).await;
        drop(first);
        drop(second);
    }

    #[tokio::test]
    async fn release_forgets_the_session_entry() {
        let locks = SessionLocks::new();
        let session_id = SessionId::new();
        drop(locks.acquire(session_id).await);
        locks.release(&session_id);
        assert!(locks.locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn release_keeps_the_entry_while_a_guard_is_held() {
        let locks = Arc::new(SessionLocks::new());
        let session_id = SessionId::new();
        let guard = locks.acquire(session_id).await;

        locks.release(&session_id);
        assert_eq!(locks.locks.lock().unwrap().len(), 1);

        // A second acquire must still queue behind the held guard.
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                drop(locks.acquire(session_id).await);
            })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        locks.release(&session_id);
        assert!(locks.locks.lock().unwrap().is_empty());
    }
}
