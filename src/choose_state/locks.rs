use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

use super::ChooseStateError;
use crate::workflows::ResourceKey;

/// Advisory per-resource locks serializing transitions on one key.
///
/// Keys are only tracked while held, so the set never grows beyond the
/// number of transitions in flight.
#[derive(Debug, Default)]
pub struct KeyLocks {
    held: Mutex<HashSet<ResourceKey>>,
    released: Condvar,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `key` is free, then hold it until the guard drops.
    ///
    /// Not reentrant: taking the same key twice on one thread deadlocks.
    pub fn acquire(&self, key: &ResourceKey) -> Result<KeyGuard<'_>, ChooseStateError> {
        let mut held = self.held.lock().map_err(|_| ChooseStateError::LockPoisoned)?;
        while held.contains(key) {
            held = self
                .released
                .wait(held)
                .map_err(|_| ChooseStateError::LockPoisoned)?;
        }
        held.insert(key.clone());
        Ok(KeyGuard {
            locks: self,
            key: key.clone(),
        })
    }

    #[cfg(test)]
    fn is_held(&self, key: &ResourceKey) -> bool {
        self.held
            .lock()
            .map(|held| held.contains(key))
            .unwrap_or(false)
    }
}

/// Holds one key of a [`KeyLocks`] until dropped.
#[derive(Debug)]
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: ResourceKey,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // Poisoned set: nothing to clean, waiters fail on their own lock call.
        if let Ok(mut held) = self.locks.held.lock() {
            held.remove(&self.key);
        }
        self.locks.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::WorkflowId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn key(resource_id: i32) -> ResourceKey {
        ResourceKey::new(resource_id, "ticket", WorkflowId(1))
    }

    #[test]
    fn test_guard_releases_key_on_drop() {
        let locks = KeyLocks::new();
        {
            let _guard = locks.acquire(&key(1)).unwrap();
            assert!(locks.is_held(&key(1)));
        }
        assert!(!locks.is_held(&key(1)));
    }

    #[test]
    fn test_distinct_keys_do_not_block_each_other() {
        let locks = KeyLocks::new();
        let _first = locks.acquire(&key(1)).unwrap();
        let _second = locks.acquire(&key(2)).unwrap();
        assert!(locks.is_held(&key(1)));
        assert!(locks.is_held(&key(2)));
    }

    #[test]
    fn test_same_key_is_mutually_exclusive() {
        let locks = Arc::new(KeyLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    let _guard = locks.acquire(&key(1)).unwrap();
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(2));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(!locks.is_held(&key(1)));
    }
}
