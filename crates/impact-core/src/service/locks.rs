use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One exclusive write lock per project id.
#[derive(Default)]
pub struct ProjectLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `project_id`, created on first use.
    pub fn lock_for(&self, project_id: &str) -> Arc<Mutex<()>> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            inner
                .entry(project_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lock `lock`, ignoring poisoning. The guarded value is `()`.
pub fn acquire(lock: &Mutex<()>) -> MutexGuard<'_, ()> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn same_id_shares_a_lock() {
        let locks = ProjectLocks::new();
        let a = locks.lock_for("p1");
        let b = locks.lock_for("p1");
        let c = locks.lock_for("p2");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn writers_are_serialized() {
        let locks = Arc::new(ProjectLocks::new());
        let counter = Arc::new(Mutex::new(Vec::new()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let locks = Arc::clone(&locks);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    let lock = locks.lock_for("p1");
                    let _guard = acquire(&lock);
                    let mut seen = counter.lock().unwrap();
                    seen.push(i);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.lock().unwrap().len(), 8);
    }
}
