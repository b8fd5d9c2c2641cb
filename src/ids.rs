// Reservation id issuance

use std::sync::atomic::{AtomicU64, Ordering};

pub type ReservationId = u64;

// Ids must be unique across concurrent callers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> ReservationId;
}

#[derive(Debug)]
pub struct AtomicIdGenerator {
    next: AtomicU64,
}

impl AtomicIdGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl Default for AtomicIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for AtomicIdGenerator {
    fn next_id(&self) -> ReservationId {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let ids = AtomicIdGenerator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let ids = Arc::new(AtomicIdGenerator::new());
        let threads_count = 8;
        let ids_per_thread = 1000;

        let mut handles = vec![];
        for _ in 0..threads_count {
            let ids = Arc::clone(&ids);
            handles.push(thread::spawn(move || {
                let mut issued = Vec::with_capacity(ids_per_thread);
                let mut last = 0;
                for _ in 0..ids_per_thread {
                    let id = ids.next_id();
                    // Each caller observes its own ids in increasing order
                    assert!(id > last);
                    last = id;
                    issued.push(id);
                }
                issued
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "id {} issued twice", id);
            }
        }

        let total = (threads_count * ids_per_thread) as u64;
        assert_eq!(seen.len() as u64, total);
        assert_eq!(seen.iter().copied().min(), Some(1));
        assert_eq!(seen.iter().copied().max(), Some(total));
    }
}
