//! Lock-free work queue for distributing shards across decode workers

use std::sync::atomic::{AtomicUsize, Ordering};

/// Lock-free work queue distributing items to workers.
///
/// Workers call [`next()`](WorkQueue::next) to atomically claim the next item.
/// Supports optional filtering at construction time for resume/skip logic.
pub struct WorkQueue<S> {
    items: Vec<S>,
    cursor: AtomicUsize,
}

impl<S> WorkQueue<S> {
    /// Create queue from all items (no filtering)
    pub fn new(items: Vec<S>) -> Self {
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Create queue, keeping only items that pass the filter (resume support)
    pub fn filtered(items: Vec<S>, keep: impl Fn(&S) -> bool) -> Self {
        let filtered: Vec<S> = items.into_iter().filter(|s| keep(s)).collect();
        log::debug!("{} items in work queue", filtered.len());
        Self {
            items: filtered,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Get next item to process (lock-free)
    pub fn next(&self) -> Option<&S> {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.items.get(i)
    }

    /// Total items in queue
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue was empty at construction
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
