use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ScanRequest {
    pub section_title: String,
    pub subpath: PathBuf,
}

impl ScanRequest {
    pub fn new(section_title: impl Into<String>, subpath: impl Into<PathBuf>) -> Self {
        Self {
            section_title: section_title.into(),
            subpath: subpath.into(),
        }
    }
}

impl fmt::Display for ScanRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: '{}'", self.section_title, self.subpath.display())
    }
}

/// Pending scans, FIFO, holding at most one copy of each request.
#[derive(Debug, Default)]
pub struct ScanQueue {
    pending: Mutex<VecDeque<ScanRequest>>,
}

impl ScanQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an equal request was already pending.
    pub fn enqueue(&self, request: ScanRequest) -> bool {
        let mut pending = self.pending.lock();
        if pending.contains(&request) {
            return false;
        }
        pending.push_back(request);
        true
    }

    /// Takes everything queued so far. Requests enqueued afterwards wait for
    /// the next drain.
    pub fn drain_snapshot(&self) -> Vec<ScanRequest> {
        let mut pending = self.pending.lock();
        std::mem::take(&mut *pending).into()
    }

    pub fn contains(&self, request: &ScanRequest) -> bool {
        self.pending.lock().contains(request)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn enqueue_is_idempotent() {
        let queue = ScanQueue::new();
        assert!(queue.enqueue(ScanRequest::new("Movies", "Comedy")));
        assert!(!queue.enqueue(ScanRequest::new("Movies", "Comedy")));
        assert!(queue.enqueue(ScanRequest::new("TV Shows", "Comedy")));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn drain_preserves_insertion_order() {
        let queue = ScanQueue::new();
        queue.enqueue(ScanRequest::new("Movies", "b"));
        queue.enqueue(ScanRequest::new("Movies", "a"));
        queue.enqueue(ScanRequest::new("Music", "c"));
        queue.enqueue(ScanRequest::new("Movies", "b"));

        let drained = queue.drain_snapshot();
        assert_eq!(
            drained,
            vec![
                ScanRequest::new("Movies", "b"),
                ScanRequest::new("Movies", "a"),
                ScanRequest::new("Music", "c"),
            ]
        );
    }

    #[test]
    fn second_drain_is_empty() {
        let queue = ScanQueue::new();
        queue.enqueue(ScanRequest::new("Movies", "."));
        assert_eq!(queue.drain_snapshot().len(), 1);
        assert!(queue.drain_snapshot().is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn drained_request_can_be_queued_again() {
        let queue = ScanQueue::new();
        let request = ScanRequest::new("Movies", "Comedy");
        queue.enqueue(request.clone());
        let drained = queue.drain_snapshot();
        assert!(queue.enqueue(drained[0].clone()));
        assert!(queue.contains(&request));
    }

    #[test]
    fn concurrent_producers_do_not_duplicate() {
        let queue = Arc::new(ScanQueue::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for idx in 0..50 {
                        queue.enqueue(ScanRequest::new("Movies", format!("dir-{idx}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("producer thread");
        }
        assert_eq!(queue.drain_snapshot().len(), 50);
    }
}
