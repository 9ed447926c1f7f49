use std::sync::atomic::{AtomicUsize, Ordering};

/// A transaction handed to a miner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    /// Position in the original worklist.
    pub index: usize,
    pub id: u32,
}

/// Fixed list of transaction ids with a shared, lock-free claim cursor.
#[derive(Debug)]
pub struct Worklist {
    ids: Vec<u32>,
    cursor: AtomicUsize,
}

impl Worklist {
    pub fn new(ids: Vec<u32>) -> Self {
        Self {
            ids,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claim the next unclaimed position, or `None` once the list is exhausted.
    ///
    /// Every index is returned to exactly one caller.
    pub fn claim(&self) -> Option<Claim> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.ids.get(index).map(|&id| Claim { index, id })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
