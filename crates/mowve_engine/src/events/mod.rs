//! Deferred request queue
//!
//! Input handlers and per-frame hooks run while the object registry and the
//! active context are being iterated, so they must not replace or destroy
//! those structures directly. They enqueue a request instead, and the game
//! loop applies every pending request at the top of the next frame.
//!
//! Key properties:
//! - Requests live in fixed blocks of [`BLOCK_CAPACITY`] slots chained from a
//!   head block. New requests take the first empty slot from the head
//!   forward; a successor block is allocated only when every block is full.
//! - The chain is capped at a block limit; past it [`RequestQueue::add`]
//!   reports [`QueueError::Full`] instead of dropping the request silently.
//! - [`RequestQueue::drain`] takes every pending request in enqueue order and
//!   clears its slot. Requests added while those are being applied are only
//!   seen by the following drain.
//! - Blocks are kept across drains.

use thiserror::Error;

/// Slots per block
pub const BLOCK_CAPACITY: usize = 15;

/// Default number of blocks: the head plus one successor
pub const DEFAULT_BLOCK_LIMIT: usize = 2;

/// Request queue errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Every slot of every allowed block is taken
    #[error("Request queue is full ({capacity} pending requests)")]
    Full {
        /// Total slots across all allowed blocks
        capacity: usize,
    },
}

#[derive(Debug)]
struct Block<R> {
    slots: [Option<R>; BLOCK_CAPACITY],
    next: Option<Box<Block<R>>>,
}

impl<R> Block<R> {
    fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            next: None,
        }
    }
}

/// Chain of fixed-size blocks holding requests until the next drain
#[derive(Debug)]
pub struct RequestQueue<R> {
    head: Box<Block<R>>,
    block_limit: usize,
}

impl<R> Default for RequestQueue<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RequestQueue<R> {
    /// Create a queue with the default block limit
    pub fn new() -> Self {
        Self::with_block_limit(DEFAULT_BLOCK_LIMIT)
    }

    /// Create a queue that may grow to `block_limit` blocks (at least one)
    pub fn with_block_limit(block_limit: usize) -> Self {
        Self {
            head: Box::new(Block::new()),
            block_limit: block_limit.max(1),
        }
    }

    /// Queue a request for the next drain
    pub fn add(&mut self, request: R) -> Result<(), QueueError> {
        let mut depth = 1;
        let mut block = &mut self.head;
        loop {
            if let Some(slot) = block.slots.iter_mut().find(|slot| slot.is_none()) {
                *slot = Some(request);
                return Ok(());
            }
            if block.next.is_none() && depth >= self.block_limit {
                return Err(QueueError::Full {
                    capacity: self.block_limit * BLOCK_CAPACITY,
                });
            }
            depth += 1;
            block = block.next.get_or_insert_with(|| {
                log::debug!("Request queue grew to {depth} blocks");
                Box::new(Block::new())
            });
        }
    }

    /// Take every pending request in enqueue order, clearing their slots
    pub fn drain(&mut self) -> Vec<R> {
        let mut drained = Vec::new();
        let mut block = Some(&mut self.head);
        while let Some(current) = block {
            drained.extend(current.slots.iter_mut().filter_map(Option::take));
            block = current.next.as_mut();
        }
        if !drained.is_empty() {
            log::trace!("Drained {} deferred requests", drained.len());
        }
        drained
    }

    /// Pending requests in enqueue order
    pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
        self.blocks().flat_map(|block| block.slots.iter().flatten())
    }

    /// Number of pending requests
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Blocks currently allocated
    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    /// Maximum number of pending requests
    pub fn capacity(&self) -> usize {
        self.block_limit * BLOCK_CAPACITY
    }

    fn blocks(&self) -> impl Iterator<Item = &Block<R>> + '_ {
        std::iter::successors(Some(&*self.head), |block| block.next.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_enqueue_order() {
        let mut queue = RequestQueue::new();
        for i in 0..20 {
            queue.add(i).unwrap();
        }
        assert_eq!(queue.len(), 20);
        assert_eq!(queue.block_count(), 2);

        assert_eq!(queue.drain(), (0..20).collect::<Vec<_>>());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_blocks_are_retained() {
        let mut queue = RequestQueue::new();
        for i in 0..16 {
            queue.add(i).unwrap();
        }
        queue.drain();
        assert_eq!(queue.block_count(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_reports_error() {
        let mut queue = RequestQueue::new();
        for i in 0..queue.capacity() {
            queue.add(i).unwrap();
        }
        assert_eq!(queue.add(99), Err(QueueError::Full { capacity: 30 }));
        assert_eq!(queue.len(), 30);

        queue.drain();
        assert!(queue.add(99).is_ok());
    }

    #[test]
    fn test_requests_added_while_applying_wait_for_next_drain() {
        let mut queue = RequestQueue::new();
        queue.add("pause").unwrap();
        queue.add("menu").unwrap();

        let mut applied = Vec::new();
        for request in queue.drain() {
            if request == "pause" {
                queue.add("resume").unwrap();
            }
            applied.push(request);
        }
        assert_eq!(applied, vec!["pause", "menu"]);
        assert_eq!(queue.drain(), vec!["resume"]);
    }

    #[test]
    fn test_boxed_callbacks() {
        let mut queue: RequestQueue<Box<dyn FnOnce(&mut Vec<u32>)>> = RequestQueue::new();
        queue.add(Box::new(|log: &mut Vec<u32>| log.push(1))).unwrap();
        queue.add(Box::new(|log: &mut Vec<u32>| log.push(2))).unwrap();

        let mut log = Vec::new();
        for request in queue.drain() {
            request(&mut log);
        }
        assert_eq!(log, vec![1, 2]);
    }

    #[test]
    fn test_single_block_limit() {
        let mut queue = RequestQueue::with_block_limit(0);
        for i in 0..BLOCK_CAPACITY {
            queue.add(i).unwrap();
        }
        assert!(queue.add(15).is_err());
        assert_eq!(queue.block_count(), 1);
    }
}
