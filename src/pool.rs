//! A fixed-block pool that backs key registrations without a heap.
//!
//! The pool is an arena of `P` slots of one type. Free slots are chained into
//! a singly linked free list, but the links live in a table next to the
//! arena rather than inside the slots, so a slot handed out to a caller never
//! has bookkeeping written over it.
//!
//! ```text
//! slots  | T0 | T1 | T2 | T3 |
//! next   |  1 |  2 |  3 |  - |    free_head = 0, used = 0
//!
//! after allocate, allocate, release(0):
//! next   |  2 |  x |  3 |  - |    free_head = 0, used = 1
//! ```
//!
//! `x` marks a link of an allocated slot. It is stale and never read.
//!
//! Allocation and release are both O(1) and reuse is LIFO.

/// The most blocks a [`BlockPool`] can hold. Slot indices are `u16`.
pub const MAX_BLOCKS: usize = u16::MAX as usize;

/// Names one slot of a [`BlockPool`].
///
/// Handles are plain indices. Releasing a handle twice, or into a pool it
/// did not come from, is not detected: memory stays safe, the free list
/// does not.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlockHandle(u16);

impl BlockHandle {
    /// Position of the slot in its pool
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A pool of `P` blocks holding a `T` each.
///
/// `P` may not exceed [`MAX_BLOCKS`]. A larger pool fails to build.
pub struct BlockPool<T, const P: usize> {
    slots: [T; P],
    next: [Option<u16>; P],
    free_head: Option<u16>,
    used: u16,
}

impl<T: Default, const P: usize> Default for BlockPool<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default, const P: usize> BlockPool<T, P> {
    const FITS_U16: () = assert!(P <= MAX_BLOCKS, "a block pool holds at most 65535 blocks");

    /// Creates a pool with every block free.
    pub fn new() -> Self {
        let () = Self::FITS_U16;
        let mut pool = BlockPool {
            slots: core::array::from_fn(|_| T::default()),
            next: [None; P],
            free_head: None,
            used: 0,
        };
        pool.reset();
        pool
    }

    /// Forgets every allocation and relinks all blocks in index order.
    ///
    /// Handles obtained before the reset must not be used afterwards.
    pub fn reset(&mut self) {
        for (i, link) in self.next.iter_mut().enumerate() {
            *link = if i + 1 < P { Some((i + 1) as u16) } else { None };
        }
        self.free_head = if P > 0 { Some(0) } else { None };
        self.used = 0;
    }

    /// Takes a block off the free list, resets it to `T::default()` and
    /// returns its handle. `None` when the pool is exhausted.
    pub fn allocate(&mut self) -> Option<BlockHandle> {
        let index = self.free_head?;
        self.free_head = self.next[index as usize];
        self.used += 1;
        self.slots[index as usize] = T::default();
        Some(BlockHandle(index))
    }

    /// Returns a block to the head of the free list.
    ///
    /// A handle whose index lies outside this pool is ignored.
    pub fn release(&mut self, handle: BlockHandle) {
        let index = handle.0;
        if index as usize >= P {
            return;
        }
        self.next[index as usize] = self.free_head;
        self.free_head = Some(index);
        self.used = self.used.saturating_sub(1);
    }
}

impl<T, const P: usize> BlockPool<T, P> {
    pub fn get(&self, handle: BlockHandle) -> Option<&T> {
        self.slots.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: BlockHandle) -> Option<&mut T> {
        self.slots.get_mut(handle.index())
    }

    /// Number of blocks handed out
    pub fn used(&self) -> usize {
        self.used as usize
    }

    /// Number of blocks left to hand out
    pub fn free(&self) -> usize {
        P - self.used as usize
    }

    pub fn capacity(&self) -> usize {
        P
    }
}
