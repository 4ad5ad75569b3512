//! The list of registered keys.
//!
//! Keys form a singly linked list whose nodes live in a [`BlockPool`]. The
//! list is append-only and its order is the registration order, which is
//! also the order keys are sampled, updated and reported in.

use crate::error::Error;
use crate::pool::{BlockHandle, BlockPool};

/// Everything needed to register a key.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyDescriptor<L> {
    /// Human readable name, handed back with every event
    pub name: &'static str,
    /// Logical id, unique within a keyboard
    pub id: u16,
    /// Where the key is wired
    pub location: L,
}

/// A registered key, as stored in the pool.
#[derive(Debug, Default, Copy, Clone)]
pub struct KeyNode<L> {
    pub key: KeyDescriptor<L>,
    next: Option<BlockHandle>,
}

impl<L: Default> Default for KeyDescriptor<L> {
    fn default() -> Self {
        KeyDescriptor {
            name: "",
            id: 0,
            location: L::default(),
        }
    }
}

/// The pool the registry draws its nodes from.
pub type KeyPool<L, const P: usize> = BlockPool<KeyNode<L>, P>;

pub struct KeyRegistry<'p, L, const P: usize> {
    pool: &'p mut KeyPool<L, P>,
    head: Option<BlockHandle>,
    tail: Option<BlockHandle>,
    len: usize,
}

impl<'p, L, const P: usize> KeyRegistry<'p, L, P>
where
    L: Copy + PartialEq + Default,
{
    /// Takes over `pool`, freeing every block in it.
    pub fn new(pool: &'p mut KeyPool<L, P>) -> Self {
        pool.reset();
        KeyRegistry {
            pool,
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Appends `key` unless it clashes with a registered key or there is no
    /// room for it. `max` bounds the number of keys independently of the
    /// pool size.
    ///
    /// Nothing changes on error.
    pub fn push(&mut self, key: KeyDescriptor<L>, max: usize) -> Result<(), Error> {
        if self
            .iter()
            .any(|k| k.id == key.id || k.location == key.location)
        {
            return Err(Error::Duplicate);
        }
        if self.len >= max {
            return Err(Error::Full);
        }
        let handle = self.pool.allocate().ok_or(Error::NoMem)?;
        if let Some(node) = self.pool.get_mut(handle) {
            node.key = key;
        }
        match self.tail.and_then(|t| self.pool.get_mut(t)) {
            Some(tail) => tail.next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.len += 1;
        Ok(())
    }

    /// Returns every node to the pool.
    pub fn clear(&mut self) {
        let mut cursor = self.head.take();
        while let Some(handle) = cursor {
            cursor = self.pool.get(handle).and_then(|n| n.next);
            self.pool.release(handle);
        }
        self.tail = None;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `(used, free)` blocks of the backing pool
    pub fn pool_usage(&self) -> (usize, usize) {
        (self.pool.used(), self.pool.free())
    }

    /// Registered keys in registration order
    pub fn iter(&self) -> Iter<'_, L, P> {
        Iter {
            pool: &*self.pool,
            cursor: self.head,
        }
    }
}

pub struct Iter<'a, L, const P: usize> {
    pool: &'a KeyPool<L, P>,
    cursor: Option<BlockHandle>,
}

impl<'a, L, const P: usize> Iterator for Iter<'a, L, P> {
    type Item = &'a KeyDescriptor<L>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pool.get(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.key)
    }
}
