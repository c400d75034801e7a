use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use parking_lot::Mutex;
use tracing::trace;

use crate::config::StackPoolConfig;

/// A pool of reusable scratch stacks for tree traversals.
///
/// Every lease is exclusively owned by one caller for as long as the
/// returned [`PooledStack`] lives, so concurrent readers never share a stack.
pub struct StackPool<E> {
    /// Stacks that are currently not leased
    free: Mutex<Vec<Vec<E>>>,
    /// Maximum number of stacks kept around after they are returned
    max_pooled_stacks: usize,
    /// Capacity of freshly allocated stacks
    stack_capacity: usize,
}

impl<E> StackPool<E> {
    /// Creates a new `StackPool` according to `config`
    #[inline]
    #[must_use]
    pub fn new(config: StackPoolConfig) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_pooled_stacks: *config.max_pooled_stacks(),
            stack_capacity: *config.stack_capacity(),
        }
    }

    /// Leases a cleared stack. It is given back to the pool when the lease
    /// is dropped.
    #[inline]
    #[must_use]
    pub fn lease(&self) -> PooledStack<'_, E> {
        let stack = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.stack_capacity));
        PooledStack {
            pool: self,
            stack,
        }
    }

    /// Number of stacks currently waiting in the pool
    #[inline]
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.free.lock().len()
    }

    /// Takes a stack back into the pool
    fn give_back(&self, mut stack: Vec<E>) {
        stack.clear();
        let mut free = self.free.lock();
        if free.len() < self.max_pooled_stacks {
            free.push(stack);
        } else {
            trace!("stack pool is full, dropping a stack of capacity {}", stack.capacity());
        }
    }
}

impl<E> Default for StackPool<E> {
    #[inline]
    fn default() -> Self {
        Self::new(StackPoolConfig::default())
    }
}

impl<E> fmt::Debug for StackPool<E> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackPool")
            .field("pooled", &self.pooled())
            .field("max_pooled_stacks", &self.max_pooled_stacks)
            .field("stack_capacity", &self.stack_capacity)
            .finish()
    }
}

/// A stack leased from a [`StackPool`]
pub struct PooledStack<'a, E> {
    /// The pool to return the stack to
    pool: &'a StackPool<E>,
    /// The leased stack
    stack: Vec<E>,
}

impl<E> Deref for PooledStack<'_, E> {
    type Target = Vec<E>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.stack
    }
}

impl<E> DerefMut for PooledStack<'_, E> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.stack
    }
}

impl<E> Drop for PooledStack<'_, E> {
    #[inline]
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.stack));
    }
}

impl<E> fmt::Debug for PooledStack<'_, E> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledStack")
            .field("len", &self.stack.len())
            .finish_non_exhaustive()
    }
}
