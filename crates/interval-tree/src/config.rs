use getset::Getters;
use serde::Deserialize;

use crate::error::IntervalTreeError;

/// Interval tree configuration object
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Getters)]
pub struct IntervalTreeConfig {
    /// Number of values the tree reserves room for up front
    #[getset(get = "pub")]
    #[serde(default = "default_initial_capacity")]
    initial_capacity: usize,
    /// Scratch stack pool configuration
    #[getset(get = "pub")]
    #[serde(default)]
    pool: StackPoolConfig,
}

impl Default for IntervalTreeConfig {
    #[inline]
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            pool: StackPoolConfig::default(),
        }
    }
}

impl IntervalTreeConfig {
    /// Create a new interval tree config
    #[must_use]
    #[inline]
    pub fn new(initial_capacity: usize, pool: StackPoolConfig) -> Self {
        Self {
            initial_capacity,
            pool,
        }
    }

    /// Checks that the configuration can be used to build a tree
    ///
    /// # Errors
    ///
    /// Return `IntervalTreeError::InvalidConfig` if the pool can hold no stack
    #[inline]
    pub fn validate(&self) -> Result<(), IntervalTreeError> {
        self.pool.validate()
    }
}

/// default initial capacity
#[must_use]
#[inline]
pub const fn default_initial_capacity() -> usize {
    0
}

/// Scratch stack pool configuration
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Getters)]
pub struct StackPoolConfig {
    /// The max number of idle stacks kept by the pool
    #[getset(get = "pub")]
    #[serde(default = "default_max_pooled_stacks")]
    max_pooled_stacks: usize,
    /// The initial capacity of every newly allocated stack
    #[getset(get = "pub")]
    #[serde(default = "default_stack_capacity")]
    stack_capacity: usize,
}

impl Default for StackPoolConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_pooled_stacks: default_max_pooled_stacks(),
            stack_capacity: default_stack_capacity(),
        }
    }
}

impl StackPoolConfig {
    /// Create a builder for `StackPoolConfig`
    #[must_use]
    #[inline]
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Checks that the pool can hold at least one stack
    ///
    /// # Errors
    ///
    /// Return `IntervalTreeError::InvalidConfig` if `max_pooled_stacks` is zero
    #[inline]
    pub fn validate(&self) -> Result<(), IntervalTreeError> {
        if self.max_pooled_stacks == 0 {
            return Err(IntervalTreeError::InvalidConfig(
                "max_pooled_stacks must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

/// default max pooled stacks
#[must_use]
#[inline]
pub const fn default_max_pooled_stacks() -> usize {
    4
}

/// default stack capacity, enough for a balanced tree of a few million values
#[must_use]
#[inline]
pub const fn default_stack_capacity() -> usize {
    64
}

/// Builder for `StackPoolConfig`
#[derive(Clone, Copy, Default, Debug)]
pub struct Builder {
    /// The max number of idle stacks kept by the pool
    max_pooled_stacks: Option<usize>,
    /// The initial capacity of every newly allocated stack
    stack_capacity: Option<usize>,
}

impl Builder {
    /// Set the max number of idle stacks
    #[inline]
    #[must_use]
    pub fn max_pooled_stacks(mut self, max_pooled_stacks: usize) -> Self {
        self.max_pooled_stacks = Some(max_pooled_stacks);
        self
    }

    /// Set the initial stack capacity
    #[inline]
    #[must_use]
    pub fn stack_capacity(mut self, stack_capacity: usize) -> Self {
        self.stack_capacity = Some(stack_capacity);
        self
    }

    /// Build the `StackPoolConfig` and apply defaults where needed
    #[inline]
    #[must_use]
    pub fn build(self) -> StackPoolConfig {
        StackPoolConfig {
            max_pooled_stacks: self
                .max_pooled_stacks
                .unwrap_or_else(default_max_pooled_stacks),
            stack_capacity: self.stack_capacity.unwrap_or_else(default_stack_capacity),
        }
    }
}
