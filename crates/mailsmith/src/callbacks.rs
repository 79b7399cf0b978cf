//! Before/after-send callback pools.

use std::fmt;

/// A callback receiving mutable access to its owner.
pub type Callback<T> = Box<dyn FnMut(&mut T) + Send>;

/// Ordered callbacks, each run at most once until re-armed.
pub struct CallbackPool<T> {
    entries: Vec<(Callback<T>, bool)>,
}

impl<T> CallbackPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a callback.
    pub fn push(&mut self, callback: impl FnMut(&mut T) + Send + 'static) {
        self.entries.push((Box::new(callback), false));
    }

    /// Runs every callback not yet executed, in insertion order, and marks
    /// them executed.
    pub fn run(&mut self, target: &mut T) {
        for (callback, executed) in &mut self.entries {
            if !*executed {
                *executed = true;
                callback(target);
            }
        }
    }

    /// Moves the callbacks of `other` to the end of this pool.
    pub fn append(&mut self, mut other: Self) {
        self.entries.append(&mut other.entries);
    }

    /// Marks every callback as not executed.
    pub fn reset(&mut self) {
        for (_, executed) in &mut self.entries {
            *executed = false;
        }
    }

    /// Number of callbacks still waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|(_, executed)| !executed).count()
    }

    /// Total number of callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the pool holds no callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for CallbackPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CallbackPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackPool")
            .field("len", &self.len())
            .field("pending", &self.pending())
            .finish()
    }
}
