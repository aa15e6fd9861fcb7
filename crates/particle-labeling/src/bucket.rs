//! Per-cell particle id storage

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Append-only list of particle ids belonging to one grid cell
///
/// Capacity doubles whenever the bucket is full and is never released, so a bucket can be
/// cleared and refilled across labeling runs without reallocating.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellBucket {
    ids: Vec<u32>,
}

impl CellBucket {
    /// Create an empty bucket with room for `initial_capacity` ids
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(initial_capacity),
        }
    }

    /// Append a particle id, doubling the capacity if the bucket is full
    #[inline]
    pub fn append(&mut self, id: u32) {
        if self.ids.len() == self.ids.capacity() {
            self.ids.reserve_exact(self.ids.capacity().max(1));
        }
        self.ids.push(id);
    }

    /// Forget all ids while keeping the allocated capacity
    #[inline]
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Number of ids stored
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of ids that fit without growing
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ids.capacity()
    }

    /// Stored ids in insertion order
    #[inline]
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }
}
