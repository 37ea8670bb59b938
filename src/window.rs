use std::collections::VecDeque;

use crate::model::Sample;

/// Upper bound on storage reserved up front; larger windows grow on demand.
const PREALLOC_LIMIT: usize = 64;

/// Bounded FIFO of the most recent samples. The oldest sample is evicted first.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    /// Maximum number of samples kept
    capacity: usize,
    window: VecDeque<Sample>,
}

impl SampleWindow {
    /// Create an empty window. `capacity` is validated by the feed before this is called.
    /// Only a small prefix is allocated here, so any positive capacity is accepted.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            window: VecDeque::with_capacity(capacity.min(PREALLOC_LIMIT)),
        }
    }

    /// Append a sample, evicting the oldest one if the window is full.
    ///
    /// Returns the evicted sample, if any.
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let evicted = if self.window.len() >= self.capacity {
            self.window.pop_front()
        } else {
            None
        };
        self.window.push_back(sample);
        evicted
    }

    /// Clear the sliding window.
    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.window.iter()
    }

    /// Oldest first, the order a chart draws them.
    pub fn to_vec(&self) -> Vec<Sample> {
        self.window.iter().cloned().collect()
    }
}
