//! Bounded Event Buffers
//!
//! Fixed-capacity, insertion-ordered containers for push events, one
//! per channel. New events are prepended; when the buffer is full the
//! oldest event is evicted, so the buffer always holds the most
//! recent `capacity` events, newest-first.
//!
//! Buffers are created empty at store initialization and mutated only
//! by the message router (single-writer, multi-reader discipline).

use std::collections::VecDeque;

/// Fixed-capacity, newest-first event buffer.
///
/// # Example
///
/// ```rust
/// use defi_stream_sync::domain::buffer::BoundedBuffer;
///
/// let mut buf = BoundedBuffer::new(2);
/// buf.push(1);
/// buf.push(2);
/// buf.push(3);
///
/// // Capacity 2: the oldest element was evicted, newest first.
/// assert_eq!(buf.to_vec(), vec![3, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct BoundedBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    /// Create an empty buffer holding at most `capacity` elements.
    ///
    /// A zero capacity is clamped to one so the buffer can always
    /// hold the latest event.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend an event, evicting the oldest when at capacity.
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_back();
        }
        self.items.push_front(item);
    }

    /// Number of buffered events. Never exceeds the capacity.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the buffer holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Most recent event, if any.
    #[must_use]
    pub fn newest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Drop all buffered events. Used only at teardown.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> BoundedBuffer<T> {
    /// Clone the contents, newest-first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
