//! # Ring Buffer
//!
//! Fixed-capacity circular history with overwrite-oldest semantics.
//!
//! Pushing never blocks, never fails, and never grows the buffer. When the
//! buffer is full the oldest element is evicted. All storage is allocated
//! once at construction.

use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;

/// Slot storage plus cursors, guarded together.
struct RingState<T> {
    /// Pre-allocated slots. Stale values may linger after `clear`.
    slots: Box<[Option<T>]>,
    /// Next write slot.
    head: usize,
    /// Next read slot (oldest element).
    tail: usize,
    /// Current occupancy.
    size: usize,
}

impl<T> RingState<T> {
    #[inline]
    fn advance(&self, cursor: usize) -> usize {
        (cursor + 1) % self.slots.len()
    }

    /// Slot index of the `offset`-th oldest element.
    #[inline]
    fn slot(&self, offset: usize) -> usize {
        (self.tail + offset) % self.slots.len()
    }
}

/// A bounded FIFO that overwrites its oldest element when full.
///
/// # Thread Safety
///
/// Guarded by a single mutex. Every method takes `&self`.
///
/// # Example
///
/// ```rust
/// use horde_core::RingBuffer;
///
/// let history: RingBuffer<i32> = RingBuffer::new(3);
/// for sample in 1..=4 {
///     history.push(sample);
/// }
///
/// assert_eq!(history.pop(), Some(2));
/// assert_eq!(history.pop(), Some(3));
/// assert_eq!(history.pop(), Some(4));
/// assert_eq!(history.pop(), None);
/// ```
pub struct RingBuffer<T> {
    state: Mutex<RingState<T>>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates a ring buffer holding at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        Self::with_slots(capacity)
    }

    /// Creates a ring buffer, rejecting a zero capacity.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ZeroCapacity`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::ZeroCapacity { container: "RingBuffer" });
        }
        Ok(Self::with_slots(capacity))
    }

    fn with_slots(capacity: usize) -> Self {
        let slots: Vec<Option<T>> = (0..capacity).map(|_| None).collect();
        Self {
            state: Mutex::new(RingState {
                slots: slots.into_boxed_slice(),
                head: 0,
                tail: 0,
                size: 0,
            }),
            capacity,
        }
    }

    /// Returns the fixed capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().size
    }

    /// Returns true if the buffer holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the next push will evict the oldest element.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Appends `value` as the newest element.
    ///
    /// This is a **O(1)**, **zero-allocation** operation.
    ///
    /// # Returns
    ///
    /// The evicted oldest element if the buffer was full.
    pub fn push(&self, value: T) -> Option<T> {
        let mut state = self.state.lock();
        let head = state.head;
        let previous = state.slots[head].replace(value);
        state.head = state.advance(head);

        if state.size == self.capacity {
            // Head caught up with tail: the slot just written was the oldest.
            state.tail = state.advance(state.tail);
            tracing::trace!(capacity = self.capacity, "ring buffer overwrote oldest element");
            previous
        } else {
            state.size += 1;
            None
        }
    }

    /// Removes and returns the oldest element, or `None` if empty.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        if state.size == 0 {
            return None;
        }

        let tail = state.tail;
        let value = state.slots[tail].take();
        state.tail = state.advance(tail);
        state.size -= 1;
        value
    }

    /// Removes every element, oldest first.
    pub fn drain(&self) -> Vec<T> {
        let mut state = self.state.lock();
        let mut out = Vec::with_capacity(state.size);
        while state.size > 0 {
            let tail = state.tail;
            if let Some(value) = state.slots[tail].take() {
                out.push(value);
            }
            state.tail = state.advance(tail);
            state.size -= 1;
        }
        out
    }

    /// Resets the cursors. Backing storage is left untouched; stale values
    /// are unreachable and get overwritten by later pushes.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.head = 0;
        state.tail = 0;
        state.size = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Returns a copy of the oldest element without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        let state = self.state.lock();
        if state.size == 0 {
            return None;
        }
        state.slots[state.tail].clone()
    }

    /// Returns a copy of the newest element without removing it.
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        let state = self.state.lock();
        if state.size == 0 {
            return None;
        }
        state.slots[state.slot(state.size - 1)].clone()
    }

    /// Copies out all elements, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let state = self.state.lock();
        (0..state.size)
            .filter_map(|offset| state.slots[state.slot(offset)].clone())
            .collect()
    }
}

impl<T> std::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ring_overwrite_oldest() {
        let ring: RingBuffer<i32> = RingBuffer::new(3);
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert_eq!(ring.push(3), None);
        assert_eq!(ring.push(4), Some(1));

        assert_eq!(ring.len(), 3);
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
        assert_eq!(ring.pop(), Some(4));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_ring_empty_pop_peek() {
        let ring: RingBuffer<u64> = RingBuffer::new(4);
        assert_eq!(ring.pop(), None);
        assert_eq!(ring.peek(), None);
        assert_eq!(ring.latest(), None);
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn test_ring_peek_does_not_mutate() {
        let ring: RingBuffer<&str> = RingBuffer::new(2);
        ring.push("a");
        ring.push("b");
        assert_eq!(ring.peek(), Some("a"));
        assert_eq!(ring.peek(), Some("a"));
        assert_eq!(ring.latest(), Some("b"));
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_ring_wraparound_interleaved() {
        let ring: RingBuffer<u32> = RingBuffer::new(3);
        ring.push(1);
        ring.push(2);
        assert_eq!(ring.pop(), Some(1));
        ring.push(3);
        ring.push(4);
        ring.push(5); // evicts 2
        assert!(ring.is_full());
        assert_eq!(ring.to_vec(), vec![3, 4, 5]);
        assert_eq!(ring.latest(), Some(5));
    }

    #[test]
    fn test_ring_capacity_one() {
        let ring: RingBuffer<u8> = RingBuffer::new(1);
        ring.push(1);
        assert_eq!(ring.push(2), Some(1));
        assert_eq!(ring.peek(), Some(2));
        assert_eq!(ring.pop(), Some(2));
        assert!(ring.is_empty());
    }

    #[test]
    fn test_ring_clear_keeps_capacity() {
        let ring: RingBuffer<u32> = RingBuffer::new(4);
        for i in 0..6 {
            ring.push(i);
        }
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 4);
        assert_eq!(ring.pop(), None);

        ring.push(10);
        assert_eq!(ring.to_vec(), vec![10]);
    }

    #[test]
    fn test_ring_drain() {
        let ring: RingBuffer<u32> = RingBuffer::new(3);
        for i in 0..5 {
            ring.push(i);
        }
        assert_eq!(ring.drain(), vec![2, 3, 4]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_ring_try_new_zero() {
        assert_eq!(
            RingBuffer::<u8>::try_new(0).unwrap_err(),
            CoreError::ZeroCapacity { container: "RingBuffer" }
        );
        assert_eq!(RingBuffer::<u8>::try_new(2).unwrap().capacity(), 2);
    }

    #[test]
    #[should_panic(expected = "Capacity must be greater than zero")]
    fn test_ring_zero_capacity_panics() {
        let _ = RingBuffer::<u8>::new(0);
    }

    proptest! {
        #[test]
        fn keeps_last_capacity_pushes(capacity in 1usize..16, extra in 0usize..40) {
            let ring: RingBuffer<usize> = RingBuffer::new(capacity);
            let total = capacity + extra;
            for value in 0..total {
                ring.push(value);
                prop_assert!(ring.len() <= ring.capacity());
            }

            let expected: Vec<usize> = (extra..total).collect();
            let mut popped = Vec::new();
            while let Some(value) = ring.pop() {
                popped.push(value);
            }
            prop_assert_eq!(popped, expected);
            prop_assert_eq!(ring.len(), 0);
        }
    }
}
