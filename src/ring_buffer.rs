//! Fixed-capacity ring buffer used for job log history.
//!
//! Slots are physical; indices passed to [`RingBuffer::get`] are logical
//! (0 is the oldest stored element, -1 the newest) and wrap modulo the
//! capacity.

/// Bounded buffer that overwrites its oldest element when full
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    start: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer. A capacity of zero is legal; such a buffer
    /// never stores anything.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            start: 0,
            len: 0,
        }
    }

    /// Create a buffer holding the last `capacity` items of `items`.
    pub fn from_iter<I: IntoIterator<Item = T>>(capacity: usize, items: I) -> Self {
        let mut buffer = Self::new(capacity);
        buffer.extend(items);
        buffer
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.capacity() > 0 && self.len == self.capacity()
    }

    /// Append an item, evicting the oldest when full. No-op at capacity 0.
    pub fn add(&mut self, item: T) {
        let capacity = self.capacity();
        if capacity == 0 {
            return;
        }
        let slot = (self.start + self.len) % capacity;
        self.slots[slot] = Some(item);
        if self.len < capacity {
            self.len += 1;
        } else {
            self.start = (self.start + 1) % capacity;
        }
    }

    /// Append every item in order.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        if self.capacity() == 0 {
            return;
        }
        for item in items {
            self.add(item);
        }
    }

    /// Element at a logical index. Negative indices count back from the
    /// newest element; every index wraps modulo the capacity, so an index
    /// past the stored length may land on an empty slot.
    pub fn get(&self, index: isize) -> Option<&T> {
        let capacity = self.capacity();
        if capacity == 0 {
            return None;
        }
        let logical = if index < 0 {
            self.len as isize + index
        } else {
            index
        };
        let slot = (self.start as isize + logical).rem_euclid(capacity as isize) as usize;
        self.slots[slot].as_ref()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let capacity = self.capacity();
        (0..self.len).filter_map(move |offset| self.slots[(self.start + offset) % capacity].as_ref())
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.start = 0;
        self.len = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Stored elements, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
