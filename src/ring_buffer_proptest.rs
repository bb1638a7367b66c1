//! Property-based tests for the ring buffer.
//!
//! These tests use proptest to generate random insertion sequences and
//! verify that the buffer's invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::ring_buffer::RingBuffer;
    use proptest::prelude::*;

    proptest! {
        /// Property: the buffer never holds more than its capacity
        #[test]
        fn length_never_exceeds_capacity(
            capacity in 0usize..16,
            items in prop::collection::vec(any::<u8>(), 0..64)
        ) {
            let buffer = RingBuffer::from_iter(capacity, items);
            prop_assert!(buffer.to_vec().len() <= capacity);
        }

        /// Property: after any number of adds the buffer holds the most
        /// recent `capacity` items in insertion order
        #[test]
        fn keeps_last_items_in_order(
            capacity in 1usize..16,
            items in prop::collection::vec(any::<u16>(), 0..64)
        ) {
            let mut buffer = RingBuffer::new(capacity);
            for item in &items {
                buffer.add(*item);
            }
            let skip = items.len().saturating_sub(capacity);
            prop_assert_eq!(buffer.to_vec(), items[skip..].to_vec());
        }

        /// Property: get(-1) is the most recently added element
        #[test]
        fn last_index_is_newest(
            capacity in 1usize..16,
            items in prop::collection::vec(any::<i32>(), 1..64)
        ) {
            let buffer = RingBuffer::from_iter(capacity, items.clone());
            prop_assert_eq!(buffer.get(-1), items.last());
        }

        /// Property: indices wrap modulo capacity on a full buffer
        #[test]
        fn index_wraps_modulo_capacity(
            capacity in 1usize..16,
            extra in 0usize..16,
            index in 0isize..64
        ) {
            let items: Vec<usize> = (0..capacity + extra).collect();
            let buffer = RingBuffer::from_iter(capacity, items);
            let wrapped = index.rem_euclid(capacity as isize);
            prop_assert_eq!(buffer.get(index), buffer.get(wrapped));
        }

        /// Property: full and empty are mutually exclusive
        #[test]
        fn full_and_empty_are_exclusive(
            capacity in 0usize..16,
            count in 0usize..32
        ) {
            let buffer = RingBuffer::from_iter(capacity, 0..count);
            prop_assert!(!(buffer.is_full() && buffer.is_empty()));
        }
    }
}
