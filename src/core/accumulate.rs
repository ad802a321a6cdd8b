//! # Accumulator
//!
//! Bounded concatenation of a variable's blocks.
//!
//! Blocks are flattened in row-major order and appended to a running
//! buffer that never grows past `capacity`. When a block would carry the
//! buffer to (or past) the cap, just enough of it is absorbed to fill the
//! buffer exactly, the full buffer is handed out as a [`Flushed`], and the
//! unabsorbed remainder becomes the seed of the next generation.
//!
//! The very first block only seeds the buffer and never produces output,
//! even when it alone fills the buffer.

/// A full buffer plus the remainder of the block that filled it
#[derive(Debug, Clone, PartialEq)]
pub struct Flushed {
    /// Exactly `capacity` elements
    pub accumulated: Vec<f64>,

    /// Part of the triggering block not absorbed; seeds the next buffer
    pub overflow: Vec<f64>,
}

/// Running buffer for one variable
#[derive(Debug, Clone)]
pub struct Accumulator {
    capacity: usize,
    buffer: Vec<f64>,
    seeded: bool,
    generations: usize,
}

impl Accumulator {
    /// Create an empty accumulator; a zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buffer: Vec::new(),
            seeded: false,
            generations: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Elements currently held
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether a block has been seen yet
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Number of full buffers handed out so far
    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.buffer
    }

    /// Feed one block of elements
    ///
    /// Returns `Some` when the buffer reached the cap on this block.
    /// Blocks may be at most `capacity` long; a cursor whose `buf_size`
    /// equals the capacity never produces a longer one.
    ///
    /// # Panics
    ///
    /// If `block` is longer than the capacity.
    pub fn push(&mut self, block: &[f64]) -> Option<Flushed> {
        assert!(
            block.len() <= self.capacity,
            "block of {} elements exceeds accumulator capacity {}",
            block.len(),
            self.capacity
        );

        if !self.seeded {
            self.seeded = true;
            self.absorb_seed(block);
            return None;
        }

        let room = self.capacity.saturating_sub(self.buffer.len());
        if block.len() < room {
            self.buffer.extend_from_slice(block);
            return None;
        }

        let (head, tail) = block.split_at(room);
        self.buffer.extend_from_slice(head);
        let accumulated = std::mem::take(&mut self.buffer);
        self.absorb_seed(tail);
        self.generations += 1;

        Some(Flushed {
            accumulated,
            overflow: tail.to_vec(),
        })
    }

    /// Hand out whatever is left, leaving the accumulator empty
    pub fn drain(&mut self) -> Option<Vec<f64>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    fn absorb_seed(&mut self, seed: &[f64]) {
        self.buffer.clear();
        self.buffer.extend_from_slice(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(range: std::ops::Range<usize>) -> Vec<f64> {
        range.map(|v| v as f64).collect()
    }

    #[test]
    fn test_first_block_only_seeds() {
        let mut acc = Accumulator::new(4);
        assert!(acc.push(&seq(0..4)).is_none());
        assert_eq!(acc.len(), 4);
        assert!(acc.is_seeded());
    }

    #[test]
    fn test_full_buffer_flushes_on_next_block() {
        let mut acc = Accumulator::new(40);
        assert!(acc.push(&seq(0..40)).is_none());

        let flushed = acc.push(&seq(40..80)).unwrap();
        assert_eq!(flushed.accumulated, seq(0..40));
        assert_eq!(flushed.overflow, seq(40..80));
        assert_eq!(acc.as_slice(), seq(40..80).as_slice());

        let flushed = acc.push(&seq(80..100)).unwrap();
        assert_eq!(flushed.accumulated, seq(40..80));
        assert_eq!(flushed.overflow, seq(80..100));

        assert_eq!(acc.drain(), Some(seq(80..100)));
        assert!(acc.drain().is_none());
        assert_eq!(acc.generations(), 2);
    }

    #[test]
    fn test_partial_blocks_never_exceed_cap() {
        let mut acc = Accumulator::new(3);
        let mut out = Vec::new();

        for block in [seq(0..3), seq(3..5), seq(5..8), seq(8..10)] {
            if let Some(f) = acc.push(&block) {
                assert_eq!(f.accumulated.len(), 3);
                out.extend(f.accumulated);
            }
            assert!(acc.len() <= 3);
        }
        out.extend(acc.drain().unwrap_or_default());

        assert_eq!(out, seq(0..10));
    }

    #[test]
    fn test_small_blocks_grow_without_output() {
        let mut acc = Accumulator::new(10);
        assert!(acc.push(&seq(0..2)).is_none());
        assert!(acc.push(&seq(2..4)).is_none());
        assert!(acc.push(&seq(4..9)).is_none());
        assert_eq!(acc.len(), 9);

        let flushed = acc.push(&seq(9..12)).unwrap();
        assert_eq!(flushed.accumulated, seq(0..10));
        assert_eq!(flushed.overflow, seq(10..12));
    }

    #[test]
    fn test_exact_fill_leaves_empty_overflow() {
        let mut acc = Accumulator::new(4);
        acc.push(&seq(0..2));
        let flushed = acc.push(&seq(2..4)).unwrap();
        assert_eq!(flushed.accumulated, seq(0..4));
        assert!(flushed.overflow.is_empty());
        assert!(acc.is_empty());
        // an emptied buffer is not re-seeded: the next block just grows it
        assert!(acc.push(&seq(4..5)).is_none());
        assert_eq!(acc.len(), 1);
    }

    #[test]
    #[should_panic(expected = "exceeds accumulator capacity")]
    fn test_oversized_block_is_rejected() {
        let mut acc = Accumulator::new(4);
        acc.push(&seq(0..2));
        acc.push(&seq(2..7));
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        assert_eq!(Accumulator::new(0).capacity(), 1);
    }
}
