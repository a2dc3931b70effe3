use std::ops::Range;

/// The live window of a fixed-capacity particle ring.
///
/// Live particles occupy slots `first_alive, first_alive + 1, …` (modulo
/// capacity) for `len` steps. New particles are claimed at `first_dead` and
/// retired from `first_alive`, so slots are reused in strict FIFO order and
/// the oldest particle is always at the front.
///
/// Invariants, held after every operation:
/// - `len <= capacity`
/// - `first_dead == (first_alive + len) % capacity`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveWindow {
    capacity: usize,
    first_alive: usize,
    first_dead: usize,
    len: usize,
}

impl LiveWindow {
    /// Empty window over `capacity` slots.
    ///
    /// Callers validate `capacity > 0`; the emitter never builds a zero-slot ring.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "LiveWindow requires a non-zero capacity");
        Self {
            capacity,
            first_alive: 0,
            first_dead: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slot holding the oldest live particle.
    #[inline]
    pub fn first_alive(&self) -> usize {
        self.first_alive
    }

    /// Slot the next spawned particle will be written to.
    #[inline]
    pub fn first_dead(&self) -> usize {
        self.first_dead
    }

    /// Number of live particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Whether the live slots cross the end of the array.
    ///
    /// A full window counts as wrapped unless it starts at slot 0.
    #[inline]
    pub fn is_wrapped(&self) -> bool {
        !self.is_empty() && self.first_alive + self.len > self.capacity
    }

    /// Claims the slot at `first_dead` for a new particle.
    ///
    /// Returns `None` when the pool is saturated; the spawn is dropped.
    pub fn claim(&mut self) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let slot = self.first_dead;
        self.first_dead = (self.first_dead + 1) % self.capacity;
        self.len += 1;
        Some(slot)
    }

    /// Retires the oldest particle. No-op on an empty window.
    pub fn retire_front(&mut self) {
        if self.is_empty() {
            return;
        }
        self.first_alive = (self.first_alive + 1) % self.capacity;
        self.len -= 1;
    }

    /// Live slot indices in ring order, oldest first.
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(move |i| (self.first_alive + i) % self.capacity)
    }

    /// The live window as two contiguous ranges, oldest first.
    ///
    /// The second range is empty unless the window wraps. Concatenating the
    /// two yields the slots in age order.
    pub fn segments(&self) -> (Range<usize>, Range<usize>) {
        if self.is_empty() {
            return (0..0, 0..0);
        }
        let end = self.first_alive + self.len;
        if end <= self.capacity {
            (self.first_alive..end, 0..0)
        } else {
            (self.first_alive..self.capacity, 0..end - self.capacity)
        }
    }

    /// Builds a window in an arbitrary state.
    #[cfg(test)]
    pub(crate) fn from_parts(capacity: usize, first_alive: usize, len: usize) -> Self {
        assert!(first_alive < capacity && len <= capacity);
        Self {
            capacity,
            first_alive,
            first_dead: (first_alive + len) % capacity,
            len,
        }
    }
}
