/// Fixed-capacity circular buffer. Allocates once; the oldest sample is
/// overwritten when full.
pub struct RingBuffer<T> {
    slots: Vec<T>,
    head: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer needs at least one slot");
        Self {
            slots: vec![T::default(); capacity],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn push(&mut self, value: T) {
        self.slots[self.head] = value;
        self.head = (self.head + 1) % self.capacity();
        self.len = (self.len + 1).min(self.capacity());
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let cap = self.capacity();
        let start = (self.head + cap - self.len) % cap;
        (0..self.len).map(move |i| &self.slots[(start + i) % cap])
    }

    /// The last `n` samples, oldest first.
    pub fn newest(&self, n: usize) -> impl Iterator<Item = &T> {
        self.iter().skip(self.len.saturating_sub(n))
    }

    pub fn latest(&self) -> Option<&T> {
        self.newest(1).next()
    }
}
