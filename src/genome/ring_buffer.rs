use crate::utils::math_utils::MathUtils;

/// Fixed-capacity ring buffer backing `Genome`'s `fAccept`/`pBad` running
/// averages. `record` overwrites the oldest slot once full, maintaining
/// `sum` incrementally rather than re-summing the buffer.
pub struct RingBuffer {
    buffer: Vec<f64>,
    pos: usize,
    len: usize,
    sum: f64,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> RingBuffer {
        assert!(capacity > 0, "ring buffer capacity must be positive");
        RingBuffer {
            buffer: vec![0.0; capacity],
            pos: 0,
            len: 0,
            sum: 0.0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn record(&mut self, value: f64) {
        let cap = self.buffer.len();
        if self.len == cap {
            self.sum -= self.buffer[self.pos];
        } else {
            self.len += 1;
        }
        self.buffer[self.pos] = value;
        self.sum += value;
        self.sum = MathUtils::clamp_drift(self.sum, 1e-10).max(0.0);
        self.pos = (self.pos + 1) % cap;
    }

    pub fn record_bool(&mut self, value: bool) {
        self.record(if value { 1.0 } else { 0.0 });
    }

    /// Running average, or `0.5` (the default-uncertain prior) when empty.
    pub fn average(&self) -> f64 {
        if self.len == 0 {
            0.5
        } else {
            self.sum / self.len as f64
        }
    }

    pub fn reset(&mut self) {
        for slot in self.buffer.iter_mut() {
            *slot = 0.0;
        }
        self.pos = 0;
        self.len = 0;
        self.sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn average_defaults_to_one_half_when_empty() {
        let rb = RingBuffer::new(4);
        assert_approx_eq!(rb.average(), 0.5, 1e-12);
    }

    #[test]
    fn sum_tracks_recorded_values_below_capacity() {
        let mut rb = RingBuffer::new(4);
        rb.record(1.0);
        rb.record(0.0);
        rb.record(1.0);
        assert_eq!(rb.len(), 3);
        assert_approx_eq!(rb.sum(), 2.0, 1e-12);
        assert_approx_eq!(rb.average(), 2.0 / 3.0, 1e-12);
    }

    #[test]
    fn overwrite_at_capacity_keeps_sum_correct() {
        let mut rb = RingBuffer::new(3);
        rb.record(1.0);
        rb.record(1.0);
        rb.record(1.0);
        assert_approx_eq!(rb.sum(), 3.0, 1e-12);
        // overwrites the first 1.0 with a 0.0
        rb.record(0.0);
        assert_eq!(rb.len(), 3);
        assert_approx_eq!(rb.sum(), 2.0, 1e-12);
        assert!(rb.pos < rb.capacity());
    }

    #[test]
    fn reset_clears_everything() {
        let mut rb = RingBuffer::new(3);
        rb.record(1.0);
        rb.record(1.0);
        rb.reset();
        assert_eq!(rb.len(), 0);
        assert_approx_eq!(rb.sum(), 0.0, 1e-12);
        assert_approx_eq!(rb.average(), 0.5, 1e-12);
    }
}
