//! Temporal smoothing of the average arm elevation.

use std::collections::VecDeque;

/// Moving-average smoother over the most recent elevation samples.
///
/// Insertion order is arrival order; once `capacity` samples are held the
/// oldest is evicted. Five samples (~1/6 s at 30 fps) damp single-frame
/// landmark jitter without noticeable lag.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSmoother {
    capacity: usize,
    buffer: VecDeque<f64>,
}

impl AngleSmoother {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Add a sample and return the smoothed value
    pub fn push(&mut self, angle: f64) -> f64 {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(angle);
        self.mean()
    }

    /// Arithmetic mean of the buffered samples (0 when empty)
    pub fn mean(&self) -> f64 {
        if self.buffer.is_empty() {
            return 0.0;
        }
        self.buffer.iter().sum::<f64>() / self.buffer.len() as f64
    }

    /// Buffered samples, oldest first
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.buffer.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average() {
        let mut smoother = AngleSmoother::new(5);

        let signal = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let smoothed: Vec<f64> = signal.iter().map(|&x| smoother.push(x)).collect();

        // Partially filled buffer averages what it has
        assert!((smoothed[1] - 1.5).abs() < 1e-9);
        assert!((smoothed[4] - 3.0).abs() < 1e-9); // (1+2+3+4+5)/5
        assert!((smoothed[9] - 8.0).abs() < 1e-9); // (6+7+8+9+10)/5
    }

    #[test]
    fn test_evicts_oldest() {
        let mut smoother = AngleSmoother::new(3);
        for x in [10.0, 20.0, 30.0, 40.0] {
            smoother.push(x);
        }
        assert_eq!(smoother.len(), 3);
        assert_eq!(smoother.history().collect::<Vec<_>>(), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_single_spike_is_damped() {
        let mut smoother = AngleSmoother::new(5);
        for _ in 0..5 {
            smoother.push(10.0);
        }
        let spiked = smoother.push(60.0);
        assert!((spiked - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut smoother = AngleSmoother::new(4);
        smoother.push(45.0);
        smoother.reset();
        assert!(smoother.is_empty());
        assert_eq!(smoother.mean(), 0.0);
        assert_eq!(smoother.capacity(), 4);
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let mut smoother = AngleSmoother::new(0);
        assert_eq!(smoother.push(12.0), 12.0);
        assert_eq!(smoother.push(24.0), 24.0);
    }
}
