use nalgebra::Vector2;
use pendula_core::CartesianFrame;
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Trail Buffer
// ---------------------------------------------------------------------------

/// Recent lower-bob positions of one pendulum, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailBuffer {
    points: VecDeque<Vector2<f64>>,
    capacity: usize,
}

impl TrailBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, dropping the oldest once full. A zero-capacity
    /// buffer never stores anything.
    pub fn push(&mut self, point: Vector2<f64>) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn points(&self) -> impl Iterator<Item = &Vector2<f64>> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| [p.x, p.y]).collect()
    }
}

// ---------------------------------------------------------------------------
// Trail Set
// ---------------------------------------------------------------------------

/// One trail per pendulum, sampled every `interval` frames.
#[derive(Debug, Clone)]
pub struct Trails {
    buffers: Vec<TrailBuffer>,
    interval: usize,
    enabled: bool,
    updates: u64,
}

impl Trails {
    /// `enabled == false` or `length == 0` turns every update into a no-op.
    pub fn new(pendulums: usize, length: usize, interval: usize, enabled: bool) -> Self {
        let enabled = enabled && length > 0;
        let capacity = if enabled { length } else { 0 };
        Self {
            buffers: (0..pendulums).map(|_| TrailBuffer::new(capacity)).collect(),
            interval: interval.max(1),
            enabled,
            updates: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start every trail from the given frames' lower bobs.
    pub fn reset(&mut self, frames: &[CartesianFrame]) {
        self.updates = 0;
        for buffer in &mut self.buffers {
            buffer.clear();
        }
        if self.enabled {
            for (buffer, frame) in self.buffers.iter_mut().zip(frames) {
                buffer.push(frame.lower());
            }
        }
    }

    /// Record `frames` if `step` falls on the sampling interval.
    /// Returns whether a sample was taken.
    pub fn on_frame(&mut self, step: u64, frames: &[CartesianFrame]) -> bool {
        if !self.enabled || step % self.interval as u64 != 0 {
            return false;
        }
        self.updates += 1;
        for (buffer, frame) in self.buffers.iter_mut().zip(frames) {
            buffer.push(frame.lower());
        }
        true
    }

    /// Number of samples taken since the last reset.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn buffers(&self) -> &[TrailBuffer] {
        &self.buffers
    }

    /// Plain coordinate lists per pendulum, empty when disabled.
    pub fn snapshot(&self) -> Vec<Vec<[f64; 2]>> {
        if !self.enabled {
            return Vec::new();
        }
        self.buffers.iter().map(TrailBuffer::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(x: f64) -> CartesianFrame {
        CartesianFrame {
            x1: 0.0,
            y1: 1.0,
            x2: x,
            y2: 2.0,
        }
    }

    #[test]
    fn test_buffer_keeps_most_recent_fifo() {
        let mut trail = TrailBuffer::new(5);
        for i in 0..10 {
            trail.push(Vector2::new(i as f64, 0.0));
        }
        assert_eq!(trail.len(), 5);
        let xs: Vec<f64> = trail.points().map(|p| p.x).collect();
        assert_eq!(xs, vec![5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_zero_length_short_circuits() {
        let mut trail = TrailBuffer::new(0);
        trail.push(Vector2::new(1.0, 1.0));
        assert!(trail.is_empty());

        let mut trails = Trails::new(3, 0, 1, true);
        assert!(!trails.is_enabled());
        trails.reset(&[frame_at(0.0); 3]);
        assert!(!trails.on_frame(0, &[frame_at(1.0); 3]));
        assert!(trails.snapshot().is_empty());
    }

    #[test]
    fn test_sampling_interval() {
        let mut trails = Trails::new(2, 100, 3, true);
        trails.reset(&[frame_at(0.0); 2]);
        let taken: Vec<u64> = (0..10)
            .filter(|step| trails.on_frame(*step, &[frame_at(*step as f64); 2]))
            .collect();
        assert_eq!(taken, vec![0, 3, 6, 9]);
        assert_eq!(trails.updates(), 4);
        // Reset point plus four samples.
        assert_eq!(trails.buffers()[1].len(), 5);
        assert_eq!(trails.snapshot()[0].last(), Some(&[9.0, 2.0]));
    }

    #[test]
    fn test_ten_updates_with_length_five() {
        let mut trails = Trails::new(1, 5, 1, true);
        trails.reset(&[frame_at(-1.0)]);
        for step in 0..10 {
            trails.on_frame(step, &[frame_at(step as f64)]);
        }
        let xs: Vec<f64> = trails.snapshot()[0].iter().map(|p| p[0]).collect();
        assert_eq!(xs, vec![5.0, 6.0, 7.0, 8.0, 9.0]);
    }
}
