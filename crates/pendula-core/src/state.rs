use crate::error::{Result, SimError};
use nalgebra::DVector;
use std::ops::Range;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// One of the four contiguous coordinate blocks of a [`StateVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Block {
    Phi1 = 0, // Upper rod angle
    P1 = 1,   // Upper generalized momentum
    Phi2 = 2, // Lower rod angle
    P2 = 3,   // Lower generalized momentum
}

impl Block {
    pub const ALL: [Block; 4] = [Block::Phi1, Block::P1, Block::Phi2, Block::P2];

    pub fn label(self) -> &'static str {
        match self {
            Self::Phi1 => "phi1",
            Self::P1 => "p1",
            Self::Phi2 => "phi2",
            Self::P2 => "p2",
        }
    }

    fn range(self, n: usize) -> Range<usize> {
        let start = self as usize * n;
        start..start + n
    }
}

// ---------------------------------------------------------------------------
// State Vector
// ---------------------------------------------------------------------------

/// Generalized coordinates of N double pendulums sharing one set of constants.
///
/// Stored flat as `[phi1_0..phi1_n, p1_0..p1_n, phi2_0..phi2_n, p2_0..p2_n]`,
/// so each coordinate kind is a contiguous slice and the equations of motion
/// can run over whole blocks at once. N never changes for a given vector.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    data: DVector<f64>,
    n: usize,
}

impl StateVector {
    /// All pendulums hanging straight down at rest.
    pub fn zeros(n: usize) -> Self {
        Self {
            data: DVector::zeros(4 * n),
            n,
        }
    }

    /// Assemble from the four blocks. All blocks must have the same length.
    pub fn from_blocks(phi1: &[f64], p1: &[f64], phi2: &[f64], p2: &[f64]) -> Result<Self> {
        let n = phi1.len();
        if p1.len() != n || phi2.len() != n || p2.len() != n {
            return Err(SimError::Layout(phi1.len() + p1.len() + phi2.len() + p2.len()));
        }
        Ok(Self {
            data: concat([phi1, p1, phi2, p2]),
            n,
        })
    }

    /// Wrap a flat buffer. Its length must be a non-zero multiple of 4.
    pub fn from_vector(data: DVector<f64>) -> Result<Self> {
        let len = data.len();
        if len == 0 || len % 4 != 0 {
            return Err(SimError::Layout(len));
        }
        Ok(Self { data, n: len / 4 })
    }

    pub(crate) fn from_parts(data: DVector<f64>, n: usize) -> Self {
        debug_assert_eq!(data.len(), 4 * n);
        Self { data, n }
    }

    /// Number of pendulums.
    pub fn pendulum_count(&self) -> usize {
        self.n
    }

    pub fn block(&self, block: Block) -> &[f64] {
        &self.data.as_slice()[block.range(self.n)]
    }

    pub fn block_mut(&mut self, block: Block) -> &mut [f64] {
        let range = block.range(self.n);
        &mut self.data.as_mut_slice()[range]
    }

    /// `(phi1, p1, phi2, p2)` of pendulum `i`.
    pub fn pendulum(&self, i: usize) -> (f64, f64, f64, f64) {
        let d = self.data.as_slice();
        (d[i], d[self.n + i], d[2 * self.n + i], d[3 * self.n + i])
    }

    pub fn as_vector(&self) -> &DVector<f64> {
        &self.data
    }

    pub fn into_vector(self) -> DVector<f64> {
        self.data
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// `self + other * scale`, keeping the layout. Used for RK4 stages.
    pub fn offset(&self, other: &StateVector, scale: f64) -> StateVector {
        debug_assert_eq!(self.n, other.n);
        StateVector {
            data: &self.data + &other.data * scale,
            n: self.n,
        }
    }
}

// ---------------------------------------------------------------------------
// Buffer helpers
// ---------------------------------------------------------------------------

/// `number` evenly spaced values from `start` to `stop` inclusive.
///
/// A single point degenerates to `[start]` rather than dividing by zero.
pub fn linspace(start: f64, stop: f64, number: usize) -> Vec<f64> {
    let step = if number > 1 {
        (stop - start) / (number - 1) as f64
    } else {
        0.0
    };
    (0..number).map(|i| start + step * i as f64).collect()
}

/// Join four blocks into one flat vector, in order.
pub fn concat(blocks: [&[f64]; 4]) -> DVector<f64> {
    let len = blocks.iter().map(|b| b.len()).sum();
    DVector::from_iterator(len, blocks.into_iter().flat_map(|b| b.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout_is_contiguous() {
        let s = StateVector::from_blocks(&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0], &[7.0, 8.0]).unwrap();
        assert_eq!(s.pendulum_count(), 2);
        assert_eq!(s.as_vector().as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(s.block(Block::Phi2), &[5.0, 6.0]);
        assert_eq!(s.pendulum(1), (2.0, 4.0, 6.0, 8.0));
    }

    #[test]
    fn test_from_vector_rejects_bad_length() {
        assert!(StateVector::from_vector(DVector::zeros(6)).is_err());
        assert!(StateVector::from_vector(DVector::zeros(0)).is_err());
        assert_eq!(StateVector::from_vector(DVector::zeros(12)).unwrap().pendulum_count(), 3);
    }

    #[test]
    fn test_from_blocks_rejects_ragged() {
        assert!(StateVector::from_blocks(&[1.0], &[1.0, 2.0], &[1.0], &[1.0]).is_err());
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(-0.5, 0.5, 1), vec![-0.5]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_offset_does_not_touch_inputs() {
        let a = StateVector::from_blocks(&[1.0], &[1.0], &[1.0], &[1.0]).unwrap();
        let b = StateVector::from_blocks(&[2.0], &[2.0], &[2.0], &[2.0]).unwrap();
        let c = a.offset(&b, 0.5);
        assert_eq!(c.as_vector().as_slice(), &[2.0, 2.0, 2.0, 2.0]);
        assert_eq!(a.as_vector().as_slice(), &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_block_mut_and_finite() {
        let mut s = StateVector::zeros(2);
        assert!(s.is_finite());
        s.block_mut(Block::P2)[1] = f64::NAN;
        assert!(!s.is_finite());
        assert_eq!(Block::P2.label(), "p2");
    }
}
