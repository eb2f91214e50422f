use crate::dynamics::{derivative, Constants};
use crate::state::StateVector;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------
pub const STEP_SIZE: f64 = 0.001;
pub const STEPS_PER_FRAME: usize = 32; // 0.032 time units per displayed frame

// ---------------------------------------------------------------------------
// RK4
// ---------------------------------------------------------------------------

/// One classic Runge-Kutta step of size `h` for `dy/dt = f(t, y)`.
///
/// ```text
/// k1 = f(t, p)
/// k2 = f(t + h/2, p + h/2 * k1)
/// k3 = f(t + h/2, p + h/2 * k2)
/// k4 = f(t + h, p + h * k3)
/// p' = p + h/6 * (k1 + 2 k2 + 2 k3 + k4)
/// ```
///
/// `p` is left untouched; the caller decides when to commit the result.
pub fn rk4_step<F>(f: F, h: f64, t: f64, p: &StateVector, c: &Constants) -> StateVector
where
    F: Fn(f64, &StateVector, &Constants) -> StateVector,
{
    let k1 = f(t, p, c);
    let k2 = f(t + h / 2.0, &p.offset(&k1, h / 2.0), c);
    let k3 = f(t + h / 2.0, &p.offset(&k2, h / 2.0), c);
    let k4 = f(t + h, &p.offset(&k3, h), c);

    let slope = k1.as_vector() + k2.as_vector() * 2.0 + k3.as_vector() * 2.0 + k4.as_vector();
    // `slope` has the same length as `p`, so the layout carries over.
    StateVector::from_parts(p.as_vector() + slope * (h / 6.0), p.pendulum_count())
}

// ---------------------------------------------------------------------------
// Frame Stepper
// ---------------------------------------------------------------------------

/// Fixed sub-stepping per displayed frame, independent of the display rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStepper {
    pub step_size: f64,
    pub steps_per_frame: usize,
}

impl Default for FrameStepper {
    fn default() -> Self {
        Self {
            step_size: STEP_SIZE,
            steps_per_frame: STEPS_PER_FRAME,
        }
    }
}

impl FrameStepper {
    /// Simulated time covered by one frame.
    pub fn frame_duration(&self) -> f64 {
        self.step_size * self.steps_per_frame as f64
    }

    /// Advance `p` by one frame worth of RK4 sub-steps starting at time `t`.
    pub fn advance(&self, t: f64, p: &StateVector, c: &Constants) -> StateVector {
        let mut state = p.clone();
        for i in 0..self.steps_per_frame {
            let ti = t + self.step_size * i as f64;
            state = rk4_step(derivative, self.step_size, ti, &state, c);
        }
        state
    }
}
