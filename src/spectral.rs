//! Truncated Fourier representation of the cognitive wavefunction.
//!
//! A state is the ordered set of coefficients cₙ, n ∈ [−15, 15], of
//! ψ(x) = Σ cₙ·e^{inx} on the periodic domain [0, 2π). The inner product is
//! the one induced by (1/2π)∫ conj(f)·g dx, which on coefficients reduces to
//! Σ conj(aₙ)·bₙ.

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Highest |n| kept in the series.
pub const MODE_CUTOFF: i32 = 15;
/// Number of retained modes.
pub const MODE_COUNT: usize = (2 * MODE_CUTOFF + 1) as usize;
/// Real-space grid used by the split-step propagator.
pub const GRID_POINTS: usize = 2 * MODE_COUNT;
/// Floor applied to every normalization factor.
pub const NORM_EPSILON: f64 = 1e-15;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Storage slot for mode `n`.
#[inline]
pub fn mode_index(n: i32) -> usize {
    debug_assert!(n.abs() <= MODE_CUTOFF, "mode {n} outside the band");
    (n + MODE_CUTOFF) as usize
}

/// Iterator over the retained mode numbers, lowest first.
pub fn modes() -> impl Iterator<Item = i32> + Clone {
    -MODE_CUTOFF..=MODE_CUTOFF
}

/// Signed angular distance wrapped to (−π, π].
pub fn wrap_angle(delta: f64) -> f64 {
    let wrapped = (delta + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpectralState {
    coeffs: [Complex64; MODE_COUNT],
}

impl SpectralState {
    /// Uniform-amplitude, zero-phase state. Used whenever a state loses its norm.
    pub fn uniform() -> Self {
        let amp = 1.0 / (MODE_COUNT as f64).sqrt();
        Self {
            coeffs: [Complex64::new(amp, 0.0); MODE_COUNT],
        }
    }

    /// Wraps raw coefficients without normalizing them.
    pub fn from_coefficients(coeffs: [Complex64; MODE_COUNT]) -> Self {
        Self { coeffs }
    }

    /// Builds a state from a per-mode generator and normalizes it.
    pub fn from_fn(mut f: impl FnMut(i32) -> Complex64) -> Self {
        let mut coeffs = [ZERO; MODE_COUNT];
        for n in modes() {
            coeffs[mode_index(n)] = f(n);
        }
        let mut state = Self { coeffs };
        state.normalize();
        state
    }

    pub fn coefficients(&self) -> &[Complex64; MODE_COUNT] {
        &self.coeffs
    }

    pub(crate) fn coefficients_mut(&mut self) -> &mut [Complex64; MODE_COUNT] {
        &mut self.coeffs
    }

    pub fn coefficient(&self, n: i32) -> Complex64 {
        self.coeffs[mode_index(n)]
    }

    pub fn norm_sqr(&self) -> f64 {
        self.coeffs.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Rescales to unit norm. Returns `true` when the state had no usable
    /// norm and was replaced by [`SpectralState::uniform`].
    pub fn normalize(&mut self) -> bool {
        let norm = self.norm_sqr().sqrt();
        if !norm.is_finite() || norm < NORM_EPSILON {
            *self = Self::uniform();
            return true;
        }
        let inv = 1.0 / norm.max(NORM_EPSILON);
        for c in self.coeffs.iter_mut() {
            *c *= inv;
        }
        false
    }

    /// ⟨self|other⟩
    pub fn inner(&self, other: &SpectralState) -> Complex64 {
        self.coeffs
            .iter()
            .zip(other.coeffs.iter())
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    /// ψ(x)
    pub fn amplitude_at(&self, x: f64) -> Complex64 {
        modes()
            .map(|n| self.coeffs[mode_index(n)] * Complex64::from_polar(1.0, n as f64 * x))
            .sum()
    }

    /// |ψ(x)|²
    pub fn density_at(&self, x: f64) -> f64 {
        self.amplitude_at(x).norm_sqr()
    }

    /// |ψ|² on `points` equally spaced angles starting at 0.
    pub fn sample_density(&self, points: usize) -> Vec<f64> {
        (0..points)
            .map(|j| self.density_at(TAU * j as f64 / points as f64))
            .collect()
    }

    /// (1 − s)·self + s·target, renormalized.
    pub fn blend_toward(&mut self, target: &SpectralState, strength: f64) {
        let s = strength.clamp(0.0, 1.0);
        for (c, t) in self.coeffs.iter_mut().zip(target.coeffs.iter()) {
            *c = *c * (1.0 - s) + *t * s;
        }
        self.normalize();
    }

    /// Multiplies coefficient `n` by `factor`.
    pub(crate) fn scale_mode(&mut self, n: i32, factor: Complex64) {
        self.coeffs[mode_index(n)] *= factor;
    }
}

impl Default for SpectralState {
    fn default() -> Self {
        Self::uniform()
    }
}

/// Cached FFT plans mapping between coefficients and the real-space grid.
///
/// Mode n lives in bucket n mod 62 of the transform buffer, so the inverse
/// transform evaluates ψ(2πj/62) exactly and the forward transform (scaled
/// by 1/62) recovers every retained mode without aliasing.
#[derive(Clone)]
pub struct SpectralGrid {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for SpectralGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralGrid")
            .field("points", &GRID_POINTS)
            .finish_non_exhaustive()
    }
}

impl Default for SpectralGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralGrid {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        Self {
            forward: planner.plan_fft_forward(GRID_POINTS),
            inverse: planner.plan_fft_inverse(GRID_POINTS),
        }
    }

    /// Angle of grid point `j`.
    #[inline]
    pub fn angle(j: usize) -> f64 {
        TAU * j as f64 / GRID_POINTS as f64
    }

    /// ψ sampled on the grid.
    pub fn to_real_space(&self, state: &SpectralState) -> Vec<Complex64> {
        let mut buffer = vec![ZERO; GRID_POINTS];
        for n in modes() {
            buffer[bucket(n)] = state.coeffs[mode_index(n)];
        }
        self.inverse.process(&mut buffer);
        buffer
    }

    /// Projects grid samples back onto the retained modes. Content outside the
    /// band is discarded; the result is not renormalized.
    pub fn to_spectral(&self, mut field: Vec<Complex64>) -> SpectralState {
        debug_assert_eq!(field.len(), GRID_POINTS);
        self.forward.process(&mut field);
        let scale = 1.0 / GRID_POINTS as f64;
        let mut coeffs = [ZERO; MODE_COUNT];
        for n in modes() {
            coeffs[mode_index(n)] = field[bucket(n)] * scale;
        }
        SpectralState { coeffs }
    }
}

#[inline]
fn bucket(n: i32) -> usize {
    n.rem_euclid(GRID_POINTS as i32) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn lopsided() -> SpectralState {
        SpectralState::from_fn(|n| Complex64::new(1.0 / (1.0 + n.abs() as f64), 0.1 * n as f64))
    }

    #[test]
    fn from_fn_is_normalized() {
        assert_abs_diff_eq!(lopsided().norm_sqr(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_state_falls_back_to_uniform() {
        let mut state = SpectralState::from_coefficients([ZERO; MODE_COUNT]);
        assert!(state.normalize());
        assert_eq!(state, SpectralState::uniform());
        assert_abs_diff_eq!(state.norm_sqr(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_state_falls_back_to_uniform() {
        let mut coeffs = [Complex64::new(0.2, 0.0); MODE_COUNT];
        coeffs[3] = Complex64::new(f64::NAN, 0.0);
        let mut state = SpectralState::from_coefficients(coeffs);
        assert!(state.normalize());
        assert_eq!(state, SpectralState::uniform());
    }

    #[test]
    fn inner_product_is_conjugate_linear_in_first_argument() {
        let a = lopsided();
        let b = SpectralState::uniform();
        let ab = a.inner(&b);
        let ba = b.inner(&a);
        assert_abs_diff_eq!(ab.re, ba.re, epsilon = 1e-12);
        assert_abs_diff_eq!(ab.im, -ba.im, epsilon = 1e-12);
        assert_abs_diff_eq!(a.inner(&a).re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_round_trip_preserves_coefficients() {
        let grid = SpectralGrid::new();
        let state = lopsided();
        let back = grid.to_spectral(grid.to_real_space(&state));
        for (a, b) in state.coefficients().iter().zip(back.coefficients()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn grid_samples_match_direct_evaluation() {
        let grid = SpectralGrid::new();
        let state = lopsided();
        let field = grid.to_real_space(&state);
        for j in [0, 7, 31, 61] {
            let direct = state.amplitude_at(SpectralGrid::angle(j));
            assert_abs_diff_eq!(field[j].re, direct.re, epsilon = 1e-10);
            assert_abs_diff_eq!(field[j].im, direct.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn density_integrates_to_one() {
        let state = lopsided();
        let samples = state.sample_density(128);
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        assert_abs_diff_eq!(mean, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn wrap_angle_lands_in_half_open_interval() {
        assert_abs_diff_eq!(wrap_angle(2.5 * PI), 0.5 * PI, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-PI), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(TAU + 0.25), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_angle(-0.5), -0.5, epsilon = 1e-12);
    }
}
