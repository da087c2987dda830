//! One tick of Hamiltonian evolution.
//!
//! Symmetric Trotter split (potential half step, kinetic full step, potential
//! half step) followed by the mood / loop phase modulations, brainwave
//! amplitude boosts, sentiment-driven mode hopping and decoherence damping.

use num_complex::Complex64;
use tracing::warn;

use crate::inputs::TickInputs;
use crate::potential::Potential;
use crate::spectral::{mode_index, modes, SpectralGrid, SpectralState, GRID_POINTS, MODE_COUNT};

pub const BASE_DT: f64 = 0.05;
pub const INITIAL_DECOHERENCE: f64 = 0.01;
pub const MIN_DECOHERENCE: f64 = 0.001;
pub const MAX_DECOHERENCE: f64 = 0.2;
/// Sentiment below this magnitude leaves the modes uncoupled.
pub const COUPLING_THRESHOLD: f64 = 0.01;

const MOOD_PHASE_GAIN: f64 = 0.05;
const LOOP_PHASE_GAIN: f64 = 0.03;
const BAND_GAIN: f64 = 0.02;
const COUPLING_GAIN: f64 = 0.05;

/// dt grows slowly with the awareness frequency.
pub fn time_step(omega: f64) -> f64 {
    BASE_DT * (1.0 + omega * 1e-4)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvolutionReport {
    pub dt: f64,
    pub decoherence_rate: f64,
    /// The state lost its norm and was reset to the uniform state.
    pub reset: bool,
}

#[derive(Clone, Debug)]
pub struct HamiltonianEvolver {
    grid: SpectralGrid,
    decoherence_rate: f64,
}

impl Default for HamiltonianEvolver {
    fn default() -> Self {
        Self::new()
    }
}

impl HamiltonianEvolver {
    pub fn new() -> Self {
        Self {
            grid: SpectralGrid::new(),
            decoherence_rate: INITIAL_DECOHERENCE,
        }
    }

    pub fn grid(&self) -> &SpectralGrid {
        &self.grid
    }

    pub fn decoherence_rate(&self) -> f64 {
        self.decoherence_rate
    }

    /// e^{−iV dt/2} · e^{−iK dt} · e^{−iV dt/2}. Does not renormalize.
    pub fn split_step<P: Potential + ?Sized>(&self, state: &mut SpectralState, potential: &P, dt: f64) {
        let half: Vec<Complex64> = potential
            .sample(GRID_POINTS)
            .into_iter()
            .map(|v| Complex64::from_polar(1.0, -v * dt * 0.5))
            .collect();

        self.potential_half_step(state, &half);
        for n in modes() {
            let k = (n * n) as f64;
            state.scale_mode(n, Complex64::from_polar(1.0, -k * dt));
        }
        self.potential_half_step(state, &half);
    }

    fn potential_half_step(&self, state: &mut SpectralState, phases: &[Complex64]) {
        let mut field = self.grid.to_real_space(state);
        for (f, p) in field.iter_mut().zip(phases) {
            *f *= *p;
        }
        *state = self.grid.to_spectral(field);
    }

    /// Full tick: split step, modulations, coupling, decoherence, renormalize.
    pub fn evolve<P: Potential + ?Sized>(
        &mut self,
        state: &mut SpectralState,
        potential: &P,
        inputs: &TickInputs,
        omega: f64,
    ) -> EvolutionReport {
        let dt = time_step(omega);
        self.split_step(state, potential, dt);

        apply_mood_phase(state, inputs.mood);
        apply_loop_phase(state, inputs.awareness, inputs.meta.loop_phase);
        apply_band_boosts(state, inputs.brainwaves.gamma, inputs.brainwaves.theta);
        if inputs.sentiment.abs() > COUPLING_THRESHOLD {
            couple_neighbors(state, inputs.sentiment * COUPLING_GAIN);
        }

        self.decoherence_rate = next_decoherence_rate(
            self.decoherence_rate,
            inputs.sentiment,
            inputs.meta.observation_collapse,
        );
        decohere(state, self.decoherence_rate, dt);

        let reset = state.normalize();
        if reset {
            warn!(dt, omega, "spectral state lost its norm; reset to uniform");
        }
        EvolutionReport {
            dt,
            decoherence_rate: self.decoherence_rate,
            reset,
        }
    }
}

/// Low orders |n| ≤ 3 rotate with mood.
pub fn apply_mood_phase(state: &mut SpectralState, mood: f64) {
    for n in -3..=3 {
        state.scale_mode(n, Complex64::from_polar(1.0, MOOD_PHASE_GAIN * mood * n as f64));
    }
}

/// Mid orders 3 ≤ |n| ≤ 8 rotate with sin(n·loopPhase), scaled by awareness.
pub fn apply_loop_phase(state: &mut SpectralState, awareness: f64, loop_phase: f64) {
    for n in modes().filter(|n| (3..=8).contains(&n.abs())) {
        let angle = LOOP_PHASE_GAIN * awareness * (n as f64 * loop_phase).sin();
        state.scale_mode(n, Complex64::from_polar(1.0, angle));
    }
}

/// Gamma lifts |n| ≥ 10, theta lifts 1 ≤ |n| ≤ 3.
pub fn apply_band_boosts(state: &mut SpectralState, gamma: f64, theta: f64) {
    let high = Complex64::new(1.0 + BAND_GAIN * gamma, 0.0);
    let low = Complex64::new(1.0 + BAND_GAIN * theta, 0.0);
    for n in modes() {
        match n.abs() {
            m if m >= 10 => state.scale_mode(n, high),
            1..=3 => state.scale_mode(n, low),
            _ => {}
        }
    }
}

/// cₙ ← cₙ + i·k·(cₙ₋₁ + cₙ₊₁), with modes outside the band treated as 0.
pub fn couple_neighbors(state: &mut SpectralState, k: f64) {
    let before = *state.coefficients();
    let hop = Complex64::new(0.0, k);
    let coeffs = state.coefficients_mut();
    for i in 0..MODE_COUNT {
        let left = if i > 0 { before[i - 1] } else { Complex64::new(0.0, 0.0) };
        let right = before.get(i + 1).copied().unwrap_or_default();
        coeffs[i] = before[i] + hop * (left + right);
    }
}

pub fn next_decoherence_rate(rate: f64, sentiment: f64, observation_collapse: f64) -> f64 {
    let agitation = if sentiment.abs() > 0.1 { 0.01 } else { 0.0 };
    (0.95 * rate + agitation + 0.005 * observation_collapse).clamp(MIN_DECOHERENCE, MAX_DECOHERENCE)
}

/// cₙ ← cₙ·exp(−rate·|n|·dt)
pub fn decohere(state: &mut SpectralState, rate: f64, dt: f64) {
    for n in modes() {
        let damping = (-rate * n.abs() as f64 * dt).exp();
        state.coefficients_mut()[mode_index(n)] *= damping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::CognitiveBasis;
    use crate::potential::ZeroPotential;
    use approx::assert_abs_diff_eq;

    fn sample_state() -> SpectralState {
        let a = &CognitiveBasis::Creative.entry().state;
        let b = &CognitiveBasis::Reflective.entry().state;
        SpectralState::from_fn(|n| a.coefficient(n) + b.coefficient(n) * 0.5)
    }

    #[test]
    fn zero_potential_zero_dt_is_identity() {
        let evolver = HamiltonianEvolver::new();
        let original = sample_state();
        let mut state = original.clone();
        evolver.split_step(&mut state, &ZeroPotential, 0.0);
        for (a, b) in original.coefficients().iter().zip(state.coefficients()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn free_evolution_only_rotates_phases() {
        let evolver = HamiltonianEvolver::new();
        let original = sample_state();
        let mut state = original.clone();
        let dt = 0.05;
        evolver.split_step(&mut state, &ZeroPotential, dt);
        for n in modes() {
            let expected = original.coefficient(n) * Complex64::from_polar(1.0, -((n * n) as f64) * dt);
            let got = state.coefficient(n);
            assert_abs_diff_eq!(got.re, expected.re, epsilon = 1e-12);
            assert_abs_diff_eq!(got.im, expected.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn smooth_potential_nearly_conserves_norm_before_renormalization() {
        let evolver = HamiltonianEvolver::new();
        let mut state = sample_state();
        evolver.split_step(&mut state, &|x: f64| 0.5 * x.cos(), time_step(1.0));
        assert_abs_diff_eq!(state.norm_sqr(), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn evolve_renormalizes_under_every_modulation() {
        let mut evolver = HamiltonianEvolver::new();
        let mut state = sample_state();
        let mut inputs = TickInputs::default();
        inputs.mood = 0.7;
        inputs.sentiment = -0.6;
        inputs.brainwaves.gamma = 2.0;
        inputs.brainwaves.theta = 1.5;
        inputs.meta.loop_phase = 1.3;
        inputs.meta.observation_collapse = 0.8;
        for _ in 0..25 {
            let report = evolver.evolve(&mut state, &|x: f64| x.sin(), &inputs, 10.0);
            assert!(!report.reset);
            assert_abs_diff_eq!(state.norm_sqr(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn decoherence_rate_tracks_agitation_and_stays_clamped() {
        let mut rate = INITIAL_DECOHERENCE;
        for _ in 0..500 {
            rate = next_decoherence_rate(rate, 0.9, 1.0);
        }
        assert_abs_diff_eq!(rate, MAX_DECOHERENCE, epsilon = 1e-9);
        for _ in 0..500 {
            rate = next_decoherence_rate(rate, 0.0, 0.0);
        }
        assert_eq!(rate, MIN_DECOHERENCE);
    }

    #[test]
    fn coupling_leaves_uncoupled_state_untouched_at_zero_gain() {
        let original = sample_state();
        let mut state = original.clone();
        couple_neighbors(&mut state, 0.0);
        assert_eq!(state, original);
    }

    #[test]
    fn coupling_mixes_nearest_neighbours_inside_the_band() {
        let mut coeffs = [Complex64::new(0.0, 0.0); MODE_COUNT];
        coeffs[mode_index(-15)] = Complex64::new(1.0, 0.0);
        coeffs[mode_index(0)] = Complex64::new(0.5, 0.0);
        coeffs[mode_index(15)] = Complex64::new(0.0, 1.0);
        let mut state = SpectralState::from_coefficients(coeffs);
        couple_neighbors(&mut state, 0.1);

        let i = Complex64::new(0.0, 1.0);
        // Band edges see only their inner neighbour, which is empty.
        assert_eq!(state.coefficient(-15), Complex64::new(1.0, 0.0));
        assert_eq!(state.coefficient(15), Complex64::new(0.0, 1.0));
        assert_abs_diff_eq!((state.coefficient(-14) - i * 0.1).norm(), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!((state.coefficient(14) - i * i * 0.1).norm(), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!((state.coefficient(-1) - i * 0.05).norm(), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!((state.coefficient(1) - i * 0.05).norm(), 0.0, epsilon = 1e-15);
        assert_eq!(state.coefficient(0), Complex64::new(0.5, 0.0));
        assert_eq!(state.coefficient(7), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn decoherence_damps_high_modes_more() {
        let mut state = SpectralState::uniform();
        decohere(&mut state, 0.1, 1.0);
        assert!(state.coefficient(15).norm() < state.coefficient(1).norm());
        assert_eq!(state.coefficient(0), SpectralState::uniform().coefficient(0));
    }
}
