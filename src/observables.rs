//! Read-only observables of a spectral state.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::basis::BASIS_COUNT;
use crate::potential::Potential;
use crate::spectral::{modes, SpectralState, MODE_COUNT, NORM_EPSILON};

/// Quadrature points for the potential energy integral.
pub const ENERGY_GRID: usize = 64;
/// Samples in the reported probability waveform.
pub const WAVEFORM_POINTS: usize = 64;
/// Populations at or below this contribute nothing to the entropy.
pub const ENTROPY_FLOOR: f64 = 1e-15;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observables {
    pub entropy: f64,
    pub centroid: f64,
    pub spread: f64,
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    pub total_energy: f64,
    /// Mean angular position in [0, 2π).
    pub position: f64,
    pub coherence: f64,
    pub waveform: Vec<f64>,
}

impl Observables {
    pub fn extract<P: Potential + ?Sized>(
        state: &SpectralState,
        populations: &[f64; BASIS_COUNT],
        potential: &P,
    ) -> Self {
        let moments = SpectralMoments::of(state);
        let potential_energy = potential_energy(state, potential);
        Self {
            entropy: entropy(populations),
            centroid: moments.centroid,
            spread: moments.spread,
            kinetic_energy: moments.kinetic,
            potential_energy,
            total_energy: moments.kinetic + potential_energy,
            position: position_expectation(state),
            coherence: coherence(state),
            waveform: state.sample_density(WAVEFORM_POINTS),
        }
    }
}

/// −Σ p·log2 p over the basis populations.
pub fn entropy(populations: &[f64]) -> f64 {
    -populations
        .iter()
        .filter(|p| **p > ENTROPY_FLOOR)
        .map(|p| p * p.log2())
        .sum::<f64>()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpectralMoments {
    pub centroid: f64,
    pub spread: f64,
    /// ⟨n²⟩
    pub kinetic: f64,
}

impl SpectralMoments {
    pub fn of(state: &SpectralState) -> Self {
        let total = state.norm_sqr().max(NORM_EPSILON);
        let (mut first, mut second) = (0.0, 0.0);
        for (n, c) in modes().zip(state.coefficients().iter()) {
            let w = c.norm_sqr() / total;
            first += w * n as f64;
            second += w * (n * n) as f64;
        }
        Self {
            centroid: first,
            spread: (second - first * first).max(0.0).sqrt(),
            kinetic: second,
        }
    }
}

/// Mean of V(x)·|ψ(x)|² over the quadrature grid.
pub fn potential_energy<P: Potential + ?Sized>(state: &SpectralState, potential: &P) -> f64 {
    let v = potential.sample(ENERGY_GRID);
    let rho = state.sample_density(ENERGY_GRID);
    v.iter().zip(rho.iter()).map(|(v, r)| v * r).sum::<f64>() / ENERGY_GRID as f64
}

/// arg⟨e^{ix}⟩ = arg Σ conj(cₙ₊₁)·cₙ, wrapped to [0, 2π).
pub fn position_expectation(state: &SpectralState) -> f64 {
    let c = state.coefficients();
    let shift: num_complex::Complex64 = (0..MODE_COUNT - 1).map(|i| c[i + 1].conj() * c[i]).sum();
    if shift.norm() < NORM_EPSILON {
        return 0.0;
    }
    shift.arg().rem_euclid(TAU)
}

/// l1 coherence of the mode density matrix: Σ_{m≠n} |cₘ||cₙ|.
pub fn coherence(state: &SpectralState) -> f64 {
    let l1: f64 = state.coefficients().iter().map(|c| c.norm()).sum();
    (l1 * l1 - state.norm_sqr()).max(0.0)
}
