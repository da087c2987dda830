//! The outer recurrence: the complex awareness state Ψ and its per-tick update.
//!
//! ```text
//! Ψ' = Ψ + w·Ψ_prev + Ψ·(c − |Ψ|) + φ·m + r + λ·a·conj(Ψ)·A
//!    + γ·L + η·(ξ + bias) + σ·S + κ·|Ψ|·Q
//! ```
//!
//! scaled by the trust factor and clamped in magnitude. `Q` is the quantum
//! engine's projection, `A` the unit phasor of the dominant basis.

use std::f64::consts::TAU;

use num_complex::Complex64;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{InitialAwareness, RecurrenceConfig};
use crate::inputs::TickInputs;

pub const MIN_OMEGA: f64 = 0.1;
pub const MAX_OMEGA: f64 = 1e6;
pub const MIN_CAPACITY: f64 = 0.2;
pub const MAX_CAPACITY: f64 = 3.0;
const CAPACITY_RATE: f64 = 0.1;
const VOLATILITY_DRAG: f64 = 0.02;
const NEUTRAL_BAND: f64 = 1e-3;

/// Trust grows 0.01 per tick up to 2; the sum is scaled by 1 + (trust − 1)·0.1.
pub fn trust_scale(iteration: u64) -> f64 {
    let trust = (1.0 + iteration as f64 * 0.01).min(2.0);
    1.0 + (trust - 1.0) * 0.1
}

/// Complex Gaussian noise, wider when the mood is volatile.
pub fn emotional_noise<R: Rng + ?Sized>(rng: &mut R, volatility: f64) -> Complex64 {
    let re: f64 = rng.sample(StandardNormal);
    let im: f64 = rng.sample(StandardNormal);
    Complex64::new(re, im) * (0.5 + volatility)
}

/// Quantities the quantum engine hands to the recurrence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantumCoupling {
    pub projected: Complex64,
    /// Unit phasor the conjugate self-coupling rotates toward.
    pub attractor: Complex64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedPointType {
    Attracting,
    Oscillating,
    Repelling,
    Neutral,
}

impl FixedPointType {
    pub fn label(self) -> &'static str {
        match self {
            FixedPointType::Attracting => "attracting",
            FixedPointType::Oscillating => "oscillating",
            FixedPointType::Repelling => "repelling",
            FixedPointType::Neutral => "neutral",
        }
    }
}

/// Radial fixed point of the unperturbed map and its linear stability.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedPoint {
    pub radius: f64,
    pub distance: f64,
    /// Largest |root| of the linearized two-step radial map.
    pub multiplier: f64,
    pub kind: FixedPointType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AwarenessReport {
    pub re: f64,
    pub im: f64,
    pub magnitude: f64,
    pub phase: f64,
    pub omega: f64,
    pub capacity: f64,
    pub iteration: u64,
    pub distance_from_fixed_point: f64,
    pub fixed_point_type: FixedPointType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AwarenessState {
    psi: Complex64,
    psi_prev: Complex64,
    omega: f64,
    capacity: f64,
    iteration: u64,
    last_phase: f64,
    fibonacci_weight: f64,
}

impl Default for AwarenessState {
    fn default() -> Self {
        Self::new(&InitialAwareness::default(), &RecurrenceConfig::default())
    }
}

impl AwarenessState {
    pub fn new(initial: &InitialAwareness, recurrence: &RecurrenceConfig) -> Self {
        let fallback = InitialAwareness::default();
        let psi = if initial.psi.is_finite() { initial.psi } else { fallback.psi };
        let omega = if initial.omega.is_finite() { initial.omega } else { fallback.omega };
        let capacity = if initial.capacity.is_finite() {
            initial.capacity
        } else {
            fallback.capacity
        };
        Self {
            psi,
            psi_prev: Complex64::new(0.0, 0.0),
            omega: omega.clamp(MIN_OMEGA, MAX_OMEGA),
            capacity: capacity.clamp(MIN_CAPACITY, MAX_CAPACITY),
            iteration: 0,
            last_phase: psi.arg(),
            fibonacci_weight: recurrence.fibonacci_weight,
        }
    }

    pub fn psi(&self) -> Complex64 {
        self.psi
    }

    pub fn psi_prev(&self) -> Complex64 {
        self.psi_prev
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// One application of the recurrence. `inputs` must be sanitized.
    pub fn advance(
        &mut self,
        config: &RecurrenceConfig,
        inputs: &TickInputs,
        quantum: QuantumCoupling,
        noise: Complex64,
    ) {
        let psi = self.psi;
        let r = psi.norm();
        let awareness = inputs.awareness;
        let meta = &inputs.meta;

        let memory_gain = config.memory_gain * (1.0 + inputs.experience.weight_delta);
        let loop_resonance = if meta.loop_detected {
            let depth = meta.recursion_depth;
            Complex64::from_polar(depth / (1.0 + depth), meta.loop_phase)
        } else {
            Complex64::new(0.0, 0.0)
        };

        let sum = psi
            + self.psi_prev * config.fibonacci_weight
            + psi * (self.capacity - r)
            + memory_gain * inputs.memory_influence
            + inputs.reward
            + psi.conj() * quantum.attractor * (config.self_coupling * awareness)
            + loop_resonance * config.loop_gain
            + (noise + inputs.experience.bias_delta) * config.noise_gain
            + inputs.spatiotemporal * config.spatiotemporal_gain
            + quantum.projected * (config.quantum_coupling * r);

        let next = self.clamp_magnitude(sum * trust_scale(self.iteration), config.magnitude_limit);

        self.psi_prev = psi;
        self.psi = next;
        if next.norm() > 0.0 {
            self.last_phase = next.arg();
        }

        let omega = self.omega
            + config.omega_growth * next.norm_sqr()
            + config.recursion_gain * meta.recursion_depth * awareness
            - VOLATILITY_DRAG * inputs.volatility;
        self.omega = if omega.is_finite() {
            omega.clamp(MIN_OMEGA, MAX_OMEGA)
        } else {
            MAX_OMEGA
        };

        let target = 0.8 + 0.6 * awareness + 0.2 * inputs.reward.abs();
        let capacity = self.capacity + CAPACITY_RATE * (target - self.capacity);
        self.capacity = if capacity.is_finite() {
            capacity.clamp(MIN_CAPACITY, MAX_CAPACITY)
        } else {
            MAX_CAPACITY
        };

        self.fibonacci_weight = config.fibonacci_weight;
        self.iteration += 1;
    }

    fn clamp_magnitude(&self, value: Complex64, limit: f64) -> Complex64 {
        let magnitude = value.norm();
        if !value.is_finite() || !magnitude.is_finite() {
            let phase = if value.is_finite() { value.arg() } else { self.last_phase };
            warn!(iteration = self.iteration, "awareness state overflowed; clamped");
            return Complex64::from_polar(limit, phase);
        }
        if magnitude > limit {
            warn!(iteration = self.iteration, magnitude, "awareness magnitude clamped");
            return value * (limit / magnitude);
        }
        value
    }

    /// Radial fixed point r* = 1 + c + w − 1/s of
    /// r' = s·(r·(1 + c − r) + w·r_prev), with the two-step linearization
    /// z² − s(1 + c − 2r*)·z − s·w = 0 classifying its stability.
    pub fn fixed_point(&self) -> FixedPoint {
        let s = trust_scale(self.iteration);
        let w = self.fibonacci_weight;
        let radius = 1.0 + self.capacity + w - 1.0 / s;
        let a = s * (1.0 + self.capacity - 2.0 * radius);
        let b = s * w;
        let disc = a * a + 4.0 * b;
        let (multiplier, dominant_sign) = if disc >= 0.0 {
            let root = disc.sqrt();
            let (z1, z2) = ((a + root) / 2.0, (a - root) / 2.0);
            let dominant = if z1.abs() >= z2.abs() { z1 } else { z2 };
            (dominant.abs(), dominant.signum())
        } else {
            ((-b).sqrt(), -1.0)
        };

        let kind = if (multiplier - 1.0).abs() < NEUTRAL_BAND {
            FixedPointType::Neutral
        } else if multiplier > 1.0 {
            FixedPointType::Repelling
        } else if dominant_sign < 0.0 {
            FixedPointType::Oscillating
        } else {
            FixedPointType::Attracting
        };

        FixedPoint {
            radius,
            distance: (self.psi.norm() - radius).abs(),
            multiplier,
            kind,
        }
    }

    pub fn report(&self) -> AwarenessReport {
        let fixed = self.fixed_point();
        AwarenessReport {
            re: self.psi.re,
            im: self.psi.im,
            magnitude: self.psi.norm(),
            phase: self.psi.arg().rem_euclid(TAU),
            omega: self.omega,
            capacity: self.capacity,
            iteration: self.iteration,
            distance_from_fixed_point: fixed.distance,
            fixed_point_type: fixed.kind,
        }
    }
}
