//! Real periodic potentials V(x) and their weighted composition.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::basis::CognitiveBasis;
use crate::goals::GoalAttractor;
use crate::inputs::TickInputs;
use crate::spectral::wrap_angle;
use crate::trajectory::TrajectoryMemory;

/// Floor on the raw environmental weight.
pub const MIN_ENV_WEIGHT: f64 = 0.1;

/// A real-valued function on the circle.
pub trait Potential {
    fn value(&self, x: f64) -> f64;

    /// V on `points` equally spaced angles starting at 0.
    fn sample(&self, points: usize) -> Vec<f64> {
        (0..points)
            .map(|j| self.value(TAU * j as f64 / points as f64))
            .collect()
    }
}

impl<F> Potential for F
where
    F: Fn(f64) -> f64,
{
    fn value(&self, x: f64) -> f64 {
        self(x)
    }
}

/// V ≡ 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroPotential;

impl Potential for ZeroPotential {
    fn value(&self, _x: f64) -> f64 {
        0.0
    }
}

/// Cosine harmonics of orders 1–4 driven by the sibling models.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnvironmentalPotential {
    pub mood: f64,
    pub awareness: f64,
    pub volatility: f64,
    pub alpha: f64,
    pub beta: f64,
    pub sentiment: f64,
}

impl EnvironmentalPotential {
    pub fn from_inputs(inputs: &TickInputs) -> Self {
        Self {
            mood: inputs.mood,
            awareness: inputs.awareness,
            volatility: inputs.volatility,
            alpha: inputs.brainwaves.alpha,
            beta: inputs.brainwaves.beta,
            sentiment: inputs.sentiment,
        }
    }
}

impl Potential for EnvironmentalPotential {
    fn value(&self, x: f64) -> f64 {
        self.mood * x.cos()
            + self.awareness * (2.0 * x).cos()
            + self.volatility * (3.0 * x).cos()
            + 0.5 * (self.alpha - self.beta) * (4.0 * x).cos()
            + self.sentiment * (x - FRAC_PI_2).cos()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basin {
    pub center: f64,
    pub width: f64,
    pub depth: f64,
}

/// Sum of Gaussian wells: V(x) = −Σ depth·exp(−Δ²/(2w²)).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BasinPotential {
    basins: Vec<Basin>,
}

impl BasinPotential {
    pub fn new(basins: Vec<Basin>) -> Self {
        Self { basins }
    }

    /// One well per attractor, centred on its basis.
    pub fn from_attractors(attractors: &[GoalAttractor]) -> Self {
        Self::new(
            attractors
                .iter()
                .map(|a| Basin {
                    center: a.basis.center(),
                    width: a.basis.width(),
                    depth: a.strength,
                })
                .collect(),
        )
    }

    /// One well per basis, deepened by visit frequency and recent dominance.
    pub fn from_memory(memory: &TrajectoryMemory) -> Self {
        let amplitudes = memory.basin_amplitudes();
        Self::new(
            CognitiveBasis::ALL
                .into_iter()
                .filter(|b| amplitudes[b.index()] > 0.0)
                .map(|b| Basin {
                    center: b.center(),
                    width: b.width(),
                    depth: amplitudes[b.index()],
                })
                .collect(),
        )
    }

    pub fn basins(&self) -> &[Basin] {
        &self.basins
    }
}

impl Potential for BasinPotential {
    fn value(&self, x: f64) -> f64 {
        -self
            .basins
            .iter()
            .map(|b| {
                let d = wrap_angle(x - b.center);
                b.depth * (-d * d / (2.0 * b.width * b.width)).exp()
            })
            .sum::<f64>()
    }
}

/// Normalized mixing weights; always sum to 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PotentialWeights {
    pub environment: f64,
    pub goal: f64,
    pub memory: f64,
}

impl PotentialWeights {
    pub fn compose(intention: f64, memory_strength: f64) -> Self {
        let raw_goal = intention.max(0.0);
        let raw_mem = memory_strength.max(0.0);
        let raw_env = (1.0 - raw_goal - raw_mem).max(MIN_ENV_WEIGHT);
        let total = raw_env + raw_goal + raw_mem;
        Self {
            environment: raw_env / total,
            goal: raw_goal / total,
            memory: raw_mem / total,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CombinedPotential {
    pub weights: PotentialWeights,
    pub environment: EnvironmentalPotential,
    pub goal: BasinPotential,
    pub memory: BasinPotential,
}

impl Potential for CombinedPotential {
    fn value(&self, x: f64) -> f64 {
        self.weights.environment * self.environment.value(x)
            + self.weights.goal * self.goal.value(x)
            + self.weights.memory * self.memory.value(x)
    }
}
