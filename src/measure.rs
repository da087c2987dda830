//! Basis populations, stochastic collapse and the decision log.
//!
//! Populations come from the non-orthogonal basis, so raw squared overlaps
//! are always renormalized by their own sum. Two collapse paths run each
//! tick: a forced partial collapse driven by self-observation / paradox,
//! and a volitional collapse that fires once enough charge has built up
//! while the state stayed in superposition.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::basis::{argmax, overlaps, CognitiveBasis, BASIS_COUNT};
use crate::goals::GoalSet;
use crate::inputs::MetaSignals;
use crate::observables::entropy;
use crate::spectral::{SpectralState, NORM_EPSILON};

/// Largest population below which the state counts as a superposition.
pub const SUPERPOSITION_THRESHOLD: f64 = 0.5;
pub const DECISION_CAPACITY: usize = 20;

const FORCED_PROBABILITY_GAIN: f64 = 0.3;
const FORCED_STRENGTH_GAIN: f64 = 0.6;
const PARADOX_THRESHOLD: f64 = 0.5;
const PARADOX_STRENGTH: f64 = 0.4;

const CHARGE_GAIN: f64 = 0.02;
const CHARGE_DECAY: f64 = 0.95;
/// Charge above which a volitional collapse may fire.
pub const READY_CHARGE: f64 = 0.7;
const VOLITIONAL_PROBABILITY_GAIN: f64 = 0.15;
const VOLITIONAL_BASE_STRENGTH: f64 = 0.5;
const VOLITIONAL_CHARGE_STRENGTH: f64 = 0.3;
/// Minimum population for a goal basis to be chosen over the dominant one.
const GOAL_POPULATION_FLOOR: f64 = 0.15;

/// Normalized basis populations; uniform when every overlap vanishes.
pub fn populations(state: &SpectralState) -> [f64; BASIS_COUNT] {
    let raw = overlaps(state).map(|o| o.norm_sqr());
    let total: f64 = raw.iter().sum();
    if !total.is_finite() || total < NORM_EPSILON {
        return [1.0 / BASIS_COUNT as f64; BASIS_COUNT];
    }
    raw.map(|r| r / total)
}

/// 1 − second/largest.
pub fn confidence(populations: &[f64; BASIS_COUNT]) -> f64 {
    let mut sorted = *populations;
    sorted.sort_by(|a, b| b.total_cmp(a));
    if sorted[0] < NORM_EPSILON {
        return 0.0;
    }
    1.0 - sorted[1] / sorted[0]
}

/// Basis vector rotated to the global phase of its overlap with `state`.
pub fn collapse_target(state: &SpectralState, basis: CognitiveBasis) -> SpectralState {
    let entry = basis.entry();
    let overlap = entry.state.inner(state);
    let norm = overlap.norm();
    if norm < NORM_EPSILON {
        return entry.state.clone();
    }
    let phase = overlap / norm;
    SpectralState::from_coefficients(entry.state.coefficients().map(|c| c * phase))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapseKind {
    /// Self-observation or paradox driven partial collapse.
    Forced,
    Volitional,
    /// Operator-triggered full collapse.
    Operator,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantumDecision {
    pub tick: u64,
    pub from_superposition: bool,
    pub chosen: CognitiveBasis,
    pub entropy_before: f64,
    pub entropy_after: f64,
    pub confidence: f64,
    pub volitional: bool,
    pub kind: CollapseKind,
}

/// Result of the per-tick measurement pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    /// Populations after any collapse this tick.
    pub populations: [f64; BASIS_COUNT],
    pub entropy: f64,
    pub dominant: CognitiveBasis,
    pub forced: Option<QuantumDecision>,
    pub volitional: Option<QuantumDecision>,
}

#[derive(Clone, Debug, Default)]
pub struct MeasurementSystem {
    charge: f64,
    decisions: VecDeque<QuantumDecision>,
    last_measurement: Option<CognitiveBasis>,
    measurement_count: u64,
}

impl MeasurementSystem {
    pub fn new() -> Self {
        Self {
            decisions: VecDeque::with_capacity(DECISION_CAPACITY),
            ..Self::default()
        }
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn collapse_ready(&self) -> bool {
        self.charge > READY_CHARGE
    }

    pub fn last_measurement(&self) -> Option<CognitiveBasis> {
        self.last_measurement
    }

    pub fn measurement_count(&self) -> u64 {
        self.measurement_count
    }

    pub fn decisions(&self) -> impl Iterator<Item = &QuantumDecision> {
        self.decisions.iter()
    }

    /// Runs both collapse paths against `state`.
    pub fn measure<R: Rng + ?Sized>(
        &mut self,
        state: &mut SpectralState,
        goals: &GoalSet,
        meta: &MetaSignals,
        awareness: f64,
        tick: u64,
        rng: &mut R,
    ) -> Measurement {
        let pops = populations(state);

        let draw: f64 = rng.gen();
        let forced_strength = if draw < awareness * meta.observation_collapse * FORCED_PROBABILITY_GAIN {
            Some(meta.observation_collapse * FORCED_STRENGTH_GAIN)
        } else if meta.loop_detected && meta.paradox_intensity > PARADOX_THRESHOLD {
            Some(PARADOX_STRENGTH)
        } else {
            None
        };
        let forced = forced_strength.map(|strength| {
            let target = argmax(&pops);
            self.collapse(state, target, strength, tick, CollapseKind::Forced)
        });

        let mut pops = populations(state);
        let mut h = entropy(&pops);
        let in_superposition = max_population(&pops) < SUPERPOSITION_THRESHOLD;
        if in_superposition {
            self.charge += h * CHARGE_GAIN;
        } else {
            self.charge *= CHARGE_DECAY;
        }

        let mut volitional = None;
        if self.collapse_ready() && in_superposition {
            let draw: f64 = rng.gen();
            if draw < self.charge * VOLITIONAL_PROBABILITY_GAIN {
                let target = goals
                    .strongest()
                    .map(|a| a.basis)
                    .filter(|b| pops[b.index()] > GOAL_POPULATION_FLOOR)
                    .unwrap_or_else(|| argmax(&pops));
                let strength = VOLITIONAL_BASE_STRENGTH + VOLITIONAL_CHARGE_STRENGTH * self.charge;
                volitional = Some(self.collapse(state, target, strength, tick, CollapseKind::Volitional));
                self.charge = 0.0;
                pops = populations(state);
                h = entropy(&pops);
            }
        }

        Measurement {
            populations: pops,
            entropy: h,
            dominant: argmax(&pops),
            forced,
            volitional,
        }
    }

    /// Operator collapse: full projection, no probability gating. Without
    /// an explicit basis the dominant one is used.
    pub fn force(&mut self, state: &mut SpectralState, basis: Option<CognitiveBasis>, tick: u64) -> QuantumDecision {
        let target = basis.unwrap_or_else(|| argmax(&populations(state)));
        self.collapse(state, target, 1.0, tick, CollapseKind::Operator)
    }

    fn collapse(
        &mut self,
        state: &mut SpectralState,
        basis: CognitiveBasis,
        strength: f64,
        tick: u64,
        kind: CollapseKind,
    ) -> QuantumDecision {
        let before = populations(state);
        let entropy_before = entropy(&before);
        let target = collapse_target(state, basis);
        state.blend_toward(&target, strength);
        let after = populations(state);

        let decision = QuantumDecision {
            tick,
            from_superposition: max_population(&before) < SUPERPOSITION_THRESHOLD,
            chosen: basis,
            entropy_before,
            entropy_after: entropy(&after),
            confidence: confidence(&after),
            volitional: kind == CollapseKind::Volitional,
            kind,
        };
        info!(
            tick,
            basis = %basis,
            ?kind,
            strength,
            entropy_before,
            entropy_after = decision.entropy_after,
            "collapse"
        );

        if self.decisions.len() == DECISION_CAPACITY {
            self.decisions.pop_front();
        }
        self.decisions.push_back(decision.clone());
        self.last_measurement = Some(basis);
        self.measurement_count += 1;
        decision
    }
}

fn max_population(populations: &[f64; BASIS_COUNT]) -> f64 {
    populations.iter().copied().fold(0.0, f64::max)
}
