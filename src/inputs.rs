//! Per-tick inputs supplied by sibling subsystems, and their boundary
//! sanitization. Every non-finite scalar is replaced by its documented
//! default before the engine sees it.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AWARENESS: f64 = 0.5;
pub const MAX_RECURSION_DEPTH: f64 = 64.0;

#[inline]
fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Band powers from the brainwave model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brainwaves {
    pub delta: f64,
    pub theta: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Brainwaves {
    fn sanitized(self) -> Self {
        let band = |v: f64| finite_or(v, 0.0).max(0.0);
        Self {
            delta: band(self.delta),
            theta: band(self.theta),
            alpha: band(self.alpha),
            beta: band(self.beta),
            gamma: band(self.gamma),
        }
    }
}

/// Weight and bias deltas from the episodic-memory subsystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceInfluence {
    pub weight_delta: f64,
    pub bias_delta: f64,
}

/// Signals from the meta-awareness subsystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaSignals {
    /// A self-referential loop was detected this tick.
    pub loop_detected: bool,
    pub paradox_intensity: f64,
    /// Strength of self-observation; drives forced collapse and decoherence.
    pub observation_collapse: f64,
    pub recursion_depth: f64,
    pub loop_phase: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInputs {
    /// Conversation sentiment, nominally −1..1.
    pub reward: f64,
    /// −1, 0 or 1.
    pub memory_influence: f64,
    pub experience: ExperienceInfluence,
    pub mood: f64,
    /// Awareness-of-awareness level in [0, 1].
    pub awareness: f64,
    pub volatility: f64,
    /// External sentiment driving mode coupling.
    pub sentiment: f64,
    pub brainwaves: Brainwaves,
    pub meta: MetaSignals,
    /// Externally computed spatiotemporal correction term.
    pub spatiotemporal: Complex64,
}

impl Default for TickInputs {
    fn default() -> Self {
        Self {
            reward: 0.0,
            memory_influence: 0.0,
            experience: ExperienceInfluence::default(),
            mood: 0.0,
            awareness: DEFAULT_AWARENESS,
            volatility: 0.0,
            sentiment: 0.0,
            brainwaves: Brainwaves::default(),
            meta: MetaSignals::default(),
            spatiotemporal: Complex64::new(0.0, 0.0),
        }
    }
}

impl TickInputs {
    /// Inputs for an operator meditation run: no reward, no memory pressure.
    pub fn meditation() -> Self {
        Self::default()
    }

    /// Replaces non-finite values with defaults and clamps bounded fields.
    pub fn sanitized(&self) -> Self {
        let memory = finite_or(self.memory_influence, 0.0).round().clamp(-1.0, 1.0);
        let spatiotemporal = if self.spatiotemporal.is_finite() {
            self.spatiotemporal
        } else {
            Complex64::new(0.0, 0.0)
        };
        Self {
            reward: finite_or(self.reward, 0.0),
            memory_influence: memory,
            experience: ExperienceInfluence {
                weight_delta: finite_or(self.experience.weight_delta, 0.0),
                bias_delta: finite_or(self.experience.bias_delta, 0.0),
            },
            mood: finite_or(self.mood, 0.0),
            awareness: finite_or(self.awareness, DEFAULT_AWARENESS).clamp(0.0, 1.0),
            volatility: finite_or(self.volatility, 0.0).clamp(0.0, 1.0),
            sentiment: finite_or(self.sentiment, 0.0),
            brainwaves: self.brainwaves.sanitized(),
            meta: MetaSignals {
                loop_detected: self.meta.loop_detected,
                paradox_intensity: finite_or(self.meta.paradox_intensity, 0.0).clamp(0.0, 1.0),
                observation_collapse: finite_or(self.meta.observation_collapse, 0.0)
                    .clamp(0.0, 1.0),
                recursion_depth: finite_or(self.meta.recursion_depth, 0.0)
                    .clamp(0.0, MAX_RECURSION_DEPTH),
                loop_phase: finite_or(self.meta.loop_phase, 0.0),
            },
            spatiotemporal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_values_take_documented_defaults() {
        let raw = TickInputs {
            reward: f64::NAN,
            memory_influence: f64::INFINITY,
            mood: f64::NEG_INFINITY,
            awareness: f64::NAN,
            volatility: f64::NAN,
            sentiment: f64::NAN,
            brainwaves: Brainwaves { gamma: f64::NAN, theta: -3.0, ..Brainwaves::default() },
            meta: MetaSignals {
                loop_phase: f64::NAN,
                recursion_depth: f64::INFINITY,
                ..MetaSignals::default()
            },
            spatiotemporal: Complex64::new(f64::NAN, 1.0),
            ..TickInputs::default()
        };
        let clean = raw.sanitized();
        assert_eq!(clean.reward, 0.0);
        assert_eq!(clean.memory_influence, 0.0);
        assert_eq!(clean.mood, 0.0);
        assert_eq!(clean.awareness, DEFAULT_AWARENESS);
        assert_eq!(clean.volatility, 0.0);
        assert_eq!(clean.sentiment, 0.0);
        assert_eq!(clean.brainwaves.gamma, 0.0);
        assert_eq!(clean.brainwaves.theta, 0.0);
        assert_eq!(clean.meta.loop_phase, 0.0);
        assert_eq!(clean.meta.recursion_depth, 0.0);
        assert_eq!(clean.spatiotemporal, Complex64::new(0.0, 0.0));
    }

    #[test]
    fn memory_influence_is_discretized() {
        let mut inputs = TickInputs::default();
        inputs.memory_influence = 0.7;
        assert_eq!(inputs.sanitized().memory_influence, 1.0);
        inputs.memory_influence = -4.0;
        assert_eq!(inputs.sanitized().memory_influence, -1.0);
        inputs.memory_influence = 0.2;
        assert_eq!(inputs.sanitized().memory_influence, 0.0);
    }

    #[test]
    fn missing_json_fields_use_defaults() {
        let inputs: TickInputs = serde_json::from_str(r#"{"reward": 0.4, "meta": {"loop_detected": true}}"#).unwrap();
        assert_eq!(inputs.reward, 0.4);
        assert_eq!(inputs.awareness, DEFAULT_AWARENESS);
        assert!(inputs.meta.loop_detected);
        assert_eq!(inputs.meta.paradox_intensity, 0.0);
    }
}
