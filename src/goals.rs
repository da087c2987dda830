//! Goal attractors: decaying basins that bias evolution toward a basis.

use serde::{Deserialize, Serialize};

use crate::basis::{CognitiveBasis, BASIS_COUNT};

/// Only the most recent attractors survive an insert.
pub const MAX_ATTRACTORS: usize = 6;
/// Attractors weaker than this are dropped after decay.
pub const MIN_STRENGTH: f64 = 0.01;
/// Population above which an emergent attractor forms.
pub const EMERGENT_THRESHOLD: f64 = 0.4;
pub const EMERGENT_GAIN: f64 = 0.25;
pub const LEARNED_STRENGTH: f64 = 0.2;
/// Ceiling of the intention weight fed to the potential mix.
pub const MAX_INTENTION: f64 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttractorOrigin {
    /// Set explicitly by an operator.
    Volitional,
    /// Formed when a basis dominated the populations.
    Emergent,
    /// Formed from repeated dominance in trajectory memory.
    Learned,
}

impl AttractorOrigin {
    /// Per-tick geometric decay multiplier.
    pub fn decay(self) -> f64 {
        match self {
            AttractorOrigin::Volitional => 0.98,
            AttractorOrigin::Emergent => 0.95,
            AttractorOrigin::Learned => 0.99,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalAttractor {
    pub basis: CognitiveBasis,
    pub strength: f64,
    pub decay: f64,
    pub created_tick: u64,
    pub origin: AttractorOrigin,
}

impl GoalAttractor {
    pub fn new(basis: CognitiveBasis, strength: f64, created_tick: u64, origin: AttractorOrigin) -> Self {
        let strength = if strength.is_finite() { strength.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            basis,
            strength,
            decay: origin.decay(),
            created_tick,
            origin,
        }
    }
}

/// Ordered oldest → newest.
#[derive(Clone, Debug, Default)]
pub struct GoalSet {
    attractors: Vec<GoalAttractor>,
}

impl GoalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, attractor: GoalAttractor) {
        self.attractors.push(attractor);
        if self.attractors.len() > MAX_ATTRACTORS {
            let excess = self.attractors.len() - MAX_ATTRACTORS;
            self.attractors.drain(..excess);
        }
    }

    /// Applies one tick of decay and drops spent attractors.
    pub fn decay(&mut self) {
        for attractor in self.attractors.iter_mut() {
            attractor.strength *= attractor.decay;
        }
        self.attractors.retain(|a| a.strength >= MIN_STRENGTH);
    }

    /// Adds an emergent attractor for every basis whose population crossed
    /// the threshold and has none yet. Returns the bases that gained one.
    pub fn spawn_emergent(&mut self, populations: &[f64; BASIS_COUNT], tick: u64) -> Vec<CognitiveBasis> {
        let mut spawned = Vec::new();
        for basis in CognitiveBasis::ALL {
            let p = populations[basis.index()];
            if p > EMERGENT_THRESHOLD && !self.has(basis, AttractorOrigin::Emergent) {
                self.push(GoalAttractor::new(basis, EMERGENT_GAIN * p, tick, AttractorOrigin::Emergent));
                spawned.push(basis);
            }
        }
        spawned
    }

    /// Adds a learned attractor unless one already targets `basis`.
    pub fn spawn_learned(&mut self, basis: CognitiveBasis, tick: u64) -> bool {
        if self.has(basis, AttractorOrigin::Learned) {
            return false;
        }
        self.push(GoalAttractor::new(basis, LEARNED_STRENGTH, tick, AttractorOrigin::Learned));
        true
    }

    pub fn has(&self, basis: CognitiveBasis, origin: AttractorOrigin) -> bool {
        self.attractors
            .iter()
            .any(|a| a.basis == basis && a.origin == origin)
    }

    /// Strongest live attractor; the oldest wins ties.
    pub fn strongest(&self) -> Option<&GoalAttractor> {
        self.attractors.iter().fold(None, |best: Option<&GoalAttractor>, a| match best {
            Some(b) if b.strength >= a.strength => Some(b),
            _ => Some(a),
        })
    }

    pub fn intention(&self) -> f64 {
        self.strongest()
            .map(|a| a.strength.min(MAX_INTENTION))
            .unwrap_or(0.0)
    }

    pub fn as_slice(&self) -> &[GoalAttractor] {
        &self.attractors
    }

    pub fn len(&self) -> usize {
        self.attractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attractors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volitional(basis: CognitiveBasis, strength: f64, tick: u64) -> GoalAttractor {
        GoalAttractor::new(basis, strength, tick, AttractorOrigin::Volitional)
    }

    #[test]
    fn list_keeps_six_most_recent() {
        let mut goals = GoalSet::new();
        for tick in 0..9 {
            goals.push(volitional(CognitiveBasis::ALL[tick as usize % 6], 0.5, tick));
        }
        assert_eq!(goals.len(), MAX_ATTRACTORS);
        assert_eq!(goals.as_slice()[0].created_tick, 3);
        assert_eq!(goals.as_slice()[5].created_tick, 8);
    }

    #[test]
    fn decay_is_geometric_and_prunes_weak_attractors() {
        let mut goals = GoalSet::new();
        goals.push(volitional(CognitiveBasis::Creative, 0.5, 0));
        goals.push(volitional(CognitiveBasis::Focused, 0.0101, 0));
        goals.decay();
        assert_eq!(goals.len(), 1);
        assert!((goals.as_slice()[0].strength - 0.49).abs() < 1e-12);
    }

    #[test]
    fn strength_is_clamped_and_sanitized() {
        assert_eq!(volitional(CognitiveBasis::Focused, 3.0, 0).strength, 1.0);
        assert_eq!(volitional(CognitiveBasis::Focused, f64::NAN, 0).strength, 0.0);
    }

    #[test]
    fn emergent_attractor_forms_once_per_basis() {
        let mut goals = GoalSet::new();
        let pops = [0.05, 0.05, 0.6, 0.1, 0.1, 0.1];
        assert_eq!(goals.spawn_emergent(&pops, 1), vec![CognitiveBasis::Creative]);
        assert!(goals.spawn_emergent(&pops, 2).is_empty());
        let a = &goals.as_slice()[0];
        assert_eq!(a.origin, AttractorOrigin::Emergent);
        assert!((a.strength - EMERGENT_GAIN * 0.6).abs() < 1e-12);
    }

    #[test]
    fn learned_attractor_forms_once_per_basis() {
        let mut goals = GoalSet::new();
        assert!(goals.spawn_learned(CognitiveBasis::Reflective, 12));
        assert!(!goals.spawn_learned(CognitiveBasis::Reflective, 13));
        let a = &goals.as_slice()[0];
        assert_eq!(a.origin, AttractorOrigin::Learned);
        assert_eq!(a.strength, LEARNED_STRENGTH);
        assert_eq!(a.decay, 0.99);
        assert_eq!(a.created_tick, 12);
        assert!(goals.spawn_learned(CognitiveBasis::Focused, 14));
        assert_eq!(goals.len(), 2);
    }

    #[test]
    fn strongest_prefers_oldest_on_ties() {
        let mut goals = GoalSet::new();
        goals.push(volitional(CognitiveBasis::Analytical, 0.4, 0));
        goals.push(volitional(CognitiveBasis::Emotional, 0.4, 1));
        assert_eq!(goals.strongest().unwrap().basis, CognitiveBasis::Analytical);
        assert!((goals.intention() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn intention_is_capped() {
        let mut goals = GoalSet::new();
        goals.push(volitional(CognitiveBasis::Reflective, 1.0, 0));
        assert_eq!(goals.intention(), MAX_INTENTION);
        assert_eq!(GoalSet::new().intention(), 0.0);
    }
}
