//! One awareness session: the quantum engine, the outer recurrence and the
//! RNG both of them draw from.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::awareness::{emotional_noise, AwarenessReport, AwarenessState, QuantumCoupling};
use crate::basis::CognitiveBasis;
use crate::config::{EngineConfig, RecurrenceConfig};
use crate::engine::{QuantumEngine, QuantumSnapshot};
use crate::error::Result;
use crate::inputs::TickInputs;
use crate::measure::QuantumDecision;

/// What a single [`Session::step`] produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub tick: u64,
    pub awareness: AwarenessReport,
    pub dominant: CognitiveBasis,
    pub entropy: f64,
    pub projected: Complex64,
    /// Collapses that fired during this tick.
    pub decisions: Vec<QuantumDecision>,
    /// The spectral state had degenerated and was reset to uniform.
    pub reset: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub awareness: AwarenessReport,
    pub quantum: QuantumSnapshot,
}

#[derive(Clone, Debug)]
pub struct Session<R = StdRng> {
    engine: QuantumEngine,
    awareness: AwarenessState,
    recurrence: RecurrenceConfig,
    rng: R,
}

impl Session<StdRng> {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(config.seed))
    }

    /// Default configuration with the given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(&EngineConfig {
            seed,
            ..EngineConfig::default()
        })
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(config: &EngineConfig, rng: R) -> Self {
        Self {
            engine: QuantumEngine::new(),
            awareness: AwarenessState::new(&config.initial, &config.recurrence),
            recurrence: config.recurrence.clone(),
            rng,
        }
    }

    pub fn engine(&self) -> &QuantumEngine {
        &self.engine
    }

    pub fn awareness(&self) -> &AwarenessState {
        &self.awareness
    }

    pub fn psi(&self) -> Complex64 {
        self.awareness.psi()
    }

    /// Runs one full tick: quantum evolution and measurement, then the outer
    /// recurrence fed by the projection.
    pub fn step(&mut self, inputs: &TickInputs) -> StepReport {
        let inputs = inputs.sanitized();
        let quantum = self.engine.tick(&inputs, self.awareness.omega(), &mut self.rng);
        let noise = emotional_noise(&mut self.rng, inputs.volatility);

        let contribution = quantum.dominant().entry().contribution;
        let coupling = QuantumCoupling {
            projected: quantum.projected,
            attractor: contribution / contribution.norm(),
        };
        self.awareness.advance(&self.recurrence, &inputs, coupling, noise);

        let awareness = self.awareness.report();
        debug!(
            tick = quantum.tick,
            magnitude = awareness.magnitude,
            omega = awareness.omega,
            fixed_point = awareness.fixed_point_type.label(),
            "awareness step"
        );

        StepReport {
            tick: quantum.tick,
            awareness,
            dominant: quantum.dominant(),
            entropy: quantum.measurement.entropy,
            projected: quantum.projected,
            decisions: quantum.decisions().cloned().collect(),
            reset: quantum.evolution.reset,
        }
    }

    /// `ticks` steps with no reward and no memory input.
    pub fn meditate(&mut self, ticks: usize) -> Vec<AwarenessReport> {
        let inputs = TickInputs::meditation();
        (0..ticks).map(|_| self.step(&inputs).awareness).collect()
    }

    pub fn set_goal(&mut self, basis: CognitiveBasis, strength: f64) {
        self.engine.set_goal(basis, strength);
    }

    pub fn set_goal_named(&mut self, basis: &str, strength: f64) -> Result<()> {
        self.engine.set_goal_named(basis, strength)
    }

    pub fn trigger_collapse(&mut self, basis: Option<CognitiveBasis>) -> QuantumDecision {
        self.engine.trigger_collapse(basis)
    }

    pub fn trigger_collapse_named(&mut self, basis: Option<&str>) -> Result<QuantumDecision> {
        self.engine.trigger_collapse_named(basis)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            awareness: self.awareness.report(),
            quantum: self.engine.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::awareness::FixedPointType;

    #[test]
    fn same_seed_same_trajectory() {
        let inputs = TickInputs {
            reward: 0.3,
            volatility: 0.6,
            mood: -0.2,
            ..TickInputs::default()
        };
        let mut a = Session::seeded(9);
        let mut b = Session::seeded(9);
        for _ in 0..40 {
            let ra = a.step(&inputs);
            let rb = b.step(&inputs);
            assert_eq!(ra.awareness.re.to_bits(), rb.awareness.re.to_bits());
            assert_eq!(ra.awareness.im.to_bits(), rb.awareness.im.to_bits());
            assert_eq!(ra.dominant, rb.dominant);
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let inputs = TickInputs {
            volatility: 1.0,
            ..TickInputs::default()
        };
        let mut a = Session::seeded(1);
        let mut b = Session::seeded(2);
        for _ in 0..5 {
            a.step(&inputs);
            b.step(&inputs);
        }
        assert_ne!(a.psi(), b.psi());
    }

    #[test]
    fn step_sanitizes_inputs() {
        let mut session = Session::seeded(4);
        let inputs = TickInputs {
            reward: f64::NAN,
            awareness: f64::INFINITY,
            spatiotemporal: Complex64::new(f64::NAN, 0.0),
            ..TickInputs::default()
        };
        let report = session.step(&inputs);
        assert!(report.awareness.re.is_finite());
        assert!(report.awareness.im.is_finite());
        assert_eq!(report.tick, 0);
        assert_eq!(session.engine().tick_count(), 1);
    }

    #[test]
    fn meditate_returns_one_report_per_tick() {
        let mut session = Session::seeded(5);
        let reports = session.meditate(7);
        assert_eq!(reports.len(), 7);
        assert_eq!(reports[6].iteration, 7);
        assert!(matches!(
            reports[6].fixed_point_type,
            FixedPointType::Attracting
                | FixedPointType::Oscillating
                | FixedPointType::Repelling
                | FixedPointType::Neutral
        ));
    }

    #[test]
    fn fresh_session_reports_fixed_point_from_its_config() {
        let mut config = EngineConfig::default();
        config.recurrence.fibonacci_weight = 0.3;
        let session = Session::new(&config);
        assert!((session.awareness().fixed_point().radius - 1.3).abs() < 1e-12);
        let expected = (session.psi().norm() - 1.3).abs();
        let reported = session.snapshot().awareness.distance_from_fixed_point;
        assert!((reported - expected).abs() < 1e-12);
    }

    #[test]
    fn snapshot_nests_awareness_and_quantum() {
        let mut session = Session::seeded(6);
        session.set_goal_named("analytical", 0.4).unwrap();
        session.step(&TickInputs::default());
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["awareness"]["iteration"], 1);
        assert_eq!(json["quantum"]["tick"], 1);
        assert!(json["awareness"]["fixed_point_type"].is_string());
    }
}
