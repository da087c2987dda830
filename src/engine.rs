//! Per-session quantum engine: owns the spectral state and everything that
//! steers it, and advances it one tick at a time.

use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::basis::{basis_table, CognitiveBasis, BASIS_COUNT};
use crate::error::Result;
use crate::evolve::{EvolutionReport, HamiltonianEvolver};
use crate::goals::{AttractorOrigin, GoalAttractor, GoalSet};
use crate::inputs::TickInputs;
use crate::measure::{populations, Measurement, MeasurementSystem, QuantumDecision};
use crate::observables::{Observables, SpectralMoments};
use crate::potential::{BasinPotential, CombinedPotential, EnvironmentalPotential, PotentialWeights};
use crate::projector::project;
use crate::spectral::SpectralState;
use crate::trajectory::{TrajectoryMemory, TrajectorySnapshot, FINGERPRINT_POINTS};

/// Everything one tick produced.
#[derive(Clone, Debug)]
pub struct QuantumTick {
    pub tick: u64,
    pub evolution: EvolutionReport,
    pub measurement: Measurement,
    pub projected: Complex64,
    pub observables: Observables,
}

impl QuantumTick {
    pub fn dominant(&self) -> CognitiveBasis {
        self.measurement.dominant
    }

    pub fn decisions(&self) -> impl Iterator<Item = &QuantumDecision> {
        self.measurement
            .forced
            .iter()
            .chain(self.measurement.volitional.iter())
    }
}

/// Pollable view of the engine for a presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantumSnapshot {
    pub tick: u64,
    /// In [`CognitiveBasis::ALL`] order.
    pub populations: [f64; BASIS_COUNT],
    pub dominant: CognitiveBasis,
    #[serde(flatten)]
    pub observables: Observables,
    pub last_measurement: Option<CognitiveBasis>,
    pub measurement_count: u64,
    pub attractors: Vec<GoalAttractor>,
    pub decisions: Vec<QuantumDecision>,
    pub trajectory_len: usize,
    pub collapse_charge: f64,
    pub collapse_ready: bool,
    pub decoherence_rate: f64,
}

#[derive(Clone, Debug)]
pub struct QuantumEngine {
    state: SpectralState,
    evolver: HamiltonianEvolver,
    measurement: MeasurementSystem,
    goals: GoalSet,
    trajectory: TrajectoryMemory,
    potential: CombinedPotential,
    tick: u64,
}

impl Default for QuantumEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumEngine {
    /// Starts from an even superposition of the six basis packets.
    pub fn new() -> Self {
        let table = basis_table();
        let state = SpectralState::from_fn(|n| table.iter().map(|e| e.state.coefficient(n)).sum());
        Self::with_state(state)
    }

    pub fn with_state(mut state: SpectralState) -> Self {
        state.normalize();
        let goals = GoalSet::new();
        let trajectory = TrajectoryMemory::new();
        let potential = compose_potential(&TickInputs::default(), &goals, &trajectory);
        Self {
            state,
            evolver: HamiltonianEvolver::new(),
            measurement: MeasurementSystem::new(),
            goals,
            trajectory,
            potential,
            tick: 0,
        }
    }

    pub fn state(&self) -> &SpectralState {
        &self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }

    pub fn trajectory(&self) -> &TrajectoryMemory {
        &self.trajectory
    }

    pub fn measurement(&self) -> &MeasurementSystem {
        &self.measurement
    }

    pub fn last_measurement(&self) -> Option<CognitiveBasis> {
        self.measurement.last_measurement()
    }

    /// Current projection onto the awareness plane.
    pub fn projected(&self) -> Complex64 {
        project(&self.state)
    }

    /// Advances the quantum state by one tick. `inputs` must already be
    /// sanitized.
    pub fn tick<R: Rng + ?Sized>(&mut self, inputs: &TickInputs, omega: f64, rng: &mut R) -> QuantumTick {
        let tick = self.tick;
        self.potential = compose_potential(inputs, &self.goals, &self.trajectory);

        let evolution = self.evolver.evolve(&mut self.state, &self.potential, inputs, omega);
        let measurement = self.measurement.measure(
            &mut self.state,
            &self.goals,
            &inputs.meta,
            inputs.awareness,
            tick,
            rng,
        );

        self.goals.decay();
        for basis in self.goals.spawn_emergent(&measurement.populations, tick) {
            debug!(tick, basis = %basis, "emergent attractor");
        }

        let moments = SpectralMoments::of(&self.state);
        if self.trajectory.should_capture(tick, measurement.entropy) {
            self.trajectory.record(TrajectorySnapshot {
                tick,
                centroid: moments.centroid,
                kinetic_energy: moments.kinetic,
                dominant: measurement.dominant,
                populations: measurement.populations,
                fingerprint: self.state.sample_density(FINGERPRINT_POINTS),
                mood: inputs.mood,
                significance: measurement.entropy,
            });
            if let Some(habit) = self.trajectory.habitual_basis() {
                if self.goals.spawn_learned(habit, tick) {
                    debug!(tick, basis = %habit, "learned attractor");
                }
            }
        }

        let observables = Observables::extract(&self.state, &measurement.populations, &self.potential);
        let projected = project(&self.state);
        debug!(
            tick,
            dominant = %measurement.dominant,
            entropy = measurement.entropy,
            charge = self.measurement.charge(),
            "quantum tick"
        );
        self.tick += 1;

        QuantumTick {
            tick,
            evolution,
            measurement,
            projected,
            observables,
        }
    }

    /// Appends a volitional attractor; the list keeps its six most recent.
    pub fn set_goal(&mut self, basis: CognitiveBasis, strength: f64) {
        let attractor = GoalAttractor::new(basis, strength, self.tick, AttractorOrigin::Volitional);
        info!(basis = %basis, strength = attractor.strength, "goal set");
        self.goals.push(attractor);
    }

    pub fn set_goal_named(&mut self, basis: &str, strength: f64) -> Result<()> {
        self.set_goal(basis.parse::<CognitiveBasis>()?, strength);
        Ok(())
    }

    /// Immediate full collapse onto `basis` (or the dominant basis), with no
    /// probability gating.
    pub fn trigger_collapse(&mut self, basis: Option<CognitiveBasis>) -> QuantumDecision {
        self.measurement.force(&mut self.state, basis, self.tick)
    }

    pub fn trigger_collapse_named(&mut self, basis: Option<&str>) -> Result<QuantumDecision> {
        let basis = basis.map(str::parse::<CognitiveBasis>).transpose()?;
        Ok(self.trigger_collapse(basis))
    }

    pub fn snapshot(&self) -> QuantumSnapshot {
        let pops = populations(&self.state);
        let observables = Observables::extract(&self.state, &pops, &self.potential);
        QuantumSnapshot {
            tick: self.tick,
            populations: pops,
            dominant: crate::basis::argmax(&pops),
            observables,
            last_measurement: self.measurement.last_measurement(),
            measurement_count: self.measurement.measurement_count(),
            attractors: self.goals.as_slice().to_vec(),
            decisions: self.measurement.decisions().cloned().collect(),
            trajectory_len: self.trajectory.len(),
            collapse_charge: self.measurement.charge(),
            collapse_ready: self.measurement.collapse_ready(),
            decoherence_rate: self.evolver.decoherence_rate(),
        }
    }
}

fn compose_potential(inputs: &TickInputs, goals: &GoalSet, trajectory: &TrajectoryMemory) -> CombinedPotential {
    CombinedPotential {
        weights: PotentialWeights::compose(goals.intention(), trajectory.memory_strength()),
        environment: EnvironmentalPotential::from_inputs(inputs),
        goal: BasinPotential::from_attractors(goals.as_slice()),
        memory: BasinPotential::from_memory(trajectory),
    }
}
