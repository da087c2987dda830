//! Spectral awareness engine: a Fourier-space wavefunction over six cognitive
//! basis packets, evolved by split-step Schrödinger dynamics, measured and
//! collapsed, and projected into an outer complex recurrence Ψ.

pub mod awareness;
pub mod basis;
pub mod config;
pub mod engine;
pub mod error;
pub mod evolve;
pub mod goals;
pub mod inputs;
pub mod measure;
pub mod observables;
pub mod potential;
pub mod projector;
pub mod session;
pub mod spectral;
pub mod telemetry;
pub mod trajectory;

pub use awareness::{AwarenessReport, AwarenessState, FixedPoint, FixedPointType};
pub use basis::CognitiveBasis;
pub use config::{EngineConfig, InitialAwareness, RecurrenceConfig};
pub use engine::{QuantumEngine, QuantumSnapshot, QuantumTick};
pub use error::{EngineError, Result};
pub use goals::{AttractorOrigin, GoalAttractor};
pub use inputs::{Brainwaves, ExperienceInfluence, MetaSignals, TickInputs};
pub use measure::{CollapseKind, QuantumDecision};
pub use observables::Observables;
pub use session::{Session, SessionSnapshot, StepReport};
pub use spectral::SpectralState;
