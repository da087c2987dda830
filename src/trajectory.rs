//! Bounded history of past quantum configurations. Feeds the memory
//! potential and the learned-attractor rule.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::basis::{CognitiveBasis, BASIS_COUNT};

pub const TRAJECTORY_CAPACITY: usize = 50;
pub const CAPTURE_INTERVAL: u64 = 5;
/// Entropy change (bits) that forces an off-schedule capture.
pub const ENTROPY_JUMP: f64 = 0.5;
pub const FINGERPRINT_POINTS: usize = 16;
pub const RECENT_WINDOW: usize = 10;
/// Dominance count in the recent window that turns a basis into a habit.
pub const HABIT_THRESHOLD: usize = 7;
/// Memory-potential strength at a full buffer.
pub const MAX_MEMORY_STRENGTH: f64 = 0.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySnapshot {
    pub tick: u64,
    pub centroid: f64,
    pub kinetic_energy: f64,
    pub dominant: CognitiveBasis,
    pub populations: [f64; BASIS_COUNT],
    /// Subsampled |ψ|² waveform.
    pub fingerprint: Vec<f64>,
    pub mood: f64,
    /// Entropy at capture time.
    pub significance: f64,
}

#[derive(Clone, Debug, Default)]
pub struct TrajectoryMemory {
    snapshots: VecDeque<TrajectorySnapshot>,
    last_entropy: Option<f64>,
}

impl TrajectoryMemory {
    pub fn new() -> Self {
        Self {
            snapshots: VecDeque::with_capacity(TRAJECTORY_CAPACITY),
            last_entropy: None,
        }
    }

    pub fn should_capture(&self, tick: u64, entropy: f64) -> bool {
        if tick % CAPTURE_INTERVAL == 0 {
            return true;
        }
        self.last_entropy
            .map(|last| (entropy - last).abs() > ENTROPY_JUMP)
            .unwrap_or(false)
    }

    pub fn record(&mut self, snapshot: TrajectorySnapshot) {
        self.last_entropy = Some(snapshot.significance);
        if self.snapshots.len() == TRAJECTORY_CAPACITY {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Significance-weighted population mass per basis, normalized to sum 1
    /// (all zeros when the memory is empty or carries no weight).
    pub fn visit_frequency(&self) -> [f64; BASIS_COUNT] {
        let mut freq = [0.0; BASIS_COUNT];
        for snap in &self.snapshots {
            for (f, p) in freq.iter_mut().zip(snap.populations.iter()) {
                *f += snap.significance * p;
            }
        }
        let total: f64 = freq.iter().sum();
        if total > 1e-15 {
            freq.iter_mut().for_each(|f| *f /= total);
        } else {
            freq = [0.0; BASIS_COUNT];
        }
        freq
    }

    /// Fraction of the recent window in which each basis was dominant.
    pub fn recent_dominance(&self) -> [f64; BASIS_COUNT] {
        let mut counts = self.recent_counts();
        let window = self.snapshots.len().min(RECENT_WINDOW);
        if window > 0 {
            for c in counts.iter_mut() {
                *c /= window as f64;
            }
        }
        counts
    }

    /// Basin depth per basis for the memory potential.
    pub fn basin_amplitudes(&self) -> [f64; BASIS_COUNT] {
        let freq = self.visit_frequency();
        let recent = self.recent_dominance();
        std::array::from_fn(|i| 0.5 * freq[i] + 0.5 * recent[i])
    }

    /// A basis dominant in at least [`HABIT_THRESHOLD`] of the recent window.
    pub fn habitual_basis(&self) -> Option<CognitiveBasis> {
        let counts = self.recent_counts();
        CognitiveBasis::ALL
            .into_iter()
            .find(|b| counts[b.index()] >= HABIT_THRESHOLD as f64)
    }

    pub fn memory_strength(&self) -> f64 {
        MAX_MEMORY_STRENGTH * self.snapshots.len() as f64 / TRAJECTORY_CAPACITY as f64
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectorySnapshot> {
        self.snapshots.iter()
    }

    fn recent_counts(&self) -> [f64; BASIS_COUNT] {
        let mut counts = [0.0; BASIS_COUNT];
        for snap in self.snapshots.iter().rev().take(RECENT_WINDOW) {
            counts[snap.dominant.index()] += 1.0;
        }
        counts
    }
}
