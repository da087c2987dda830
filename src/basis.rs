//! The six cognitive measurement wavepackets.
//!
//! Each basis is a wrapped Gaussian exp(−Δ²/(2w²)) centred on a fixed angle.
//! Its Fourier coefficients are cₙ ∝ exp(−n²w²/2)·e^{−inθ}. The packets
//! overlap, so the set is deliberately non-orthogonal.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::spectral::SpectralState;

pub const BASIS_COUNT: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveBasis {
    Focused,
    Diffuse,
    Creative,
    Analytical,
    Emotional,
    Reflective,
}

struct BasisShape {
    center: f64,
    width: f64,
    contribution: (f64, f64),
}

const SHAPES: [BasisShape; BASIS_COUNT] = [
    BasisShape { center: 0.0, width: 0.25, contribution: (1.0, 0.0) },
    BasisShape { center: PI / 3.0, width: 0.90, contribution: (0.5, 0.5) },
    BasisShape { center: 2.0 * PI / 3.0, width: 0.50, contribution: (0.0, 1.0) },
    BasisShape { center: PI, width: 0.35, contribution: (0.8, -0.4) },
    BasisShape { center: 4.0 * PI / 3.0, width: 0.60, contribution: (-0.6, 0.6) },
    BasisShape { center: 5.0 * PI / 3.0, width: 0.45, contribution: (-0.3, -0.9) },
];

impl CognitiveBasis {
    /// Enumeration order; also the tie-break order for dominance.
    pub const ALL: [CognitiveBasis; BASIS_COUNT] = [
        CognitiveBasis::Focused,
        CognitiveBasis::Diffuse,
        CognitiveBasis::Creative,
        CognitiveBasis::Analytical,
        CognitiveBasis::Emotional,
        CognitiveBasis::Reflective,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            CognitiveBasis::Focused => "focused",
            CognitiveBasis::Diffuse => "diffuse",
            CognitiveBasis::Creative => "creative",
            CognitiveBasis::Analytical => "analytical",
            CognitiveBasis::Emotional => "emotional",
            CognitiveBasis::Reflective => "reflective",
        }
    }

    pub fn center(self) -> f64 {
        SHAPES[self.index()].center
    }

    pub fn width(self) -> f64 {
        SHAPES[self.index()].width
    }

    /// Precomputed table entry for this basis.
    pub fn entry(self) -> &'static BasisEntry {
        &basis_table()[self.index()]
    }
}

impl fmt::Display for CognitiveBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CognitiveBasis {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| EngineError::UnknownBasis(s.to_string()))
    }
}

/// Immutable wavepacket data shared by every session.
#[derive(Clone, Debug)]
pub struct BasisEntry {
    pub basis: CognitiveBasis,
    pub center: f64,
    pub width: f64,
    pub state: SpectralState,
    pub contribution: Complex64,
}

static TABLE: OnceLock<[BasisEntry; BASIS_COUNT]> = OnceLock::new();

/// The process-wide basis table, built on first use.
pub fn basis_table() -> &'static [BasisEntry; BASIS_COUNT] {
    TABLE.get_or_init(|| CognitiveBasis::ALL.map(build_entry))
}

fn build_entry(basis: CognitiveBasis) -> BasisEntry {
    let shape = &SHAPES[basis.index()];
    let state = SpectralState::from_fn(|n| {
        let n = n as f64;
        Complex64::from_polar((-0.5 * n * n * shape.width * shape.width).exp(), -n * shape.center)
    });
    BasisEntry {
        basis,
        center: shape.center,
        width: shape.width,
        state,
        contribution: Complex64::new(shape.contribution.0, shape.contribution.1),
    }
}

/// Raw overlaps ⟨bᵢ|ψ⟩ in enumeration order.
pub fn overlaps(state: &SpectralState) -> [Complex64; BASIS_COUNT] {
    let table = basis_table();
    std::array::from_fn(|i| table[i].state.inner(state))
}

/// Index of the largest value; ties resolve to the lowest index.
pub fn argmax(values: &[f64; BASIS_COUNT]) -> CognitiveBasis {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    CognitiveBasis::ALL[best]
}
