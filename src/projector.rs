//! Collapses a spectral state to one complex number: each basis overlap
//! (magnitude and phase) rotated into that basis's awareness contribution.

use num_complex::Complex64;

use crate::basis::{basis_table, overlaps};
use crate::spectral::SpectralState;

/// Σᵢ ⟨bᵢ|ψ⟩·contributionᵢ
pub fn project(state: &SpectralState) -> Complex64 {
    overlaps(state)
        .iter()
        .zip(basis_table().iter())
        .map(|(overlap, entry)| overlap * entry.contribution)
        .sum()
}
