//! Result Deduplication
//!
//! Candidates are identified by the canonical signature of the fermions they
//! add. Within one scan the base spectrum is fixed, so equal signatures mean
//! equal resulting spectra.

use super::CandidateModel;
use crate::spectrum::{Fermion, QuantumNumbers};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Sorted quantum numbers of the added fermions, independent of insertion
/// order. Serialises as a list of `[su3, su2, "Y", chirality]` tuples.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(Vec<QuantumNumbers>);

impl Signature {
    pub fn canonical(additions: &[Fermion]) -> Self {
        let mut entries: Vec<QuantumNumbers> = additions
            .iter()
            .flat_map(|f| std::iter::repeat(f.quantum_numbers()).take(f.generations as usize))
            .collect();
        entries.sort();
        Self(entries)
    }

    pub fn from_entries(mut entries: Vec<QuantumNumbers>) -> Self {
        entries.sort();
        Self(entries)
    }

    pub fn entries(&self) -> &[QuantumNumbers] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|qn| format!("({},{},{},{})", qn.su3(), qn.su2(), qn.hypercharge(), qn.chirality()))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// First-seen-wins filter over signatures.
#[derive(Debug, Default, Clone)]
pub struct ResultDeduplicator {
    seen: HashSet<Signature>,
}

impl ResultDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the signature had not been seen before.
    pub fn admit(&mut self, signature: &Signature) -> bool {
        if self.seen.contains(signature) {
            return false;
        }
        self.seen.insert(signature.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Keep the first model of every signature, preserving order.
    pub fn dedup(models: Vec<CandidateModel>) -> Vec<CandidateModel> {
        let mut filter = Self::new();
        models
            .into_iter()
            .filter(|model| filter.admit(&model.signature))
            .collect()
    }
}
