//! Benchmark Checklist
//!
//! Known anomaly-free extensions a scan of the Standard Model is expected to
//! rediscover. After a scan the accepted models are checked against this
//! table and each benchmark reports whether, and in which block, it was
//! found.

use super::dedup::Signature;
use super::CandidateModel;
use crate::config::Block;
use crate::rational::q;
use crate::representation::{Su2Rep, Su3Rep};
use crate::spectrum::{Chirality, QuantumNumbers};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// A named target; any of `signatures` counts as a match.
#[derive(Debug, Clone)]
pub struct Benchmark {
    pub name: &'static str,
    pub signatures: Vec<Signature>,
}

lazy_static! {
    pub static ref BENCHMARKS: Vec<Benchmark> = {
        use Chirality::{Left, Right};
        use Su2Rep::{Doublet, Singlet as Su2Singlet};
        use Su3Rep::{Singlet, Triplet};

        vec![
            Benchmark {
                name: "right-handed neutrino singlet",
                signatures: vec![
                    Signature::from_entries(vec![QuantumNumbers(Singlet, Su2Singlet, q(0, 1), Right)]),
                    Signature::from_entries(vec![QuantumNumbers(Singlet, Su2Singlet, q(0, 1), Left)]),
                ],
            },
            Benchmark {
                name: "vector-like lepton doublet",
                signatures: vec![Signature::from_entries(vec![
                    QuantumNumbers(Singlet, Doublet, q(-1, 2), Right),
                    QuantumNumbers(Singlet, Doublet, q(-1, 2), Left),
                ])],
            },
            Benchmark {
                name: "vector-like quark doublet",
                signatures: vec![Signature::from_entries(vec![
                    QuantumNumbers(Triplet, Doublet, q(1, 6), Right),
                    QuantumNumbers(Triplet, Doublet, q(1, 6), Left),
                ])],
            },
            Benchmark {
                name: "Higgsino-like doublet pair",
                signatures: vec![Signature::from_entries(vec![
                    QuantumNumbers(Singlet, Doublet, q(-1, 2), Left),
                    QuantumNumbers(Singlet, Doublet, q(1, 2), Left),
                ])],
            },
        ]
    };
}

/// Outcome of one benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkStatus {
    pub name: String,
    pub found: bool,
    /// Block of the first matching model
    pub block: Option<Block>,
    pub message: String,
}

impl Benchmark {
    pub fn matches(&self, signature: &Signature) -> bool {
        self.signatures.iter().any(|s| s == signature)
    }

    /// Check against models in result order; the first match wins.
    pub fn check(&self, models: &[CandidateModel]) -> BenchmarkStatus {
        match models.iter().find(|m| self.matches(&m.signature)) {
            Some(model) => BenchmarkStatus {
                name: self.name.to_string(),
                found: true,
                block: Some(model.block),
                message: format!("found in block {}: {}", model.block, model.description),
            },
            None => BenchmarkStatus {
                name: self.name.to_string(),
                found: false,
                block: None,
                message: "not found".to_string(),
            },
        }
    }
}

pub fn check_benchmarks(models: &[CandidateModel]) -> Vec<BenchmarkStatus> {
    BENCHMARKS.iter().map(|b| b.check(models)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::AnomalyEngine;
    use crate::spectrum::{Fermion, Spectrum};

    #[test]
    fn test_table_has_four_entries() {
        assert_eq!(BENCHMARKS.len(), 4);
        assert!(BENCHMARKS.iter().all(|b| !b.signatures.is_empty()));
    }

    #[test]
    fn test_neutrino_matches_either_chirality() {
        let engine = AnomalyEngine::default();
        let base = Spectrum::standard_model(false);
        let n = Fermion::new("N", Su3Rep::Singlet, Su2Rep::Singlet, q(0, 1), Chirality::Left);
        let model = CandidateModel::build(&engine, Block::A, "Single fermion".into(), &base, vec![n]).unwrap();

        let statuses = check_benchmarks(&[model]);
        assert!(statuses[0].found);
        assert_eq!(statuses[0].block, Some(Block::A));
        assert!(statuses[1..].iter().all(|s| !s.found));
        assert_eq!(statuses[3].message, "not found");
    }

    #[test]
    fn test_higgsino_pair_signature() {
        let engine = AnomalyEngine::default();
        let base = Spectrum::standard_model(false);
        let hu = Fermion::new("Hu", Su3Rep::Singlet, Su2Rep::Doublet, q(1, 2), Chirality::Left);
        let hd = Fermion::new("Hd", Su3Rep::Singlet, Su2Rep::Doublet, q(-1, 2), Chirality::Left);
        let model = CandidateModel::build(&engine, Block::C, "pair".into(), &base, vec![hu, hd]).unwrap();
        assert!(model.is_anomaly_free());
        assert!(BENCHMARKS[3].matches(&model.signature));
    }
}
