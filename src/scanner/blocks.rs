//! Block Enumeration
//!
//! Each block walks its candidate space in a fixed nested order
//! (SU(3) rep → SU(2) rep → hypercharge ascending → chirality assignment)
//! and offers every candidate to the accumulator. Enumeration stops as soon
//! as the accumulator reports an exhausted budget, so a truncated run is a
//! prefix of the unlimited one.
//!
//! - Block A: single left-handed fermion with `|Y| <= abs_max`
//! - Block B: vector-like pair over the full grid
//! - Block B′: vector-like partner of every accepted Block A hit
//! - Block C: SU(2) doublet pair at `+Y` and `−Y`
//! - Motivated sets: configured fermion sets, one candidate each

use super::accumulator::ScanAccumulator;
use super::budget::HaltReason;
use crate::config::{Block, ScanConfiguration};
use crate::error::Result;
use crate::rational::ExactRational;
use crate::representation::{Su2Rep, Su3Rep};
use crate::spectrum::{Chirality, Fermion};
use itertools::{iproduct, Itertools};
use std::ops::ControlFlow;
use tracing::debug;

/// Scan outcome of one block: `Break` once the budget is exhausted.
pub type BlockFlow = Result<ControlFlow<HaltReason>>;

macro_rules! offer {
    ($acc:expr, $block:expr, $description:expr, $additions:expr) => {
        if let ControlFlow::Break(reason) = $acc.offer($block, $description, $additions)? {
            return Ok(ControlFlow::Break(reason));
        }
    };
}

pub struct BlockScanner<'c> {
    config: &'c ScanConfiguration,
    /// Generated grid, strictly ascending
    hypercharges: Vec<ExactRational>,
}

impl<'c> BlockScanner<'c> {
    pub fn new(config: &'c ScanConfiguration, hypercharges: Vec<ExactRational>) -> Self {
        Self { config, hypercharges }
    }

    pub fn hypercharges(&self) -> &[ExactRational] {
        &self.hypercharges
    }

    /// Allowed (SU(3), SU(2)) pairs in enumeration order.
    fn rep_pairs(&self) -> impl Iterator<Item = (Su3Rep, Su2Rep)> + '_ {
        iproduct!(
            self.config.su3_reps.iter().copied(),
            self.config.su2_reps.iter().copied()
        )
        .filter(move |(su3, su2)| !self.config.is_forbidden(*su3, *su2))
    }

    /// Block A
    pub fn scan_single(&self, acc: &mut ScanAccumulator<'_>) -> BlockFlow {
        acc.open_block(Block::A);
        let abs_max = &self.config.abs_max;
        for (su3, su2) in self.rep_pairs() {
            for y in self.hypercharges.iter().filter(|y| &y.abs() <= abs_max) {
                let chirality = Chirality::Left;
                let fermion = Fermion::new(fermion_name("X", su3, su2, y, chirality), su3, su2, y.clone(), chirality);
                let description = format!("Single fermion: {}", fermion.quantum_numbers());
                offer!(acc, Block::A, description, vec![fermion]);
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Block B
    pub fn scan_vector_like(&self, acc: &mut ScanAccumulator<'_>) -> BlockFlow {
        acc.open_block(Block::B);
        for (su3, su2) in self.rep_pairs() {
            for y in &self.hypercharges {
                let left = Fermion::new(fermion_name("VL", su3, su2, y, Chirality::Left), su3, su2, y.clone(), Chirality::Left);
                let right = left.vector_like_partner(fermion_name("VL", su3, su2, y, Chirality::Right));
                let description = format!("Vector-like pair: {}", rep_label(su3, su2, y));
                offer!(acc, Block::B, description, vec![left, right]);
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Block B′. `seeds` are the accepted Block A additions, in order.
    pub fn scan_seeded(&self, acc: &mut ScanAccumulator<'_>, seeds: &[Fermion]) -> BlockFlow {
        acc.open_block(Block::BPrime);
        for seed in seeds {
            let partner = seed.vector_like_partner(format!("{}bar", seed.name));
            let description = format!(
                "Vector-like pair from Block A: {}",
                rep_label(seed.su3_rep, seed.su2_rep, &seed.hypercharge)
            );
            offer!(acc, Block::BPrime, description, vec![seed.clone(), partner]);
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Block C
    pub fn scan_chiral(&self, acc: &mut ScanAccumulator<'_>) -> BlockFlow {
        acc.open_block(Block::C);
        let magnitudes: Vec<&ExactRational> = self.config.chiral_pair.hypercharges.iter().sorted().dedup().collect();
        let su2 = Su2Rep::Doublet;

        for su3 in self.config.su3_reps.iter().copied() {
            if self.config.is_forbidden(su3, su2) {
                continue;
            }
            for y in &magnitudes {
                let minus_y = -*y;
                for assignment in &self.config.chiral_pair.assignments {
                    let (plus_chirality, minus_chirality) = assignment.chiralities();
                    let plus = Fermion::new(
                        fermion_name("CP", su3, su2, y, plus_chirality),
                        su3,
                        su2,
                        (*y).clone(),
                        plus_chirality,
                    );
                    let minus = Fermion::new(
                        fermion_name("CP", su3, su2, &minus_y, minus_chirality),
                        su3,
                        su2,
                        minus_y.clone(),
                        minus_chirality,
                    );
                    let description = format!("Chiral pair: ({}, {})_[+{}, {}] {}", su3, su2, y, minus_y, assignment);
                    offer!(acc, Block::C, description, vec![plus, minus]);
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Physics-motivated sets, in configuration order.
    pub fn scan_motivated(&self, acc: &mut ScanAccumulator<'_>) -> BlockFlow {
        if self.config.motivated_sets.is_empty() {
            return Ok(ControlFlow::Continue(()));
        }
        acc.open_block(Block::Motivated);
        for set in &self.config.motivated_sets {
            debug!("Testing physics-motivated set '{}' ({} fermions)", set.name, set.fermions.len());
            let description = format!("Physics-motivated set: {}", set.name);
            offer!(acc, Block::Motivated, description, set.fermions.clone());
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// `(R3, R2)_Y`
fn rep_label(su3: Su3Rep, su2: Su2Rep, y: &ExactRational) -> String {
    format!("({}, {})_{}", su3, su2, y)
}

/// Deterministic candidate name, e.g. `X_11_0_L` or `VL_12_-1/2_R`.
pub fn fermion_name(prefix: &str, su3: Su3Rep, su2: Su2Rep, y: &ExactRational, chirality: Chirality) -> String {
    format!("{}_{}{}_{}_{}", prefix, su3, su2, y, chirality.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::AnomalyEngine;
    use crate::config::{BlockFlags, ChiralAssignment};
    use crate::rational::q;
    use crate::scanner::budget::{ScanBudget, ScanLimits};
    use crate::spectrum::Spectrum;

    fn grid(k_max: i64) -> Vec<ExactRational> {
        (-k_max..=k_max).map(|k| q(k, 6)).collect()
    }

    fn config() -> ScanConfiguration {
        let mut config = ScanConfiguration::new("blocks", Spectrum::standard_model(false));
        config.su3_reps = vec![Su3Rep::Singlet, Su3Rep::Triplet];
        config.su2_reps = vec![Su2Rep::Singlet, Su2Rep::Doublet];
        config
    }

    fn accumulator(base: &Spectrum) -> ScanAccumulator<'_> {
        ScanAccumulator::new(AnomalyEngine::default(), base, ScanBudget::new(ScanLimits::unlimited()))
    }

    #[test]
    fn test_fermion_names() {
        assert_eq!(fermion_name("X", Su3Rep::Singlet, Su2Rep::Singlet, &q(0, 1), Chirality::Left), "X_11_0_L");
        assert_eq!(
            fermion_name("VL", Su3Rep::Triplet, Su2Rep::Doublet, &q(1, 6), Chirality::Right),
            "VL_32_1/6_R"
        );
    }

    #[test]
    fn test_block_a_respects_abs_max() {
        let config = config();
        let base = config.base_spectrum.clone();
        let scanner = BlockScanner::new(&config, grid(12));
        let mut acc = accumulator(&base);
        assert!(scanner.scan_single(&mut acc).unwrap().is_continue());

        // 4 rep pairs × 13 hypercharges in [-1, 1]
        assert_eq!(acc.stats(Block::A).enumerated, 4 * 13);
        assert!(acc.models().iter().all(|m| m.additions[0].hypercharge.abs() <= q(1, 1)));
        // Neutral singlet and neutral doublet; SU(2)³ vanishes identically.
        let descriptions: Vec<&str> = acc.models().iter().map(|m| m.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["Single fermion: (1, 1)_0 × +1", "Single fermion: (1, 2)_0 × +1"]
        );
    }

    #[test]
    fn test_block_b_accepts_every_pair() {
        let config = config();
        let base = config.base_spectrum.clone();
        let scanner = BlockScanner::new(&config, grid(6));
        let mut acc = accumulator(&base);
        scanner.scan_vector_like(&mut acc).unwrap();

        let stats = acc.stats(Block::B);
        assert_eq!(stats.enumerated, 4 * 13);
        assert_eq!(stats.accepted, 4 * 13);
        assert_eq!(acc.models()[0].description, "Vector-like pair: (1, 1)_-1");
    }

    #[test]
    fn test_block_b_prime_pairs_seeds() {
        let config = config();
        let base = config.base_spectrum.clone();
        let scanner = BlockScanner::new(&config, grid(6));
        let mut acc = accumulator(&base);
        scanner.scan_single(&mut acc).unwrap();
        let seeds = acc.seeds().to_vec();
        assert_eq!(seeds.len(), 2);

        scanner.scan_seeded(&mut acc, &seeds).unwrap();
        assert_eq!(acc.stats(Block::BPrime).accepted, 2);
        let model = &acc.models()[2];
        assert_eq!(model.block, Block::BPrime);
        assert_eq!(model.description, "Vector-like pair from Block A: (1, 1)_0");
        assert_eq!(model.additions[1].name, "X_11_0_Lbar");
        assert_eq!(model.additions[1].chirality, Chirality::Right);
    }

    #[test]
    fn test_block_c_finds_aligned_doublets() {
        let mut config = config();
        config.chiral_pair.hypercharges = vec![q(1, 2)];
        let base = config.base_spectrum.clone();
        let scanner = BlockScanner::new(&config, grid(6));
        let mut acc = accumulator(&base);
        scanner.scan_chiral(&mut acc).unwrap();

        // su3 {1, 3} × one magnitude × two assignments
        assert_eq!(acc.stats(Block::C).enumerated, 4);
        let descriptions: Vec<&str> = acc.models().iter().map(|m| m.description.as_str()).collect();
        assert!(descriptions.contains(&"Chiral pair: (1, 2)_[+1/2, -1/2] aligned"));
        assert!(!descriptions.iter().any(|d| d.ends_with("opposite")));
        assert_eq!(acc.models()[0].signature.len(), 2);
    }

    #[test]
    fn test_block_c_assignment_order() {
        let mut config = config();
        config.su3_reps = vec![Su3Rep::Singlet];
        config.chiral_pair.hypercharges = vec![q(1, 2)];
        config.chiral_pair.assignments = vec![ChiralAssignment::Aligned];
        config.blocks = BlockFlags::only(&[Block::C]);
        let base = config.base_spectrum.clone();
        let scanner = BlockScanner::new(&config, grid(6));
        let mut acc = accumulator(&base);
        scanner.scan_chiral(&mut acc).unwrap();
        assert_eq!(acc.stats(Block::C).enumerated, 1);
        assert_eq!(acc.models()[0].additions[0].name, "CP_12_1/2_L");
        assert_eq!(acc.models()[0].additions[1].name, "CP_12_-1/2_L");
    }

    #[test]
    fn test_forbidden_combinations_are_skipped() {
        let mut config = config();
        config.forbidden_combinations = vec![(Su3Rep::Triplet, Su2Rep::Doublet)];
        let base = config.base_spectrum.clone();
        let scanner = BlockScanner::new(&config, grid(6));
        let mut acc = accumulator(&base);
        scanner.scan_vector_like(&mut acc).unwrap();
        assert_eq!(acc.stats(Block::B).enumerated, 3 * 13);
        assert!(acc
            .models()
            .iter()
            .all(|m| !(m.additions[0].su3_rep == Su3Rep::Triplet && m.additions[0].su2_rep == Su2Rep::Doublet)));
    }
}
