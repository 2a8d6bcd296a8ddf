//! Scan Accumulator
//!
//! Local state threaded through one scan: the budget, the deduplicator, the
//! accepted models in order, per-block statistics and the Block A hits that
//! seed Block B′.

use super::budget::{HaltReason, ScanBudget};
use super::dedup::ResultDeduplicator;
use super::CandidateModel;
use crate::anomaly::AnomalyEngine;
use crate::config::Block;
use crate::error::{Result, ScanError};
use crate::spectrum::{Fermion, Spectrum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// Per-block counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStats {
    /// Candidates offered
    pub enumerated: usize,
    /// Candidates whose invariants all vanished
    pub anomaly_free: usize,
    /// Anomaly-free candidates dropped as already seen
    pub duplicates: usize,
    /// Candidates that could not be assembled (name clash with the base)
    pub skipped: usize,
    pub accepted: usize,
}

pub struct ScanAccumulator<'a> {
    engine: AnomalyEngine,
    base: &'a Spectrum,
    budget: ScanBudget,
    dedup: ResultDeduplicator,
    models: Vec<CandidateModel>,
    stats: BTreeMap<Block, BlockStats>,
    seeds: Vec<Fermion>,
    halted: Option<HaltReason>,
}

impl<'a> ScanAccumulator<'a> {
    pub fn new(engine: AnomalyEngine, base: &'a Spectrum, budget: ScanBudget) -> Self {
        Self {
            engine,
            base,
            budget,
            dedup: ResultDeduplicator::new(),
            models: Vec::new(),
            stats: BTreeMap::new(),
            seeds: Vec::new(),
            halted: None,
        }
    }

    /// Verify one candidate extension and keep it if it is anomaly-free and
    /// not seen before. Breaks once a budget limit is hit; the candidate
    /// that found the budget exhausted is not counted.
    pub fn offer(
        &mut self,
        block: Block,
        description: impl Into<String>,
        additions: Vec<Fermion>,
    ) -> Result<ControlFlow<HaltReason>> {
        if let Some(reason) = self.budget.exhausted() {
            self.halted = Some(reason);
            return Ok(ControlFlow::Break(reason));
        }
        self.budget.record_candidate();
        self.stats.entry(block).or_default().enumerated += 1;

        let built = CandidateModel::build(&self.engine, block, description.into(), self.base, additions);
        self.record(block, built)?;
        Ok(ControlFlow::Continue(()))
    }

    /// Outcome of one counted candidate. A name clash skips the candidate;
    /// any other error, such as `ArithmeticDomainError`, aborts the scan.
    fn record(&mut self, block: Block, built: Result<CandidateModel>) -> Result<()> {
        let model = match built {
            Ok(model) => model,
            Err(ScanError::DuplicateFermionName(name)) => {
                warn!("Skipping {} candidate: duplicate fermion name '{}'", block, name);
                self.stats.entry(block).or_default().skipped += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if !model.is_anomaly_free() {
            return Ok(());
        }
        let stats = self.stats.entry(block).or_default();
        stats.anomaly_free += 1;

        if !self.dedup.admit(&model.signature) {
            stats.duplicates += 1;
            debug!("Duplicate signature {} from block {}", model.signature, block);
            return Ok(());
        }

        stats.accepted += 1;
        self.budget.record_accepted();
        if block == Block::A {
            self.seeds.extend(model.additions.iter().cloned());
        }
        debug!("Accepted: {}", model.description);
        self.models.push(model);
        Ok(())
    }

    /// Make sure a block shows up in the statistics even if it offered
    /// nothing.
    pub fn open_block(&mut self, block: Block) {
        self.stats.entry(block).or_default();
    }

    pub fn base(&self) -> &Spectrum {
        self.base
    }

    /// Accepted Block A additions, in acceptance order.
    pub fn seeds(&self) -> &[Fermion] {
        &self.seeds
    }

    pub fn models(&self) -> &[CandidateModel] {
        &self.models
    }

    pub fn stats(&self, block: Block) -> BlockStats {
        self.stats.get(&block).copied().unwrap_or_default()
    }

    pub fn halted(&self) -> Option<HaltReason> {
        self.halted
    }

    pub fn candidates_examined(&self) -> usize {
        self.budget.usage().candidates_examined
    }

    pub fn finish(self) -> (Vec<CandidateModel>, BTreeMap<Block, BlockStats>, Option<HaltReason>) {
        (self.models, self.stats, self.halted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::q;
    use crate::representation::{Su2Rep, Su3Rep};
    use crate::scanner::budget::ScanLimits;
    use crate::spectrum::Chirality;

    fn singlet(name: &str, y: i64) -> Fermion {
        Fermion::new(name, Su3Rep::Singlet, Su2Rep::Singlet, q(y, 1), Chirality::Left)
    }

    #[test]
    fn test_offer_counts_outcomes() {
        let base = Spectrum::standard_model(false);
        let mut acc = ScanAccumulator::new(AnomalyEngine::default(), &base, ScanBudget::new(ScanLimits::unlimited()));

        assert!(acc.offer(Block::A, "zero", vec![singlet("N", 0)]).unwrap().is_continue());
        assert!(acc.offer(Block::A, "charged", vec![singlet("E", 1)]).unwrap().is_continue());
        assert!(acc.offer(Block::A, "zero again", vec![singlet("N2", 0)]).unwrap().is_continue());
        assert!(acc.offer(Block::A, "clash", vec![singlet("e_R", 0)]).unwrap().is_continue());

        let stats = acc.stats(Block::A);
        assert_eq!(stats.enumerated, 4);
        assert_eq!(stats.anomaly_free, 2);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.accepted, 1);
        assert_eq!(acc.seeds().len(), 1);
        assert_eq!(acc.models()[0].description, "zero");
    }

    #[test]
    fn test_offer_breaks_on_limit() {
        let base = Spectrum::standard_model(false);
        let limits = ScanLimits {
            limit: Some(1),
            ..ScanLimits::default()
        };
        let mut acc = ScanAccumulator::new(AnomalyEngine::default(), &base, ScanBudget::new(limits));

        assert!(acc.offer(Block::A, "first", vec![singlet("N", 0)]).unwrap().is_continue());
        let flow = acc.offer(Block::B, "second", vec![singlet("M", 0)]).unwrap();
        assert_eq!(flow, ControlFlow::Break(HaltReason::ResultLimit));
        assert_eq!(acc.halted(), Some(HaltReason::ResultLimit));
        assert_eq!(acc.stats(Block::B).enumerated, 0);
        assert_eq!(acc.candidates_examined(), 1);
    }

    #[test]
    fn test_arithmetic_error_aborts() {
        let base = Spectrum::standard_model(false);
        let mut acc = ScanAccumulator::new(AnomalyEngine::default(), &base, ScanBudget::new(ScanLimits::unlimited()));
        assert!(acc.offer(Block::A, "zero", vec![singlet("N", 0)]).unwrap().is_continue());

        let err = acc
            .record(Block::B, Err(ScanError::ArithmeticDomainError("denominator must be positive".into())))
            .unwrap_err();
        assert!(matches!(err, ScanError::ArithmeticDomainError(_)));
        assert_eq!(acc.stats(Block::B).skipped, 0);

        acc.record(Block::B, Err(ScanError::DuplicateFermionName("N".into()))).unwrap();
        assert_eq!(acc.stats(Block::B).skipped, 1);
        assert_eq!(acc.models().len(), 1);
    }
}
