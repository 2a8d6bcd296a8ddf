//! Scan Orchestrator
//!
//! Runs one configuration end to end:
//! 1. Validate the configuration and generate the hypercharge grid
//! 2. Run blocks A → B → B′ → C → motivated sets per the enable flags
//! 3. Stop early once the result limit or a budget is exhausted
//! 4. Check the accepted models against the benchmark table
//!
//! Configuration errors are reported before any candidate is enumerated.

use super::accumulator::{BlockStats, ScanAccumulator};
use super::benchmark::{check_benchmarks, BenchmarkStatus};
use super::blocks::{BlockFlow, BlockScanner};
use super::budget::{HaltReason, ScanBudget, ScanLimits};
use super::CandidateModel;
use crate::anomaly::AnomalyEngine;
use crate::config::{Block, ScanConfiguration};
use crate::error::Result;
use crate::grid::HyperchargeGridGenerator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use tracing::{info, warn};

/// Outcome of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub config_name: String,
    /// Accepted models in enumeration order
    pub models: Vec<CandidateModel>,
    pub block_stats: BTreeMap<Block, BlockStats>,
    pub benchmarks: Vec<BenchmarkStatus>,
    /// Enumeration stopped before exhausting the candidate space
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halt_reason: Option<HaltReason>,
    pub candidates_examined: usize,
}

impl ScanReport {
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn models_in(&self, block: Block) -> impl Iterator<Item = &CandidateModel> {
        self.models.iter().filter(move |m| m.block == block)
    }

    /// Plain-text summary: per-block counts then the benchmark checklist.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Scan '{}': {} anomaly-free models", self.config_name, self.models.len())];
        for (block, stats) in &self.block_stats {
            lines.push(format!(
                "  Block {:<9} enumerated {:>6}  anomaly-free {:>5}  duplicates {:>5}  skipped {:>3}  accepted {:>5}",
                block.label(),
                stats.enumerated,
                stats.anomaly_free,
                stats.duplicates,
                stats.skipped,
                stats.accepted
            ));
        }
        if let Some(reason) = self.halt_reason {
            lines.push(format!("  Truncated: {}", reason));
        }
        lines.push("Benchmarks:".to_string());
        for status in &self.benchmarks {
            let mark = if status.found { "✓" } else { "✗" };
            lines.push(format!("  {} {} ({})", mark, status.name, status.message));
        }
        lines.join("\n")
    }
}

pub struct ScanOrchestrator {
    config: ScanConfiguration,
    engine: AnomalyEngine,
    grid: HyperchargeGridGenerator,
}

impl ScanOrchestrator {
    pub fn new(config: ScanConfiguration) -> Result<Self> {
        let engine = AnomalyEngine::new(config.invariants);
        let grid = HyperchargeGridGenerator::new()?;
        Ok(Self { config, engine, grid })
    }

    pub fn config(&self) -> &ScanConfiguration {
        &self.config
    }

    pub fn run(&self) -> Result<ScanReport> {
        let config = &self.config;
        config.validate()?;
        let hypercharges = self
            .grid
            .generate(&config.hypercharge)
            .map_err(|e| e.for_config(&config.name))?;

        info!(
            "Starting scan '{}': {} base fermions, {} hypercharge values, {}×{} representations",
            config.name,
            config.base_spectrum.len(),
            hypercharges.len(),
            config.su3_reps.len(),
            config.su2_reps.len()
        );

        let base_result = self.engine.verify(&config.base_spectrum);
        if !base_result.all_vanish {
            warn!(
                "Base spectrum of '{}' is not anomaly-free; only additions that cancel its anomalies will be found",
                config.name
            );
        }

        let scanner = BlockScanner::new(config, hypercharges);
        let budget = ScanBudget::new(ScanLimits::from_config(config));
        let mut acc = ScanAccumulator::new(self.engine, &config.base_spectrum, budget);

        let flow = self.run_blocks(&scanner, &mut acc)?;
        let candidates_examined = acc.candidates_examined();
        let (models, block_stats, halt_reason) = acc.finish();
        let truncated = flow.is_break();
        if let Some(reason) = halt_reason {
            warn!("Scan '{}' truncated after {} models: {}", config.name, models.len(), reason);
        }

        let benchmarks = check_benchmarks(&models);
        info!(
            "Finished scan '{}': {} models from {} candidates, {}/{} benchmarks found",
            config.name,
            models.len(),
            candidates_examined,
            benchmarks.iter().filter(|b| b.found).count(),
            benchmarks.len()
        );

        Ok(ScanReport {
            config_name: config.name.clone(),
            models,
            block_stats,
            benchmarks,
            truncated,
            halt_reason,
            candidates_examined,
        })
    }

    fn run_blocks(&self, scanner: &BlockScanner<'_>, acc: &mut ScanAccumulator<'_>) -> BlockFlow {
        let flags = &self.config.blocks;

        if flags.enabled(Block::A) {
            if let ControlFlow::Break(reason) = self.run_block(Block::A, acc, |acc| scanner.scan_single(acc))? {
                return Ok(ControlFlow::Break(reason));
            }
        }
        if flags.enabled(Block::B) {
            if let ControlFlow::Break(reason) = self.run_block(Block::B, acc, |acc| scanner.scan_vector_like(acc))? {
                return Ok(ControlFlow::Break(reason));
            }
        }
        if flags.enabled(Block::BPrime) {
            let seeds = acc.seeds().to_vec();
            if let ControlFlow::Break(reason) = self.run_block(Block::BPrime, acc, |acc| scanner.scan_seeded(acc, &seeds))? {
                return Ok(ControlFlow::Break(reason));
            }
        }
        if flags.enabled(Block::C) {
            if let ControlFlow::Break(reason) = self.run_block(Block::C, acc, |acc| scanner.scan_chiral(acc))? {
                return Ok(ControlFlow::Break(reason));
            }
        }
        if self.config.motivated_sets.is_empty() {
            return Ok(ControlFlow::Continue(()));
        }
        self.run_block(Block::Motivated, acc, |acc| scanner.scan_motivated(acc))
    }

    fn run_block<'a, F>(&self, block: Block, acc: &mut ScanAccumulator<'a>, scan: F) -> BlockFlow
    where
        F: FnOnce(&mut ScanAccumulator<'a>) -> BlockFlow,
    {
        let before = acc.models().len();
        let flow = scan(acc)?;
        let stats = acc.stats(block);
        info!(
            "Block {}: {} candidates, {} anomaly-free, {} new models",
            block,
            stats.enumerated,
            stats.anomaly_free,
            acc.models().len() - before
        );
        Ok(flow)
    }

    /// Run several configurations independently. A failing configuration is
    /// reported in its slot and does not stop the batch.
    pub fn run_batch(configs: Vec<ScanConfiguration>) -> Vec<(String, Result<ScanReport>)> {
        configs
            .into_iter()
            .map(|config| {
                let name = config.name.clone();
                let result = ScanOrchestrator::new(config).and_then(|orchestrator| orchestrator.run());
                if let Err(e) = &result {
                    warn!("Scan '{}' failed: {}", name, e);
                }
                (name, result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlockFlags;
    use crate::error::ScanError;
    use crate::grid::ConstraintKind;
    use crate::rational::q;
    use crate::spectrum::Spectrum;

    fn quick(name: &str) -> ScanConfiguration {
        ScanConfiguration::new(name, Spectrum::standard_model(false)).quick()
    }

    #[test]
    fn test_quick_scan_finds_benchmarks() {
        let report = ScanOrchestrator::new(quick("quick")).unwrap().run().unwrap();
        assert!(!report.truncated);
        assert!(!report.is_empty());

        let found: Vec<&str> = report.benchmarks.iter().filter(|b| b.found).map(|b| b.name.as_str()).collect();
        assert!(found.contains(&"right-handed neutrino singlet"));
        assert!(found.contains(&"vector-like lepton doublet"));
        assert!(found.contains(&"vector-like quark doublet"));
        assert!(found.contains(&"Higgsino-like doublet pair"));

        let higgsino = report.benchmarks.iter().find(|b| b.name.starts_with("Higgsino")).unwrap();
        assert_eq!(higgsino.block, Some(Block::C));
        assert_eq!(report.benchmarks[1].block, Some(Block::B));
    }

    #[test]
    fn test_block_order_in_results() {
        let report = ScanOrchestrator::new(quick("order")).unwrap().run().unwrap();
        let blocks: Vec<Block> = report.models.iter().map(|m| m.block).collect();
        let mut sorted = blocks.clone();
        sorted.sort();
        assert_eq!(blocks, sorted);
        // Every seeded pair is already found by Block B on the same grid.
        assert_eq!(report.block_stats[&Block::BPrime].accepted, 0);
        assert!(report.block_stats[&Block::BPrime].duplicates > 0);
    }

    #[test]
    fn test_limit_truncates() {
        let report = ScanOrchestrator::new(quick("limited").with_limit(3)).unwrap().run().unwrap();
        assert_eq!(report.len(), 3);
        assert!(report.truncated);
        assert_eq!(report.halt_reason, Some(HaltReason::ResultLimit));
    }

    #[test]
    fn test_configuration_errors_fail_fast() {
        let mut config = quick("contradictory").with_hypercharge(ConstraintKind::Set { values: vec![q(1, 2)] });
        config.hypercharge.exclude = vec![q(1, 2)];
        match ScanOrchestrator::new(config).unwrap().run() {
            Err(ScanError::ContradictoryConstraints { config, .. }) => assert_eq!(config, "contradictory"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_motivated_sets_run_last() {
        use crate::config::MotivatedSet;
        use crate::representation::{Su2Rep, Su3Rep};
        use crate::spectrum::{Chirality, Fermion};

        let mut config = quick("motivated").with_blocks(BlockFlags::none());
        config.motivated_sets = vec![MotivatedSet {
            name: "sterile neutrinos".to_string(),
            fermions: vec![
                Fermion::new("N1", Su3Rep::Singlet, Su2Rep::Singlet, q(0, 1), Chirality::Right),
                Fermion::new("N2", Su3Rep::Singlet, Su2Rep::Singlet, q(0, 1), Chirality::Right),
            ],
        }];
        let report = ScanOrchestrator::new(config).unwrap().run().unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.models[0].block, Block::Motivated);
        assert_eq!(report.models[0].description, "Physics-motivated set: sterile neutrinos");
        assert!(report.summary().contains("Block motivated"));
    }

    #[test]
    fn test_time_budget() {
        let unlimited = ScanOrchestrator::new(quick("unlimited")).unwrap().run().unwrap();

        let mut config = quick("hour");
        config.time_budget_secs = Some(3600);
        let report = ScanOrchestrator::new(config).unwrap().run().unwrap();
        assert!(!report.truncated);
        assert_eq!(report.halt_reason, None);
        assert_eq!(report.models, unlimited.models);

        let mut config = quick("expired");
        config.time_budget_secs = Some(0);
        let report = ScanOrchestrator::new(config).unwrap().run().unwrap();
        assert!(report.truncated);
        assert_eq!(report.halt_reason, Some(HaltReason::TimeBudget));
        assert_eq!(report.candidates_examined, 0);
        assert!(report.is_empty());
    }
}
