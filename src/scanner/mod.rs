//! Block Scanner
//!
//! Enumerates candidate extensions of a base spectrum block by block,
//! verifies each against the anomaly engine and keeps the anomaly-free,
//! previously unseen ones in enumeration order.

pub mod accumulator;
pub mod benchmark;
pub mod blocks;
pub mod budget;
pub mod dedup;
pub mod orchestrator;

pub use accumulator::{BlockStats, ScanAccumulator};
pub use benchmark::{Benchmark, BenchmarkStatus};
pub use blocks::BlockScanner;
pub use budget::{HaltReason, ScanBudget, ScanLimits};
pub use dedup::{ResultDeduplicator, Signature};
pub use orchestrator::{ScanOrchestrator, ScanReport};

use crate::anomaly::{AnomalyEngine, AnomalyResult};
use crate::config::Block;
use crate::error::Result;
use crate::spectrum::{Fermion, Spectrum};
use serde::{Deserialize, Serialize};

/// One verified candidate extension. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateModel {
    pub block: Block,
    pub description: String,
    /// Base followed by the additions.
    pub spectrum: Spectrum,
    pub additions: Vec<Fermion>,
    pub signature: Signature,
    pub anomaly_result: AnomalyResult,
}

impl CandidateModel {
    /// Assemble base ∪ additions and verify it.
    ///
    /// Fails with `DuplicateFermionName` when an addition reuses a name.
    pub fn build(
        engine: &AnomalyEngine,
        block: Block,
        description: String,
        base: &Spectrum,
        additions: Vec<Fermion>,
    ) -> Result<Self> {
        let spectrum = base.extended(&additions)?;
        let anomaly_result = engine.verify(&spectrum);
        let signature = Signature::canonical(&additions);
        Ok(Self {
            block,
            description,
            spectrum,
            additions,
            signature,
            anomaly_result,
        })
    }

    pub fn is_anomaly_free(&self) -> bool {
        self.anomaly_result.all_vanish
    }
}
