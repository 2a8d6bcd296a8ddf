//! Scan Budget
//!
//! Limits that halt enumeration between candidates:
//! - Max accepted results (`limit`)
//! - Max candidates verified
//! - Wall-clock time budget
//!
//! Hitting a limit is not an error; the orchestrator returns the partial,
//! ordered result with `truncated = true`.

use crate::config::ScanConfiguration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Budget configuration. `None` means unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanLimits {
    /// Maximum accepted models
    pub limit: Option<usize>,
    /// Maximum candidates offered for verification
    pub max_candidates: Option<usize>,
    /// Wall-clock budget for the whole scan
    pub time_budget: Option<Duration>,
}

impl ScanLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ScanConfiguration) -> Self {
        Self {
            limit: config.limit,
            max_candidates: config.max_candidates,
            time_budget: config.time_budget_secs.map(Duration::from_secs),
        }
    }
}

/// Why a scan stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    ResultLimit,
    CandidateBudget,
    TimeBudget,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::ResultLimit => f.write_str("result limit reached"),
            HaltReason::CandidateBudget => f.write_str("candidate budget exhausted"),
            HaltReason::TimeBudget => f.write_str("time budget exhausted"),
        }
    }
}

/// Usage tracker
#[derive(Debug, Clone)]
pub struct ScanUsage {
    /// Candidates offered so far
    pub candidates_examined: usize,
    /// Models accepted so far
    pub accepted: usize,
    pub started: Instant,
}

impl Default for ScanUsage {
    fn default() -> Self {
        Self {
            candidates_examined: 0,
            accepted: 0,
            started: Instant::now(),
        }
    }
}

impl ScanUsage {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Budget enforcer, consulted before every candidate.
#[derive(Debug, Clone)]
pub struct ScanBudget {
    limits: ScanLimits,
    usage: ScanUsage,
}

impl ScanBudget {
    pub fn new(limits: ScanLimits) -> Self {
        Self {
            limits,
            usage: ScanUsage::default(),
        }
    }

    pub fn limits(&self) -> &ScanLimits {
        &self.limits
    }

    pub fn usage(&self) -> &ScanUsage {
        &self.usage
    }

    pub fn record_candidate(&mut self) {
        self.usage.candidates_examined += 1;
    }

    pub fn record_accepted(&mut self) {
        self.usage.accepted += 1;
    }

    /// Returns the first exhausted limit, checked in the order
    /// result limit, candidate budget, time budget.
    pub fn exhausted(&self) -> Option<HaltReason> {
        if let Some(limit) = self.limits.limit {
            if self.usage.accepted >= limit {
                return Some(HaltReason::ResultLimit);
            }
        }
        if let Some(max) = self.limits.max_candidates {
            if self.usage.candidates_examined >= max {
                return Some(HaltReason::CandidateBudget);
            }
        }
        if let Some(budget) = self.limits.time_budget {
            if self.usage.elapsed() >= budget {
                return Some(HaltReason::TimeBudget);
            }
        }
        None
    }
}
