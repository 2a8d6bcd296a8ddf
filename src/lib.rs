pub mod anomaly;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod rational;
pub mod representation;
pub mod rules;
pub mod scanner;
pub mod spectrum;

pub use anomaly::{AnomalyEngine, AnomalyResult, Invariant, InvariantSet};
pub use config::{Block, BlockFlags, ChiralAssignment, ParityPair, ScanConfiguration};
pub use error::{Result, ScanError};
pub use grid::{ConstraintKind, HyperchargeConstraint, HyperchargeGridGenerator};
pub use rational::ExactRational;
pub use representation::{Su2Rep, Su3Rep};
pub use scanner::{CandidateModel, ResultDeduplicator, ScanOrchestrator, ScanReport, Signature};
pub use spectrum::{Chirality, Fermion, QuantumNumbers, Spectrum};
