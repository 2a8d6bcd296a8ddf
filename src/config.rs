//! Scan Configuration
//!
//! The read-only value a scan is driven by. It is built by the caller (the
//! rule loader or the CLI) and never mutated by the core.

use crate::anomaly::InvariantSet;
use crate::error::{Result, ScanError};
use crate::grid::{ConstraintKind, HyperchargeConstraint, HyperchargeGridGenerator};
use crate::rational::{q, ExactRational};
use crate::representation::{Su2Rep, Su3Rep};
use crate::spectrum::{Chirality, Fermion, Spectrum};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumeration patterns, in the order the orchestrator runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Block {
    /// Single additions.
    #[serde(rename = "A")]
    A,
    /// Vector-like pairs over the full grid.
    #[serde(rename = "B")]
    B,
    /// Vector-like partners of Block A hits.
    #[serde(rename = "B'")]
    BPrime,
    /// Chiral doublet pairs.
    #[serde(rename = "C")]
    C,
    /// Named fermion sets from the rule file.
    #[serde(rename = "motivated")]
    Motivated,
}

impl Block {
    pub fn label(self) -> &'static str {
        match self {
            Block::A => "A",
            Block::B => "B",
            Block::BPrime => "B'",
            Block::C => "C",
            Block::Motivated => "motivated",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "A" | "a" => Some(Block::A),
            "B" | "b" => Some(Block::B),
            "B'" | "b'" | "B-prime" | "Bprime" => Some(Block::BPrime),
            "C" | "c" => Some(Block::C),
            _ => None,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFlags {
    pub a: bool,
    pub b: bool,
    pub b_prime: bool,
    pub c: bool,
}

impl Default for BlockFlags {
    fn default() -> Self {
        Self {
            a: true,
            b: true,
            b_prime: true,
            c: true,
        }
    }
}

impl BlockFlags {
    pub fn none() -> Self {
        Self {
            a: false,
            b: false,
            b_prime: false,
            c: false,
        }
    }

    pub fn only(blocks: &[Block]) -> Self {
        let mut flags = Self::none();
        for block in blocks {
            match block {
                Block::A => flags.a = true,
                Block::B => flags.b = true,
                Block::BPrime => flags.b_prime = true,
                Block::C => flags.c = true,
                Block::Motivated => {}
            }
        }
        flags
    }

    pub fn enabled(&self, block: Block) -> bool {
        match block {
            Block::A => self.a,
            Block::B => self.b,
            // Seeded pairs need Block A hits to seed from.
            Block::BPrime => self.a && self.b_prime,
            Block::C => self.c,
            Block::Motivated => true,
        }
    }
}

/// How the two legs of a Block C pair are assigned chirality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChiralAssignment {
    /// +Y leg left-handed, −Y leg right-handed.
    Opposite,
    /// Both legs left-handed (Higgsino-like).
    Aligned,
}

impl ChiralAssignment {
    /// Chirality of the `+Y` leg and of the `−Y` leg.
    pub fn chiralities(self) -> (Chirality, Chirality) {
        match self {
            ChiralAssignment::Opposite => (Chirality::Left, Chirality::Right),
            ChiralAssignment::Aligned => (Chirality::Left, Chirality::Left),
        }
    }
}

impl fmt::Display for ChiralAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChiralAssignment::Opposite => f.write_str("opposite"),
            ChiralAssignment::Aligned => f.write_str("aligned"),
        }
    }
}

/// Block C settings. The pair is recorded as two independent additions in
/// the signature; the description carries the combined label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChiralPairConfig {
    /// Positive hypercharge magnitudes; each yields a `+Y`/`−Y` pair.
    pub hypercharges: Vec<ExactRational>,
    /// Walked innermost, in this order.
    pub assignments: Vec<ChiralAssignment>,
}

impl Default for ChiralPairConfig {
    fn default() -> Self {
        Self {
            hypercharges: vec![q(1, 2), q(1, 1), q(3, 2)],
            assignments: vec![ChiralAssignment::Opposite, ChiralAssignment::Aligned],
        }
    }
}

/// A named fermion set tested as one candidate extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotivatedSet {
    pub name: String,
    pub fermions: Vec<Fermion>,
}

/// Two fermions that must both be present with the same SU(3) and SU(2)
/// representations, written `"Q_L:Q_R"` in rule files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParityPair {
    pub left: String,
    pub right: String,
}

impl fmt::Display for ParityPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfiguration {
    pub name: String,
    pub base_spectrum: Spectrum,
    pub blocks: BlockFlags,
    pub hypercharge: HyperchargeConstraint,
    pub su3_reps: Vec<Su3Rep>,
    pub su2_reps: Vec<Su2Rep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forbidden_combinations: Vec<(Su3Rep, Su2Rep)>,
    /// Block A keeps only `|Y| <= abs_max`.
    pub abs_max: ExactRational,
    pub chiral_pair: ChiralPairConfig,
    pub invariants: InvariantSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Maximum number of candidates to verify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_candidates: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub motivated_sets: Vec<MotivatedSet>,
    /// Only consulted by [`ScanConfiguration::validate_fermion_set`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parity_pairs: Vec<ParityPair>,
}

impl ScanConfiguration {
    pub fn new(name: impl Into<String>, base_spectrum: Spectrum) -> Self {
        Self {
            name: name.into(),
            base_spectrum,
            blocks: BlockFlags::default(),
            hypercharge: HyperchargeConstraint::default(),
            su3_reps: Su3Rep::ALL.to_vec(),
            su2_reps: Su2Rep::ALL.to_vec(),
            forbidden_combinations: Vec::new(),
            abs_max: q(1, 1),
            chiral_pair: ChiralPairConfig::default(),
            invariants: InvariantSet::Standard,
            limit: None,
            max_candidates: None,
            time_budget_secs: None,
            motivated_sets: Vec::new(),
            parity_pairs: Vec::new(),
        }
    }

    pub fn with_blocks(mut self, blocks: BlockFlags) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_hypercharge(mut self, kind: ConstraintKind) -> Self {
        self.hypercharge = HyperchargeConstraint::new(kind);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Narrow grid and representation sets for a fast look.
    pub fn quick(mut self) -> Self {
        self.hypercharge = HyperchargeConstraint::new(ConstraintKind::Grid {
            k_max: 3,
            denominator: 6,
        });
        self.su3_reps = vec![Su3Rep::Singlet, Su3Rep::Triplet];
        self.su2_reps = vec![Su2Rep::Singlet, Su2Rep::Doublet];
        self
    }

    /// Override `k_max` of a grid constraint; other kinds are left alone.
    pub fn with_hyper_max(mut self, k_max: i64) -> Self {
        if let ConstraintKind::Grid { denominator, .. } = self.hypercharge.kind {
            self.hypercharge.kind = ConstraintKind::Grid { k_max, denominator };
        }
        self
    }

    pub fn is_forbidden(&self, su3: Su3Rep, su2: Su2Rep) -> bool {
        self.forbidden_combinations.contains(&(su3, su2))
    }

    /// Structural checks that do not need the grid generator. Errors carry
    /// this configuration's name.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(ScanError::invalid(self.name.as_str(), reason));

        if self.su3_reps.is_empty() {
            return invalid("no SU(3) representations to scan".to_string());
        }
        if self.su2_reps.is_empty() {
            return invalid("no SU(2) representations to scan".to_string());
        }
        if self.abs_max.is_negative() {
            return invalid(format!("abs_max must be non-negative, got {}", self.abs_max));
        }
        if self.blocks.c {
            if self.chiral_pair.hypercharges.is_empty() {
                return invalid("Block C has no hypercharge magnitudes".to_string());
            }
            if let Some(bad) = self.chiral_pair.hypercharges.iter().find(|y| !y.is_positive()) {
                return invalid(format!("Block C hypercharge magnitudes must be positive, got {}", bad));
            }
            if self.chiral_pair.assignments.is_empty() {
                return invalid("Block C has no chirality assignments".to_string());
            }
        }
        for set in &self.motivated_sets {
            if set.fermions.is_empty() {
                return invalid(format!("physics-motivated set '{}' is empty", set.name));
            }
        }
        let fermions = self
            .base_spectrum
            .iter()
            .chain(self.motivated_sets.iter().flat_map(|set| set.fermions.iter()));
        for fermion in fermions {
            if fermion.generations == 0 {
                return invalid(format!("'{}' has zero generations", fermion.name));
            }
        }
        Ok(())
    }

    /// Check a fermion set against this configuration's constraints.
    ///
    /// Returns one message per violation; an empty list means the set fits.
    /// Representations must be in the scanned sets and not forbidden, the
    /// hypercharge must be on the generated grid, and every parity pair
    /// must be present with matching representations.
    pub fn validate_fermion_set(&self, fermions: &[Fermion]) -> Result<Vec<String>> {
        let allowed = HyperchargeGridGenerator::new()?
            .generate(&self.hypercharge)
            .map_err(|e| e.for_config(&self.name))?;

        let mut violations = Vec::new();
        for fermion in fermions {
            if !self.su3_reps.contains(&fermion.su3_rep) {
                violations.push(format!("{}: SU(3) rep {} not allowed", fermion.name, fermion.su3_rep));
            }
            if !self.su2_reps.contains(&fermion.su2_rep) {
                violations.push(format!("{}: SU(2) rep {} not allowed", fermion.name, fermion.su2_rep));
            }
            if self.is_forbidden(fermion.su3_rep, fermion.su2_rep) {
                violations.push(format!(
                    "{}: ({}, {}) is a forbidden combination",
                    fermion.name, fermion.su3_rep, fermion.su2_rep
                ));
            }
            if allowed.binary_search(&fermion.hypercharge).is_err() {
                violations.push(format!("{}: hypercharge {} not allowed", fermion.name, fermion.hypercharge));
            }
        }

        for pair in &self.parity_pairs {
            let left = fermions.iter().find(|f| f.name == pair.left);
            let right = fermions.iter().find(|f| f.name == pair.right);
            match (left, right) {
                (Some(left), Some(right)) => {
                    if left.su3_rep != right.su3_rep || left.su2_rep != right.su2_rep {
                        violations.push(format!("Parity pair {} has mismatched representations", pair));
                    }
                }
                _ => violations.push(format!("Parity pair {} incomplete", pair)),
            }
        }
        Ok(violations)
    }
}
