//! Rule Files
//!
//! JSON rule files describe named scan configurations:
//!
//! ```json
//! {
//!   "base_spectra": { "sm_two_gen": [ { "name": "Q_L", "su3_rep": 3, ... } ] },
//!   "rule_sets": [
//!     {
//!       "name": "vector_like_search",
//!       "base_spectrum": "standard_model",
//!       "blocks": ["B"],
//!       "constraints": {
//!         "hypercharge": { "type": "set", "values": ["-1/2", "1/6"] },
//!         "su3_rep": { "values": [1, 3], "forbidden_combinations": [[3, 3]] },
//!         "su2_rep": { "values": [1, 2] }
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Raw values are kept loosely typed on load and converted to a
//! [`ScanConfiguration`] per rule, so a broken rule only fails itself.
//! `standard_model` and `standard_model_nu` are always available as base
//! spectra.

use crate::anomaly::InvariantSet;
use crate::config::{
    Block, BlockFlags, ChiralAssignment, ChiralPairConfig, MotivatedSet, ParityPair, ScanConfiguration,
};
use crate::error::{Result, ScanError};
use crate::grid::{ConstraintKind, ConstraintTag, HyperchargeConstraint, DEFAULT_RANGE_DENOMINATORS};
use crate::rational::ExactRational;
use crate::representation::{Su2Rep, Su3Rep};
use crate::spectrum::{Fermion, Spectrum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use strsim::jaro_winkler;
use tracing::{debug, info};

pub const STANDARD_MODEL: &str = "standard_model";
pub const STANDARD_MODEL_NU: &str = "standard_model_nu";

/// Below this similarity no suggestion is offered.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A rational as written in a rule file: `"1/6"`, `"0.5"`, `"-1"`, `2` or
/// `1.5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRational {
    Int(i64),
    /// Read back through its shortest decimal form, so `0.1` is exactly 1/10.
    Float(f64),
    Text(String),
}

impl RawRational {
    fn resolve(&self, config: &str, field: &str) -> Result<ExactRational> {
        let parse = |text: &str| {
            ExactRational::from_str(text).map_err(|e| ScanError::invalid(config, format!("{}: {}", field, e)))
        };
        match self {
            RawRational::Int(value) => Ok(ExactRational::from_integer(*value)),
            RawRational::Float(value) if value.is_finite() => parse(&value.to_string()),
            RawRational::Float(value) => Err(ScanError::invalid(
                config,
                format!("{}: {} is not a finite number", field, value),
            )),
            RawRational::Text(text) => parse(text),
        }
    }
}

fn resolve_all(values: &[RawRational], config: &str, field: &str) -> Result<Vec<ExactRational>> {
    values.iter().map(|v| v.resolve(config, field)).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFermion {
    pub name: String,
    pub su3_rep: u32,
    pub su2_rep: u32,
    pub hypercharge: RawRational,
    pub chirality: i8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generations: Option<u32>,
}

impl RawFermion {
    fn resolve(&self, config: &str) -> Result<Fermion> {
        let hypercharge = self.hypercharge.resolve(config, &format!("hypercharge of '{}'", self.name))?;
        let fermion = Fermion::from_ids(self.name.clone(), self.su3_rep, self.su2_rep, hypercharge, self.chirality)
            .map_err(|e| e.for_config(config))?;
        match self.generations {
            Some(generations) => fermion.with_generations(generations).map_err(|e| e.for_config(config)),
            None => Ok(fermion),
        }
    }
}

fn resolve_spectrum(fermions: &[RawFermion], config: &str) -> Result<Spectrum> {
    let fermions = fermions
        .iter()
        .map(|f| f.resolve(config))
        .collect::<Result<Vec<_>>>()?;
    Spectrum::new(fermions)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHypercharge {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[RawRational; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominators: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominator: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<RawRational>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<RawRational>,
}

impl RawHypercharge {
    fn resolve(&self, config: &str) -> Result<HyperchargeConstraint> {
        let tag = ConstraintTag::from_str(&self.kind).map_err(|e| e.for_config(config))?;
        let interval = || -> Result<(ExactRational, ExactRational)> {
            let [min, max] = self
                .range
                .as_ref()
                .ok_or_else(|| ScanError::invalid(config, format!("'{}' constraint needs a range", tag)))?;
            Ok((min.resolve(config, "range")?, max.resolve(config, "range")?))
        };

        let kind = match tag {
            ConstraintTag::Integer => {
                let (min, max) = interval()?;
                ConstraintKind::Integer {
                    min: integer_bound(&min, config)?,
                    max: integer_bound(&max, config)?,
                }
            }
            ConstraintTag::Rational => {
                let (min, max) = interval()?;
                let denominators = self.denominators.clone().ok_or_else(|| {
                    ScanError::invalid(config, "'rational' constraint needs a denominators list")
                })?;
                ConstraintKind::Rational { min, max, denominators }
            }
            ConstraintTag::Grid => ConstraintKind::Grid {
                k_max: self.k_max.unwrap_or(6),
                denominator: self.denominator.unwrap_or(6),
            },
            ConstraintTag::Set => {
                let values = self
                    .values
                    .as_ref()
                    .ok_or_else(|| ScanError::invalid(config, "'set' constraint needs values"))?;
                ConstraintKind::Set {
                    values: resolve_all(values, config, "values")?,
                }
            }
            ConstraintTag::Range => {
                let (min, max) = interval()?;
                ConstraintKind::Range {
                    min,
                    max,
                    denominators: self
                        .denominators
                        .clone()
                        .unwrap_or_else(|| DEFAULT_RANGE_DENOMINATORS.to_vec()),
                }
            }
        };

        Ok(HyperchargeConstraint {
            kind,
            exclude: resolve_all(&self.exclude, config, "exclude")?,
        })
    }
}

fn integer_bound(value: &ExactRational, config: &str) -> Result<i64> {
    match (value.floor_i64(), value.ceil_i64()) {
        (Some(floor), Some(ceil)) if floor == ceil => Ok(floor),
        _ => Err(ScanError::invalid(
            config,
            format!("'integer' constraint bounds must be integers, got {}", value),
        )),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRepConstraint {
    #[serde(default)]
    pub values: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forbidden_combinations: Vec<[u32; 2]>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypercharge: Option<RawHypercharge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub su3_rep: Option<RawRepConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub su2_rep: Option<RawRepConstraint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChiralPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypercharges: Option<Vec<RawRational>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<String>>,
}

/// `{"type": "parity", "pairs": ["Q_L:Q_R"]}`. Parity is the only
/// supported type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSymmetryRequirement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pairs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMotivatedSet {
    pub name: String,
    pub fermions: Vec<RawFermion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_base_spectrum")]
    pub base_spectrum: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<String>>,
    #[serde(default)]
    pub constraints: RawConstraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abs_max: Option<RawRational>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chiral_pair: Option<RawChiralPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invariants: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_candidates: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub physics_motivated_sets: Vec<RawMotivatedSet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symmetry_requirements: Vec<RawSymmetryRequirement>,
}

fn default_base_spectrum() -> String {
    STANDARD_MODEL.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub base_spectra: BTreeMap<String, Vec<RawFermion>>,
    #[serde(default)]
    pub rule_sets: Vec<RawRule>,
}

/// A loaded rule file with its base spectra resolved.
#[derive(Debug, Clone)]
pub struct RuleBook {
    base_spectra: BTreeMap<String, Spectrum>,
    rules: Vec<RawRule>,
}

impl RuleBook {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading rule file {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: RuleFile = serde_json::from_str(json)?;
        Self::from_rule_file(file)
    }

    pub fn from_rule_file(file: RuleFile) -> Result<Self> {
        let mut base_spectra = BTreeMap::new();
        base_spectra.insert(STANDARD_MODEL.to_string(), Spectrum::standard_model(false));
        base_spectra.insert(STANDARD_MODEL_NU.to_string(), Spectrum::standard_model(true));
        for (name, fermions) in &file.base_spectra {
            base_spectra.insert(name.clone(), resolve_spectrum(fermions, name)?);
        }

        let mut seen = std::collections::HashSet::new();
        for rule in &file.rule_sets {
            if !seen.insert(rule.name.as_str()) {
                return Err(ScanError::invalid(rule.name.as_str(), "rule name defined more than once"));
            }
        }

        Ok(Self {
            base_spectra,
            rules: file.rule_sets,
        })
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// (name, description) of every rule, in file order.
    pub fn list_rules(&self) -> Vec<(&str, &str)> {
        self.rules
            .iter()
            .map(|r| (r.name.as_str(), r.description.as_str()))
            .collect()
    }

    pub fn base_spectrum(&self, name: &str) -> Option<&Spectrum> {
        self.base_spectra.get(name)
    }

    pub fn configuration(&self, name: &str) -> Result<ScanConfiguration> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| ScanError::UnknownRule {
                name: name.to_string(),
                suggestion: closest(name, self.rules.iter().map(|r| r.name.as_str())),
            })?;
        self.resolve(rule)
    }

    /// Every rule converted independently, in file order.
    pub fn configurations(&self) -> Vec<(String, Result<ScanConfiguration>)> {
        self.rules
            .iter()
            .map(|rule| (rule.name.clone(), self.resolve(rule)))
            .collect()
    }

    fn resolve(&self, rule: &RawRule) -> Result<ScanConfiguration> {
        let name = rule.name.as_str();
        let base = self.base_spectra.get(&rule.base_spectrum).ok_or_else(|| {
            let hint = closest(&rule.base_spectrum, self.base_spectra.keys().map(String::as_str))
                .map(|s| format!(" (did you mean '{}'?)", s))
                .unwrap_or_default();
            ScanError::invalid(name, format!("unknown base spectrum '{}'{}", rule.base_spectrum, hint))
        })?;

        let mut config = ScanConfiguration::new(name, base.clone());

        if let Some(labels) = &rule.blocks {
            let blocks = labels
                .iter()
                .map(|label| {
                    Block::parse(label).ok_or_else(|| ScanError::invalid(name, format!("unknown block '{}'", label)))
                })
                .collect::<Result<Vec<_>>>()?;
            config.blocks = BlockFlags::only(&blocks);
        }

        if let Some(hypercharge) = &rule.constraints.hypercharge {
            config.hypercharge = hypercharge.resolve(name)?;
        }
        if let Some(su3) = &rule.constraints.su3_rep {
            config.su3_reps = su3
                .values
                .iter()
                .map(|id| Su3Rep::from_id(*id))
                .collect::<Result<Vec<_>>>()
                .map_err(|e| e.for_config(name))?;
            config.forbidden_combinations = su3
                .forbidden_combinations
                .iter()
                .map(|[su3_id, su2_id]| -> Result<(Su3Rep, Su2Rep)> {
                    Ok((Su3Rep::from_id(*su3_id)?, Su2Rep::from_id(*su2_id)?))
                })
                .collect::<Result<Vec<_>>>()
                .map_err(|e| e.for_config(name))?;
        }
        if let Some(su2) = &rule.constraints.su2_rep {
            config.su2_reps = su2
                .values
                .iter()
                .map(|id| Su2Rep::from_id(*id))
                .collect::<Result<Vec<_>>>()
                .map_err(|e| e.for_config(name))?;
        }

        if let Some(abs_max) = &rule.abs_max {
            config.abs_max = abs_max.resolve(name, "abs_max")?;
        }
        if let Some(pair) = &rule.chiral_pair {
            config.chiral_pair = resolve_chiral_pair(pair, name)?;
        }
        if let Some(invariants) = &rule.invariants {
            config.invariants = match invariants.as_str() {
                "standard" => InvariantSet::Standard,
                "chirality_balanced" => InvariantSet::ChiralityBalanced,
                other => return Err(ScanError::invalid(name, format!("unknown invariant set '{}'", other))),
            };
        }

        config.limit = rule.limit;
        config.max_candidates = rule.max_candidates;
        config.time_budget_secs = rule.time_budget_secs;
        config.motivated_sets = rule
            .physics_motivated_sets
            .iter()
            .map(|set| -> Result<MotivatedSet> {
                Ok(MotivatedSet {
                    name: set.name.clone(),
                    fermions: set.fermions.iter().map(|f| f.resolve(name)).collect::<Result<_>>()?,
                })
            })
            .collect::<Result<_>>()?;

        config.parity_pairs = rule
            .symmetry_requirements
            .iter()
            .map(|req| resolve_parity_pairs(req, name))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();

        config.validate()?;
        Ok(config)
    }

    /// Violations of a rule's constraints by a fermion set, one message
    /// each. Empty when the set satisfies the rule.
    pub fn validate_fermion_set(&self, rule_name: &str, fermions: &[Fermion]) -> Result<Vec<String>> {
        self.configuration(rule_name)?.validate_fermion_set(fermions)
    }

    /// Write a rule's resolved configuration as pretty JSON, for archival.
    pub fn export_rule(&self, rule_name: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config = self.configuration(rule_name)?;
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &config)?;
        writer.flush()?;
        info!("Exported rule '{}' to {}", rule_name, path.display());
        Ok(())
    }
}

fn resolve_parity_pairs(req: &RawSymmetryRequirement, config: &str) -> Result<Vec<ParityPair>> {
    if req.kind != "parity" {
        return Err(ScanError::invalid(
            config,
            format!("unsupported symmetry requirement '{}'", req.kind),
        ));
    }
    req.pairs
        .iter()
        .map(|pair| match pair.split_once(':') {
            Some((left, right)) if !left.trim().is_empty() && !right.trim().is_empty() => Ok(ParityPair {
                left: left.trim().to_string(),
                right: right.trim().to_string(),
            }),
            _ => Err(ScanError::invalid(
                config,
                format!("parity pair '{}' must be written 'LEFT:RIGHT'", pair),
            )),
        })
        .collect()
}

fn resolve_chiral_pair(raw: &RawChiralPair, config: &str) -> Result<ChiralPairConfig> {
    let mut pair = ChiralPairConfig::default();
    if let Some(hypercharges) = &raw.hypercharges {
        pair.hypercharges = resolve_all(hypercharges, config, "chiral_pair.hypercharges")?;
    }
    if let Some(assignments) = &raw.assignments {
        pair.assignments = assignments
            .iter()
            .map(|label| match label.as_str() {
                "opposite" => Ok(ChiralAssignment::Opposite),
                "aligned" => Ok(ChiralAssignment::Aligned),
                other => Err(ScanError::invalid(config, format!("unknown chirality assignment '{}'", other))),
            })
            .collect::<Result<_>>()?;
    }
    Ok(pair)
}

/// Closest candidate by Jaro-Winkler similarity, if close enough.
fn closest<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    candidates
        .map(|candidate| (candidate, jaro_winkler(name, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::q;

    const RULES: &str = r#"{
        "base_spectra": {
            "sm_with_singlet": [
                {"name": "Q_L", "su3_rep": 3, "su2_rep": 2, "hypercharge": "1/6", "chirality": 1},
                {"name": "u_R", "su3_rep": 3, "su2_rep": 1, "hypercharge": "2/3", "chirality": -1},
                {"name": "d_R", "su3_rep": 3, "su2_rep": 1, "hypercharge": "-1/3", "chirality": -1},
                {"name": "L_L", "su3_rep": 1, "su2_rep": 2, "hypercharge": "-0.5", "chirality": 1},
                {"name": "e_R", "su3_rep": 1, "su2_rep": 1, "hypercharge": -1, "chirality": -1},
                {"name": "S", "su3_rep": 1, "su2_rep": 1, "hypercharge": 0, "chirality": 1, "generations": 2}
            ]
        },
        "rule_sets": [
            {
                "name": "vector_like_search",
                "description": "Vector-like pairs on a small set",
                "blocks": ["B"],
                "constraints": {
                    "hypercharge": {"type": "set", "values": ["-1/2", "1/6", 0], "exclude": [0]},
                    "su3_rep": {"values": [1, 3], "forbidden_combinations": [[3, 1]]},
                    "su2_rep": {"values": [1, 2]}
                },
                "limit": 10
            },
            {
                "name": "higgsino",
                "base_spectrum": "sm_with_singlet",
                "blocks": ["C"],
                "chiral_pair": {"hypercharges": ["1/2"], "assignments": ["aligned"]},
                "invariants": "standard"
            },
            {
                "name": "broken_denominator",
                "constraints": {"hypercharge": {"type": "rational", "range": ["-1", "1"], "denominators": [0]}}
            },
            {
                "name": "bad_literal",
                "abs_max": "1/0"
            }
        ]
    }"#;

    #[test]
    fn test_load_and_convert() {
        let book = RuleBook::from_json(RULES).unwrap();
        assert_eq!(book.rule_names(), vec!["vector_like_search", "higgsino", "broken_denominator", "bad_literal"]);
        assert!(book.base_spectrum(STANDARD_MODEL_NU).is_some());
        assert_eq!(book.base_spectrum("sm_with_singlet").unwrap().fermion("S").unwrap().generations, 2);

        let config = book.configuration("vector_like_search").unwrap();
        assert_eq!(config.blocks, BlockFlags::only(&[Block::B]));
        assert_eq!(config.su3_reps, vec![Su3Rep::Singlet, Su3Rep::Triplet]);
        assert_eq!(config.forbidden_combinations, vec![(Su3Rep::Triplet, Su2Rep::Singlet)]);
        assert_eq!(config.hypercharge.exclude, vec![q(0, 1)]);
        assert_eq!(config.limit, Some(10));

        let config = book.configuration("higgsino").unwrap();
        assert_eq!(config.base_spectrum.len(), 6);
        assert_eq!(config.chiral_pair.assignments, vec![ChiralAssignment::Aligned]);
    }

    #[test]
    fn test_unknown_rule_suggests_closest() {
        let book = RuleBook::from_json(RULES).unwrap();
        match book.configuration("vector_like_serch") {
            Err(ScanError::UnknownRule { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("vector_like_search"))
            }
            other => panic!("unexpected: {other:?}"),
        }
        match book.configuration("zzz") {
            Err(ScanError::UnknownRule { suggestion, .. }) => assert_eq!(suggestion, None),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_bad_rules_fail_alone() {
        let book = RuleBook::from_json(RULES).unwrap();
        let results = book.configurations();
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_ok());
        // The zero denominator is caught by the grid generator when the scan starts.
        assert!(results[2].1.is_ok());
        match &results[3].1 {
            Err(ScanError::InvalidConstraint { config, .. }) => assert_eq!(config, "bad_literal"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tag_and_block() {
        let json = r#"{"rule_sets": [
            {"name": "t", "constraints": {"hypercharge": {"type": "spiral"}}},
            {"name": "b", "blocks": ["A", "D"]},
            {"name": "r", "constraints": {"su3_rep": {"values": [1, 10]}}},
            {"name": "i", "constraints": {"hypercharge": {"type": "integer", "range": ["-1/2", 1]}}}
        ]}"#;
        let book = RuleBook::from_json(json).unwrap();
        assert!(matches!(
            book.configuration("t"),
            Err(ScanError::InvalidConstraint { config, .. }) if config == "t"
        ));
        assert!(matches!(book.configuration("b"), Err(ScanError::InvalidConstraint { .. })));
        match book.configuration("r") {
            Err(err @ ScanError::UnsupportedRepresentation { .. }) => {
                assert!(err.to_string().contains("'r'"), "{}", err);
                assert!(matches!(err, ScanError::UnsupportedRepresentation { id: 10, ref config, .. } if config == "r"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(book.configuration("i"), Err(ScanError::InvalidConstraint { .. })));
    }

    #[test]
    fn test_duplicate_base_fermion_is_rejected() {
        let json = r#"{"base_spectra": {"clash": [
            {"name": "a", "su3_rep": 1, "su2_rep": 1, "hypercharge": 0, "chirality": 1},
            {"name": "a", "su3_rep": 1, "su2_rep": 1, "hypercharge": 0, "chirality": -1}
        ]}}"#;
        assert!(matches!(
            RuleBook::from_json(json),
            Err(ScanError::DuplicateFermionName(name)) if name == "a"
        ));
    }

    #[test]
    fn test_float_literals_are_exact() {
        let json = r#"{"rule_sets": [
            {"name": "good", "blocks": ["A"]},
            {"name": "floaty", "abs_max": 1.0,
             "constraints": {"hypercharge": {"type": "range", "range": [-1.5, 1.5], "denominators": [2],
                                             "exclude": [0.5]}},
             "chiral_pair": {"hypercharges": [0.5]}}
        ]}"#;
        let book = RuleBook::from_json(json).unwrap();
        assert!(book.configuration("good").is_ok());

        let config = book.configuration("floaty").unwrap();
        assert_eq!(config.abs_max, q(1, 1));
        assert_eq!(
            config.hypercharge.kind,
            ConstraintKind::Range {
                min: q(-3, 2),
                max: q(3, 2),
                denominators: vec![2],
            }
        );
        assert_eq!(config.hypercharge.exclude, vec![q(1, 2)]);
        assert_eq!(config.chiral_pair.hypercharges, vec![q(1, 2)]);
    }

    #[test]
    fn test_symmetry_requirements() {
        let json = r#"{"rule_sets": [
            {"name": "left_right", "blocks": ["B"],
             "constraints": {"hypercharge": {"type": "set", "values": ["1/6", "-1/2"]}},
             "symmetry_requirements": [{"type": "parity", "pairs": ["Q4_L:Q4_R", " E_L : E_R "]}]},
            {"name": "discrete", "symmetry_requirements": [{"type": "z2"}]},
            {"name": "half_pair", "symmetry_requirements": [{"type": "parity", "pairs": ["Q_L"]}]}
        ]}"#;
        let book = RuleBook::from_json(json).unwrap();

        let config = book.configuration("left_right").unwrap();
        assert_eq!(
            config.parity_pairs,
            vec![
                ParityPair {
                    left: "Q4_L".into(),
                    right: "Q4_R".into()
                },
                ParityPair {
                    left: "E_L".into(),
                    right: "E_R".into()
                },
            ]
        );
        for name in ["discrete", "half_pair"] {
            assert!(matches!(
                book.configuration(name),
                Err(ScanError::InvalidConstraint { ref config, .. }) if config == name
            ));
        }

        let quarks = vec![
            Fermion::new("Q4_L", Su3Rep::Triplet, Su2Rep::Doublet, q(1, 6), crate::spectrum::Chirality::Left),
            Fermion::new("Q4_R", Su3Rep::Triplet, Su2Rep::Doublet, q(1, 6), crate::spectrum::Chirality::Right),
        ];
        let violations = book.validate_fermion_set("left_right", &quarks).unwrap();
        assert_eq!(violations, vec!["Parity pair (E_L, E_R) incomplete".to_string()]);

        assert!(matches!(
            book.validate_fermion_set("left_rigth", &quarks),
            Err(ScanError::UnknownRule { .. })
        ));
    }

    #[test]
    fn test_export_rule_reads_back() {
        let book = RuleBook::from_json(RULES).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("higgsino.json");
        book.export_rule("higgsino", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let back: ScanConfiguration = serde_json::from_str(&content).unwrap();
        assert_eq!(back, book.configuration("higgsino").unwrap());

        assert!(matches!(
            book.export_rule("bad_literal", dir.path().join("bad.json")),
            Err(ScanError::InvalidConstraint { .. })
        ));
    }
}
