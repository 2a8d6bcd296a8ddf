//! Hypercharge Grid Generator
//!
//! Turns a hypercharge constraint into the sorted, deduplicated list of
//! candidate rational hypercharges. Constraint kinds form a closed tagged
//! variant; each tag is bound to exactly one generator function in a
//! registry that is checked for completeness when it is built.

use crate::error::{Result, ScanError};
use crate::rational::ExactRational;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

const CONTEXT: &str = "hypercharge";

/// Denominators used to discretise a continuous `range` when none are given.
pub const DEFAULT_RANGE_DENOMINATORS: [i64; 4] = [1, 2, 3, 6];

/// Most values a single constraint may produce before deduplication.
pub const MAX_GRID_VALUES: i128 = 100_000;

/// Constraint tags, as written in rule files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintTag {
    Integer,
    Rational,
    Grid,
    Set,
    Range,
}

impl ConstraintTag {
    pub const ALL: [ConstraintTag; 5] = [
        ConstraintTag::Integer,
        ConstraintTag::Rational,
        ConstraintTag::Grid,
        ConstraintTag::Set,
        ConstraintTag::Range,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintTag::Integer => "integer",
            ConstraintTag::Rational => "rational",
            ConstraintTag::Grid => "grid",
            ConstraintTag::Set => "set",
            ConstraintTag::Range => "range",
        }
    }
}

impl FromStr for ConstraintTag {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        ConstraintTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| ScanError::invalid(CONTEXT, format!("unknown constraint kind '{}'", s)))
    }
}

impl fmt::Display for ConstraintTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConstraintKind {
    /// k for k in `min..=max`.
    Integer { min: i64, max: i64 },
    /// n/d for every listed d and every n with `min <= n/d <= max`.
    Rational {
        min: ExactRational,
        max: ExactRational,
        denominators: Vec<i64>,
    },
    /// k/denominator for k in `-k_max..=k_max`.
    Grid { k_max: i64, denominator: i64 },
    /// Literal values.
    Set { values: Vec<ExactRational> },
    /// Continuous interval discretised by each denominator.
    Range {
        min: ExactRational,
        max: ExactRational,
        denominators: Vec<i64>,
    },
}

impl ConstraintKind {
    pub fn tag(&self) -> ConstraintTag {
        match self {
            ConstraintKind::Integer { .. } => ConstraintTag::Integer,
            ConstraintKind::Rational { .. } => ConstraintTag::Rational,
            ConstraintKind::Grid { .. } => ConstraintTag::Grid,
            ConstraintKind::Set { .. } => ConstraintTag::Set,
            ConstraintKind::Range { .. } => ConstraintTag::Range,
        }
    }

    /// The k/6 grid used when a rule gives no hypercharge constraint.
    pub fn default_grid() -> Self {
        ConstraintKind::Grid {
            k_max: 6,
            denominator: 6,
        }
    }
}

/// A constraint kind plus the values to remove after generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperchargeConstraint {
    pub kind: ConstraintKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<ExactRational>,
}

impl HyperchargeConstraint {
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            kind,
            exclude: Vec::new(),
        }
    }

    pub fn excluding(mut self, values: impl IntoIterator<Item = ExactRational>) -> Self {
        self.exclude.extend(values);
        self
    }
}

impl Default for HyperchargeConstraint {
    fn default() -> Self {
        Self::new(ConstraintKind::default_grid())
    }
}

type GeneratorFn = fn(&ConstraintKind) -> Result<Vec<ExactRational>>;

/// Tag → generator bindings.
#[derive(Clone)]
pub struct GeneratorRegistry {
    generators: BTreeMap<ConstraintTag, GeneratorFn>,
}

impl GeneratorRegistry {
    /// Registry with every built-in generator, checked for completeness.
    pub fn standard() -> Result<Self> {
        let mut registry = Self {
            generators: BTreeMap::new(),
        };
        registry.register(ConstraintTag::Integer, generate_integer);
        registry.register(ConstraintTag::Rational, generate_rational);
        registry.register(ConstraintTag::Grid, generate_grid);
        registry.register(ConstraintTag::Set, generate_set);
        registry.register(ConstraintTag::Range, generate_range);
        registry.validate()?;
        Ok(registry)
    }

    fn register(&mut self, tag: ConstraintTag, generator: GeneratorFn) {
        self.generators.insert(tag, generator);
    }

    /// Every tag must have a generator.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = ConstraintTag::ALL
            .iter()
            .filter(|tag| !self.generators.contains_key(tag))
            .map(|tag| tag.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(ScanError::invalid(
                CONTEXT,
                format!("no generator registered for: {}", missing.join(", ")),
            ));
        }
        Ok(())
    }

    fn generator(&self, tag: ConstraintTag) -> Result<GeneratorFn> {
        self.generators
            .get(&tag)
            .copied()
            .ok_or_else(|| ScanError::invalid(CONTEXT, format!("no generator registered for '{}'", tag)))
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.generators.keys()).finish()
    }
}

/// Sorted, deduplicated hypercharge values for a constraint.
#[derive(Debug, Clone)]
pub struct HyperchargeGridGenerator {
    registry: GeneratorRegistry,
}

impl HyperchargeGridGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            registry: GeneratorRegistry::standard()?,
        })
    }

    pub fn generate(&self, constraint: &HyperchargeConstraint) -> Result<Vec<ExactRational>> {
        let generator = self.registry.generator(constraint.kind.tag())?;
        let mut values: BTreeSet<ExactRational> = generator(&constraint.kind)?.into_iter().collect();

        for excluded in &constraint.exclude {
            values.remove(excluded);
        }

        if values.is_empty() {
            return Err(ScanError::contradictory(
                CONTEXT,
                format!(
                    "'{}' constraint leaves no hypercharge values after {} exclusion(s)",
                    constraint.kind.tag(),
                    constraint.exclude.len()
                ),
            ));
        }

        Ok(values.into_iter().collect())
    }
}

fn check_interval<T: PartialOrd + fmt::Display>(min: &T, max: &T) -> Result<()> {
    if min > max {
        return Err(ScanError::invalid(
            CONTEXT,
            format!("range minimum {} exceeds maximum {}", min, max),
        ));
    }
    Ok(())
}

fn check_denominators(denominators: &[i64]) -> Result<()> {
    if denominators.is_empty() {
        return Err(ScanError::invalid(CONTEXT, "denominator list is empty"));
    }
    if let Some(bad) = denominators.iter().find(|d| **d <= 0) {
        return Err(ScanError::invalid(
            CONTEXT,
            format!("denominator must be positive, got {}", bad),
        ));
    }
    Ok(())
}

/// Fails once `count` values would exceed [`MAX_GRID_VALUES`].
fn check_size(count: i128) -> Result<()> {
    if count > MAX_GRID_VALUES {
        return Err(ScanError::invalid(
            CONTEXT,
            format!("constraint produces {} values, more than the maximum of {}", count, MAX_GRID_VALUES),
        ));
    }
    Ok(())
}

/// Every n/d inside the closed interval, for each denominator.
fn discretise(min: &ExactRational, max: &ExactRational, denominators: &[i64]) -> Result<Vec<ExactRational>> {
    check_interval(min, max)?;
    check_denominators(denominators)?;

    let out_of_range = || ScanError::invalid(CONTEXT, format!("range [{}, {}] is too wide", min, max));
    let mut bounds = Vec::with_capacity(denominators.len());
    let mut count: i128 = 0;
    for &den in denominators {
        let lo = min.scale(den).ceil_i64().ok_or_else(out_of_range)?;
        let hi = max.scale(den).floor_i64().ok_or_else(out_of_range)?;
        count += (i128::from(hi) - i128::from(lo) + 1).max(0);
        check_size(count)?;
        bounds.push((den, lo, hi));
    }

    let mut values = Vec::new();
    for (den, lo, hi) in bounds {
        for num in lo..=hi {
            values.push(ExactRational::new(num, den)?);
        }
    }
    Ok(values)
}

fn generate_integer(kind: &ConstraintKind) -> Result<Vec<ExactRational>> {
    let ConstraintKind::Integer { min, max } = kind else {
        return Err(ScanError::invalid(CONTEXT, "integer generator given another kind"));
    };
    check_interval(min, max)?;
    check_size(i128::from(*max) - i128::from(*min) + 1)?;
    Ok((*min..=*max).map(ExactRational::from_integer).collect())
}

fn generate_rational(kind: &ConstraintKind) -> Result<Vec<ExactRational>> {
    let ConstraintKind::Rational { min, max, denominators } = kind else {
        return Err(ScanError::invalid(CONTEXT, "rational generator given another kind"));
    };
    discretise(min, max, denominators)
}

fn generate_grid(kind: &ConstraintKind) -> Result<Vec<ExactRational>> {
    let ConstraintKind::Grid { k_max, denominator } = kind else {
        return Err(ScanError::invalid(CONTEXT, "grid generator given another kind"));
    };
    if *k_max < 0 {
        return Err(ScanError::invalid(CONTEXT, format!("k_max must be non-negative, got {}", k_max)));
    }
    check_denominators(&[*denominator])?;
    check_size(2 * i128::from(*k_max) + 1)?;
    (-*k_max..=*k_max)
        .map(|k| ExactRational::new(k, *denominator))
        .collect()
}

fn generate_set(kind: &ConstraintKind) -> Result<Vec<ExactRational>> {
    let ConstraintKind::Set { values } = kind else {
        return Err(ScanError::invalid(CONTEXT, "set generator given another kind"));
    };
    if values.is_empty() {
        return Err(ScanError::invalid(CONTEXT, "set constraint has no values"));
    }
    Ok(values.clone())
}

fn generate_range(kind: &ConstraintKind) -> Result<Vec<ExactRational>> {
    let ConstraintKind::Range { min, max, denominators } = kind else {
        return Err(ScanError::invalid(CONTEXT, "range generator given another kind"));
    };
    if denominators.is_empty() {
        return discretise(min, max, &DEFAULT_RANGE_DENOMINATORS);
    }
    discretise(min, max, denominators)
}
