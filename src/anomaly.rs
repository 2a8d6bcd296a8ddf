//! Anomaly Engine
//!
//! Evaluates the gauge and gravitational anomaly invariants of a fermion
//! spectrum for the gauge group SU(3) × SU(2) × U(1)_Y. Every invariant is a
//! linear functional over the spectrum:
//!
//!   Σ_f  χ_f · generations_f · (coefficients of the other factors) · Y_f^k
//!
//! and the spectrum is anomaly-free iff every sum is exactly zero. All
//! arithmetic is exact; nothing is rounded.

use crate::rational::ExactRational;
use crate::spectrum::{Fermion, Spectrum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One anomaly coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Invariant {
    #[serde(rename = "[SU(3)]³")]
    Su3Cubed,
    #[serde(rename = "[SU(2)]³")]
    Su2Cubed,
    #[serde(rename = "[U(1)_Y][SU(3)]²")]
    HyperchargeSu3Squared,
    #[serde(rename = "[U(1)_Y][SU(2)]²")]
    HyperchargeSu2Squared,
    #[serde(rename = "[U(1)_Y]³")]
    HyperchargeCubed,
    #[serde(rename = "[Gravity]²[U(1)_Y]")]
    GravityHypercharge,
    /// Net left-minus-right Weyl state count.
    #[serde(rename = "[Gravity]²[chirality]")]
    NetChirality,
}

impl Invariant {
    pub fn label(self) -> &'static str {
        match self {
            Invariant::Su3Cubed => "[SU(3)]³",
            Invariant::Su2Cubed => "[SU(2)]³",
            Invariant::HyperchargeSu3Squared => "[U(1)_Y][SU(3)]²",
            Invariant::HyperchargeSu2Squared => "[U(1)_Y][SU(2)]²",
            Invariant::HyperchargeCubed => "[U(1)_Y]³",
            Invariant::GravityHypercharge => "[Gravity]²[U(1)_Y]",
            Invariant::NetChirality => "[Gravity]²[chirality]",
        }
    }

    /// Contribution of one fermion, before the chirality and generation factor.
    fn coefficient(self, fermion: &Fermion) -> ExactRational {
        let d3 = ExactRational::from(i64::from(fermion.su3_rep.dim()));
        let d2 = ExactRational::from(i64::from(fermion.su2_rep.dim()));
        let y = &fermion.hypercharge;

        match self {
            Invariant::Su3Cubed => &fermion.su3_rep.cubic_anomaly() * &d2,
            Invariant::Su2Cubed => &fermion.su2_rep.cubic_anomaly() * &d3,
            Invariant::HyperchargeSu3Squared => &(y * &fermion.su3_rep.dynkin_index()) * &d2,
            Invariant::HyperchargeSu2Squared => &(y * &fermion.su2_rep.dynkin_index()) * &d3,
            Invariant::HyperchargeCubed => &y.pow(3) * &(&d3 * &d2),
            Invariant::GravityHypercharge => y * &(&d3 * &d2),
            Invariant::NetChirality => &d3 * &d2,
        }
    }

    fn term(self, fermion: &Fermion) -> ExactRational {
        let weight = fermion.chirality.sign() * i64::from(fermion.generations);
        self.coefficient(fermion).scale(weight)
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which invariants the engine checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantSet {
    /// The gauge and mixed gravitational anomalies of SU(3) × SU(2) × U(1)_Y.
    #[default]
    Standard,
    /// Standard plus a vanishing net chirality count, which demands a
    /// right-handed partner for every left-handed state (e.g. ν_R).
    ChiralityBalanced,
}

impl InvariantSet {
    pub fn invariants(self) -> &'static [Invariant] {
        const STANDARD: [Invariant; 6] = [
            Invariant::Su3Cubed,
            Invariant::Su2Cubed,
            Invariant::HyperchargeSu3Squared,
            Invariant::HyperchargeSu2Squared,
            Invariant::HyperchargeCubed,
            Invariant::GravityHypercharge,
        ];
        const BALANCED: [Invariant; 7] = [
            Invariant::Su3Cubed,
            Invariant::Su2Cubed,
            Invariant::HyperchargeSu3Squared,
            Invariant::HyperchargeSu2Squared,
            Invariant::HyperchargeCubed,
            Invariant::GravityHypercharge,
            Invariant::NetChirality,
        ];
        match self {
            InvariantSet::Standard => &STANDARD,
            InvariantSet::ChiralityBalanced => &BALANCED,
        }
    }
}

/// Invariant values of one spectrum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub values: BTreeMap<Invariant, ExactRational>,
    pub all_vanish: bool,
}

impl AnomalyResult {
    fn from_values(values: BTreeMap<Invariant, ExactRational>) -> Self {
        let all_vanish = values.values().all(ExactRational::is_zero);
        Self { values, all_vanish }
    }

    pub fn value(&self, invariant: Invariant) -> Option<&ExactRational> {
        self.values.get(&invariant)
    }

    /// Invariants that do not cancel, in catalog order.
    pub fn non_vanishing(&self) -> Vec<(Invariant, &ExactRational)> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_zero())
            .map(|(k, v)| (*k, v))
            .collect()
    }
}

impl fmt::Display for AnomalyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Anomaly Coefficients:")?;
        writeln!(f, "{}", "-".repeat(20))?;
        for (invariant, value) in &self.values {
            let status = if value.is_zero() { "✓" } else { "✗" };
            writeln!(f, "{} {:22} = {}", status, invariant.label(), value)?;
        }
        writeln!(f)?;
        if self.all_vanish {
            write!(f, "✓ All anomalies cancel")
        } else {
            writeln!(f, "✗ Anomalies do not cancel:")?;
            let failures: Vec<String> = self
                .non_vanishing()
                .into_iter()
                .map(|(k, v)| format!("  - {} = {}", k, v))
                .collect();
            write!(f, "{}", failures.join("\n"))
        }
    }
}

/// Pure anomaly evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnomalyEngine {
    invariant_set: InvariantSet,
}

impl AnomalyEngine {
    pub fn new(invariant_set: InvariantSet) -> Self {
        Self { invariant_set }
    }

    pub fn invariant_set(&self) -> InvariantSet {
        self.invariant_set
    }

    pub fn verify(&self, spectrum: &Spectrum) -> AnomalyResult {
        self.verify_fermions(spectrum.iter())
    }

    /// Evaluate over any collection of fermions, without requiring unique
    /// names.
    pub fn verify_fermions<'a>(&self, fermions: impl IntoIterator<Item = &'a Fermion>) -> AnomalyResult {
        let invariants = self.invariant_set.invariants();
        let mut values: BTreeMap<Invariant, ExactRational> = invariants
            .iter()
            .map(|inv| (*inv, ExactRational::zero()))
            .collect();

        for fermion in fermions {
            for invariant in invariants {
                let term = invariant.term(fermion);
                if let Some(sum) = values.get_mut(invariant) {
                    *sum += &term;
                }
            }
        }

        AnomalyResult::from_values(values)
    }

    /// Human-readable report: fermion content followed by the coefficients.
    pub fn report(&self, spectrum: &Spectrum) -> String {
        let result = self.verify(spectrum);
        let mut lines = vec![
            "Anomaly Cancellation Report".to_string(),
            "=".repeat(30),
            String::new(),
            "Fermion Content:".to_string(),
            "-".repeat(20),
        ];
        lines.extend(spectrum.iter().map(|f| f.to_string()));
        lines.push(String::new());
        lines.push(result.to_string());
        lines.join("\n")
    }
}
