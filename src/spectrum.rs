//! Fermion Spectrum Model
//!
//! Fermions, their quantum numbers and spectra (ordered lists of fermions
//! with unique names). Physics only depends on the multiset of quantum
//! numbers; the order is kept so that derived artifacts are reproducible.

use crate::error::{Result, ScanError};
use crate::rational::{q, ExactRational};
use crate::representation::{Su2Rep, Su3Rep};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Handedness sign. Left-handed is +1, right-handed is −1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Chirality {
    // Declared right first so that the derived order matches the sign.
    Right,
    Left,
}

impl Chirality {
    pub fn sign(self) -> i64 {
        match self {
            Chirality::Left => 1,
            Chirality::Right => -1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Chirality::Left => Chirality::Right,
            Chirality::Right => Chirality::Left,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Chirality::Left => "L",
            Chirality::Right => "R",
        }
    }
}

impl TryFrom<i8> for Chirality {
    type Error = ScanError;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            1 => Ok(Chirality::Left),
            -1 => Ok(Chirality::Right),
            other => Err(ScanError::invalid(
                "chirality",
                format!("chirality must be +1 or -1, got {}", other),
            )),
        }
    }
}

impl From<Chirality> for i8 {
    fn from(chirality: Chirality) -> i8 {
        chirality.sign() as i8
    }
}

impl fmt::Display for Chirality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.sign())
    }
}

/// The gauge quantum numbers of one fermion, without its name.
///
/// Ordered lexicographically on (SU(3) dimension, SU(2) dimension,
/// hypercharge, chirality sign); serialised as
/// `[su3_rep, su2_rep, "hypercharge", chirality]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuantumNumbers(pub Su3Rep, pub Su2Rep, pub ExactRational, pub Chirality);

impl QuantumNumbers {
    pub fn su3(&self) -> Su3Rep {
        self.0
    }

    pub fn su2(&self) -> Su2Rep {
        self.1
    }

    pub fn hypercharge(&self) -> &ExactRational {
        &self.2
    }

    pub fn chirality(&self) -> Chirality {
        self.3
    }
}

impl fmt::Display for QuantumNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})_{} × {}", self.0, self.1, self.2, self.3)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FermionFields")]
pub struct Fermion {
    pub name: String,
    pub su3_rep: Su3Rep,
    pub su2_rep: Su2Rep,
    pub hypercharge: ExactRational,
    pub chirality: Chirality,
    pub generations: u32,
}

/// Deserialised shape of a [`Fermion`], checked before it becomes one.
#[derive(Deserialize)]
struct FermionFields {
    name: String,
    su3_rep: Su3Rep,
    su2_rep: Su2Rep,
    hypercharge: ExactRational,
    chirality: Chirality,
    #[serde(default = "default_generations")]
    generations: u32,
}

fn default_generations() -> u32 {
    1
}

impl TryFrom<FermionFields> for Fermion {
    type Error = ScanError;

    fn try_from(fields: FermionFields) -> Result<Self> {
        Fermion::new(fields.name, fields.su3_rep, fields.su2_rep, fields.hypercharge, fields.chirality)
            .with_generations(fields.generations)
    }
}

impl Fermion {
    /// One generation of a fermion with already-validated quantum numbers.
    pub fn new(
        name: impl Into<String>,
        su3_rep: Su3Rep,
        su2_rep: Su2Rep,
        hypercharge: ExactRational,
        chirality: Chirality,
    ) -> Self {
        Self {
            name: name.into(),
            su3_rep,
            su2_rep,
            hypercharge,
            chirality,
            generations: 1,
        }
    }

    /// Build from raw catalog ids, as found in rule files.
    pub fn from_ids(
        name: impl Into<String>,
        su3_id: u32,
        su2_id: u32,
        hypercharge: ExactRational,
        chirality: i8,
    ) -> Result<Self> {
        Ok(Self::new(
            name,
            Su3Rep::from_id(su3_id)?,
            Su2Rep::from_id(su2_id)?,
            hypercharge,
            Chirality::try_from(chirality)?,
        ))
    }

    pub fn with_generations(mut self, generations: u32) -> Result<Self> {
        if generations == 0 {
            return Err(ScanError::invalid(
                self.name.as_str(),
                "generations must be positive",
            ));
        }
        self.generations = generations;
        Ok(self)
    }

    pub fn quantum_numbers(&self) -> QuantumNumbers {
        QuantumNumbers(self.su3_rep, self.su2_rep, self.hypercharge.clone(), self.chirality)
    }

    /// Vector-like partner: identical gauge quantum numbers, flipped chirality.
    pub fn vector_like_partner(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chirality: self.chirality.flipped(),
            ..self.clone()
        }
    }

    /// Number of Weyl components: colour × isospin dimension.
    pub fn multiplicity(&self) -> i64 {
        i64::from(self.su3_rep.dim()) * i64::from(self.su2_rep.dim())
    }
}

impl fmt::Display for Fermion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ({}, {})_{} × {} gen",
            self.name, self.su3_rep, self.su2_rep, self.hypercharge, self.generations
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Fermion>", into = "Vec<Fermion>")]
pub struct Spectrum {
    fermions: Vec<Fermion>,
}

impl Spectrum {
    pub fn new(fermions: Vec<Fermion>) -> Result<Self> {
        let mut spectrum = Self::default();
        for fermion in fermions {
            spectrum.push(fermion)?;
        }
        Ok(spectrum)
    }

    pub fn push(&mut self, fermion: Fermion) -> Result<()> {
        if self.fermion(&fermion.name).is_some() {
            return Err(ScanError::DuplicateFermionName(fermion.name));
        }
        self.fermions.push(fermion);
        Ok(())
    }

    /// Base ∪ additions, in that order.
    pub fn extended(&self, additions: &[Fermion]) -> Result<Self> {
        let mut names: HashSet<&str> = self.fermions.iter().map(|f| f.name.as_str()).collect();
        for fermion in additions {
            if !names.insert(fermion.name.as_str()) {
                return Err(ScanError::DuplicateFermionName(fermion.name.clone()));
            }
        }
        let mut fermions = Vec::with_capacity(self.fermions.len() + additions.len());
        fermions.extend_from_slice(&self.fermions);
        fermions.extend_from_slice(additions);
        Ok(Self { fermions })
    }

    pub fn fermion(&self, name: &str) -> Option<&Fermion> {
        self.fermions.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fermion> {
        self.fermions.iter()
    }

    pub fn fermions(&self) -> &[Fermion] {
        &self.fermions
    }

    pub fn len(&self) -> usize {
        self.fermions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fermions.is_empty()
    }

    /// Quantum numbers of every fermion, sorted. Two spectra with the same
    /// physical content have the same fingerprint.
    pub fn fingerprint(&self) -> Vec<QuantumNumbers> {
        let mut entries: Vec<QuantumNumbers> = self
            .fermions
            .iter()
            .flat_map(|f| std::iter::repeat(f.quantum_numbers()).take(f.generations as usize))
            .collect();
        entries.sort();
        entries
    }

    /// One generation of the Standard Model.
    pub fn standard_model(include_right_neutrino: bool) -> Self {
        use Chirality::{Left, Right};

        let mut fermions = vec![
            Fermion::new("Q_L", Su3Rep::Triplet, Su2Rep::Doublet, q(1, 6), Left),
            Fermion::new("u_R", Su3Rep::Triplet, Su2Rep::Singlet, q(2, 3), Right),
            Fermion::new("d_R", Su3Rep::Triplet, Su2Rep::Singlet, q(-1, 3), Right),
            Fermion::new("L_L", Su3Rep::Singlet, Su2Rep::Doublet, q(-1, 2), Left),
            Fermion::new("e_R", Su3Rep::Singlet, Su2Rep::Singlet, q(-1, 1), Right),
        ];
        if include_right_neutrino {
            fermions.push(Fermion::new("nu_R", Su3Rep::Singlet, Su2Rep::Singlet, q(0, 1), Right));
        }
        Self { fermions }
    }
}

impl TryFrom<Vec<Fermion>> for Spectrum {
    type Error = ScanError;

    fn try_from(fermions: Vec<Fermion>) -> Result<Self> {
        Spectrum::new(fermions)
    }
}

impl From<Spectrum> for Vec<Fermion> {
    fn from(spectrum: Spectrum) -> Vec<Fermion> {
        spectrum.fermions
    }
}

impl<'a> IntoIterator for &'a Spectrum {
    type Item = &'a Fermion;
    type IntoIter = std::slice::Iter<'a, Fermion>;

    fn into_iter(self) -> Self::IntoIter {
        self.fermions.iter()
    }
}
