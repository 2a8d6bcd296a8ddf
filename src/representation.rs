//! Representation Theory Catalogs
//!
//! Fixed tables of the supported SU(3) and SU(2) representations and their
//! group-theory constants. Nothing here is computed at runtime:
//! - dimension
//! - Dynkin index T(R)
//! - cubic anomaly coefficient A(R)
//!
//! Representations are identified by their dimension, which is how rule files
//! and exports refer to them.

use crate::error::{Result, ScanError};
use crate::rational::{q, ExactRational};
use serde::{Deserialize, Serialize};
use std::fmt;

const CONTEXT: &str = "representation";

/// Supported SU(3) (colour) representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Su3Rep {
    Singlet,
    Triplet,
    Sextet,
    Octet,
}

impl Su3Rep {
    pub const ALL: [Su3Rep; 4] = [Su3Rep::Singlet, Su3Rep::Triplet, Su3Rep::Sextet, Su3Rep::Octet];

    pub fn from_id(id: u32) -> Result<Self> {
        match id {
            1 => Ok(Su3Rep::Singlet),
            3 => Ok(Su3Rep::Triplet),
            6 => Ok(Su3Rep::Sextet),
            8 => Ok(Su3Rep::Octet),
            _ => Err(ScanError::UnsupportedRepresentation {
                config: CONTEXT.to_string(),
                group: "SU(3)".to_string(),
                id,
            }),
        }
    }

    pub fn dim(self) -> u32 {
        match self {
            Su3Rep::Singlet => 1,
            Su3Rep::Triplet => 3,
            Su3Rep::Sextet => 6,
            Su3Rep::Octet => 8,
        }
    }

    /// Dynkin index T(R), normalised so that T(fundamental) = 1/2.
    pub fn dynkin_index(self) -> ExactRational {
        match self {
            Su3Rep::Singlet => q(0, 1),
            Su3Rep::Triplet => q(1, 2),
            Su3Rep::Sextet => q(5, 2),
            Su3Rep::Octet => q(3, 1),
        }
    }

    /// Cubic anomaly coefficient A(R), normalised so that A(fundamental) = 1.
    /// Real representations (singlet, adjoint) have A = 0.
    pub fn cubic_anomaly(self) -> ExactRational {
        match self {
            Su3Rep::Singlet => q(0, 1),
            Su3Rep::Triplet => q(1, 1),
            Su3Rep::Sextet => q(7, 1),
            Su3Rep::Octet => q(0, 1),
        }
    }
}

impl TryFrom<u32> for Su3Rep {
    type Error = ScanError;

    fn try_from(id: u32) -> Result<Self> {
        Su3Rep::from_id(id)
    }
}

impl From<Su3Rep> for u32 {
    fn from(rep: Su3Rep) -> u32 {
        rep.dim()
    }
}

impl fmt::Display for Su3Rep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dim())
    }
}

/// Supported SU(2) (weak isospin) representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Su2Rep {
    Singlet,
    Doublet,
    Triplet,
}

impl Su2Rep {
    pub const ALL: [Su2Rep; 3] = [Su2Rep::Singlet, Su2Rep::Doublet, Su2Rep::Triplet];

    pub fn from_id(id: u32) -> Result<Self> {
        match id {
            1 => Ok(Su2Rep::Singlet),
            2 => Ok(Su2Rep::Doublet),
            3 => Ok(Su2Rep::Triplet),
            _ => Err(ScanError::UnsupportedRepresentation {
                config: CONTEXT.to_string(),
                group: "SU(2)".to_string(),
                id,
            }),
        }
    }

    pub fn dim(self) -> u32 {
        match self {
            Su2Rep::Singlet => 1,
            Su2Rep::Doublet => 2,
            Su2Rep::Triplet => 3,
        }
    }

    pub fn dynkin_index(self) -> ExactRational {
        match self {
            Su2Rep::Singlet => q(0, 1),
            Su2Rep::Doublet => q(1, 2),
            Su2Rep::Triplet => q(2, 1),
        }
    }

    /// SU(2) has no cubic Casimir: every representation is pseudo-real or real.
    pub fn cubic_anomaly(self) -> ExactRational {
        ExactRational::zero()
    }
}

impl TryFrom<u32> for Su2Rep {
    type Error = ScanError;

    fn try_from(id: u32) -> Result<Self> {
        Su2Rep::from_id(id)
    }
}

impl From<Su2Rep> for u32 {
    fn from(rep: Su2Rep) -> u32 {
        rep.dim()
    }
}

impl fmt::Display for Su2Rep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dim())
    }
}
