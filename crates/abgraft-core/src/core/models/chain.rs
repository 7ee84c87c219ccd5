use super::position::Position;
use super::scheme::Scheme;
use phf::{Set, phf_set};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static STANDARD_AMINO_ACIDS: Set<char> = phf_set! {
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W', 'Y',
};

pub fn is_standard_amino_acid(symbol: char) -> bool {
    STANDARD_AMINO_ACIDS.contains(&symbol)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    Heavy,
    Kappa,
    Lambda,
}

impl ChainType {
    pub fn is_heavy(&self) -> bool {
        matches!(self, ChainType::Heavy)
    }

    pub fn is_light(&self) -> bool {
        !self.is_heavy()
    }

    /// The letter used in front of position labels (`H` or `L`).
    pub fn prefix(&self) -> char {
        if self.is_heavy() { 'H' } else { 'L' }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Heavy => "heavy",
            ChainType::Kappa => "kappa",
            ChainType::Lambda => "lambda",
        }
    }

    /// Short variable-domain name used in reports (`VH` or `VL`).
    pub fn domain_name(&self) -> &'static str {
        if self.is_heavy() { "VH" } else { "VL" }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Invalid chain type '{0}'. Expected heavy, kappa or lambda")]
pub struct ParseChainTypeError(pub String);

impl FromStr for ChainType {
    type Err = ParseChainTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heavy" | "h" | "igh" => Ok(ChainType::Heavy),
            "kappa" | "k" | "igk" => Ok(ChainType::Kappa),
            "lambda" | "l" | "igl" => Ok(ChainType::Lambda),
            _ => Err(ParseChainTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Residue {
    pub position: Position,
    pub amino_acid: char,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Position {position} does not strictly follow {previous}")]
pub struct ChainOrderError {
    pub previous: Position,
    pub position: Position,
}

/// A variable-domain sequence with one scheme position per residue.
///
/// Positions are strictly ascending and unique; this is checked on
/// construction and the chain is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedChain {
    scheme: Scheme,
    chain_type: ChainType,
    residues: Vec<Residue>,
}

impl NumberedChain {
    pub fn new(
        scheme: Scheme,
        chain_type: ChainType,
        residues: Vec<Residue>,
    ) -> Result<Self, ChainOrderError> {
        if let Some(pair) = residues
            .windows(2)
            .find(|pair| pair[0].position >= pair[1].position)
        {
            return Err(ChainOrderError {
                previous: pair[0].position,
                position: pair[1].position,
            });
        }
        Ok(Self {
            scheme,
            chain_type,
            residues,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.residues.iter().map(|r| r.position)
    }

    pub fn get(&self, position: Position) -> Option<char> {
        self.residues
            .binary_search_by(|r| r.position.cmp(&position))
            .ok()
            .map(|idx| self.residues[idx].amino_acid)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.get(position).is_some()
    }

    pub fn sequence(&self) -> String {
        self.residues.iter().map(|r| r.amino_acid).collect()
    }

    pub fn label(&self, position: Position) -> String {
        position.label(self.chain_type.prefix())
    }
}
