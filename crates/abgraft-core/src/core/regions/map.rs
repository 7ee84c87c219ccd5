use super::tables::{Borders, REGION_BORDERS, VERNIER_POSITIONS};
use crate::core::models::chain::{ChainType, NumberedChain};
use crate::core::models::position::Position;
use crate::core::models::scheme::{CdrDefinition, Scheme};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Fr1,
    Cdr1,
    Fr2,
    Cdr2,
    Fr3,
    Cdr3,
    Fr4,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Fr1,
        Region::Cdr1,
        Region::Fr2,
        Region::Cdr2,
        Region::Fr3,
        Region::Cdr3,
        Region::Fr4,
    ];

    pub const CDRS: [Region; 3] = [Region::Cdr1, Region::Cdr2, Region::Cdr3];

    pub fn is_cdr(&self) -> bool {
        matches!(self, Region::Cdr1 | Region::Cdr2 | Region::Cdr3)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::Fr1 => "FR1",
            Region::Cdr1 => "CDR1",
            Region::Fr2 => "FR2",
            Region::Cdr2 => "CDR2",
            Region::Fr3 => "FR3",
            Region::Cdr3 => "CDR3",
            Region::Fr4 => "FR4",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("CDR definition '{definition}' is not available for the '{scheme}' numbering scheme")]
pub struct UnsupportedDefinitionError {
    pub scheme: Scheme,
    pub definition: CdrDefinition,
}

/// Region boundaries for one (scheme, definition, chain class) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdrDefinitionMap {
    scheme: Scheme,
    definition: CdrDefinition,
    heavy: bool,
    borders: &'static Borders,
    vernier: &'static [u16],
}

impl CdrDefinitionMap {
    pub fn lookup(
        scheme: Scheme,
        definition: CdrDefinition,
        chain_type: ChainType,
    ) -> Result<Self, UnsupportedDefinitionError> {
        let unsupported = UnsupportedDefinitionError { scheme, definition };
        let class = if chain_type.is_heavy() { "H" } else { "L" };

        let (borders_key, vernier_key) = match (scheme, definition) {
            (Scheme::Imgt, CdrDefinition::Imgt) => ("imgt".to_string(), format!("imgt_{class}")),
            (
                Scheme::Kabat | Scheme::Chothia,
                CdrDefinition::Kabat | CdrDefinition::Chothia | CdrDefinition::North,
            ) => (
                format!("{}_{class}", definition.as_str()),
                format!("kabat_{class}"),
            ),
            _ => return Err(unsupported),
        };

        let borders = REGION_BORDERS
            .get(borders_key.as_str())
            .ok_or_else(|| unsupported.clone())?;
        let vernier = VERNIER_POSITIONS
            .get(vernier_key.as_str())
            .copied()
            .ok_or(unsupported)?;

        Ok(Self {
            scheme,
            definition,
            heavy: chain_type.is_heavy(),
            borders,
            vernier,
        })
    }

    /// True when `lookup` succeeds for both chain classes.
    pub fn is_supported(scheme: Scheme, definition: CdrDefinition) -> bool {
        Self::lookup(scheme, definition, ChainType::Heavy).is_ok()
            && Self::lookup(scheme, definition, ChainType::Kappa).is_ok()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn definition(&self) -> CdrDefinition {
        self.definition
    }

    pub fn is_heavy(&self) -> bool {
        self.heavy
    }

    /// Region of a position by its number; insertions share their number's region.
    /// `None` for numbers outside 1..end.
    pub fn region_of(&self, position: Position) -> Option<Region> {
        let n = position.number;
        if n == 0 || n >= self.borders[6] {
            return None;
        }
        let index = self.borders[..6].iter().take_while(|&&b| n >= b).count();
        Some(Region::ALL[index])
    }

    pub fn is_cdr(&self, position: Position) -> bool {
        self.region_of(position).is_some_and(|r| r.is_cdr())
    }

    pub fn is_framework(&self, position: Position) -> bool {
        self.region_of(position).is_some_and(|r| !r.is_cdr())
    }

    /// Vernier-zone positions that are framework under this definition.
    pub fn vernier_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.vernier
            .iter()
            .map(|&n| Position::new(n))
            .filter(|&p| self.is_framework(p))
    }
}

impl NumberedChain {
    /// Residues of the chain that fall in `region` under `map`, in order.
    pub fn region_sequence(&self, map: &CdrDefinitionMap, region: Region) -> String {
        self.residues()
            .iter()
            .filter(|r| map.region_of(r.position) == Some(region))
            .map(|r| r.amino_acid)
            .collect()
    }
}
