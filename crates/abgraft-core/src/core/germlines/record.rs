use crate::core::models::chain::{ChainType, NumberedChain};
use crate::core::models::position::Position;
use crate::core::models::scheme::Scheme;
use crate::core::numbering::engine::{Numberer, number_j_gene};
use crate::core::numbering::error::NumberingError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GeneSegment {
    V,
    J,
}

impl fmt::Display for GeneSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GeneSegment::V => "V",
            GeneSegment::J => "J",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Germline '{id}' has no {scheme} numbering")]
pub struct MissingNumberingError {
    pub id: String,
    pub scheme: Scheme,
}

/// One reference gene with its numbering under each scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GermlineRecord {
    id: String,
    chain_type: ChainType,
    segment: GeneSegment,
    sequence: String,
    numbered: HashMap<Scheme, NumberedChain>,
}

impl GermlineRecord {
    /// Numbers `sequence` under every scheme. V genes go through `numberer`
    /// pinned to `chain_type`; J genes are labelled from their motif.
    pub fn new(
        id: impl Into<String>,
        chain_type: ChainType,
        segment: GeneSegment,
        sequence: impl Into<String>,
        numberer: &dyn Numberer,
    ) -> Result<Self, NumberingError> {
        let sequence = sequence.into().trim().to_ascii_uppercase();
        let mut numbered = HashMap::with_capacity(Scheme::ALL.len());
        for scheme in Scheme::ALL {
            let chain = match segment {
                GeneSegment::V => numberer.number_as(&sequence, scheme, chain_type)?,
                GeneSegment::J => number_j_gene(&sequence, scheme, chain_type)?,
            };
            numbered.insert(scheme, chain);
        }
        Ok(Self {
            id: id.into(),
            chain_type,
            segment,
            sequence,
            numbered,
        })
    }

    /// Builds a record from numberings computed elsewhere. The chain type is
    /// taken from the caller, not from the chains.
    pub fn from_numbered(
        id: impl Into<String>,
        chain_type: ChainType,
        segment: GeneSegment,
        numbered: impl IntoIterator<Item = NumberedChain>,
    ) -> Self {
        let numbered: HashMap<Scheme, NumberedChain> =
            numbered.into_iter().map(|c| (c.scheme(), c)).collect();
        let sequence = numbered
            .values()
            .next()
            .map(NumberedChain::sequence)
            .unwrap_or_default();
        Self {
            id: id.into(),
            chain_type,
            segment,
            sequence,
            numbered,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gene name without the allele suffix (`IGHV3-23*01` -> `IGHV3-23`).
    pub fn gene(&self) -> &str {
        self.id.split('*').next().unwrap_or(&self.id)
    }

    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    pub fn segment(&self) -> GeneSegment {
        self.segment
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn numbering(&self, scheme: Scheme) -> Option<&NumberedChain> {
        self.numbered.get(&scheme)
    }

    pub fn try_numbering(&self, scheme: Scheme) -> Result<&NumberedChain, MissingNumberingError> {
        self.numbering(scheme).ok_or_else(|| MissingNumberingError {
            id: self.id.clone(),
            scheme,
        })
    }
}

/// A V gene and an optional J gene merged position by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GermlineTemplate {
    v_id: String,
    j_id: Option<String>,
    scheme: Scheme,
    residues: BTreeMap<Position, char>,
}

impl GermlineTemplate {
    /// J residues win where both genes label the same position.
    pub fn new(
        v: &GermlineRecord,
        j: Option<&GermlineRecord>,
        scheme: Scheme,
    ) -> Result<Self, MissingNumberingError> {
        let mut residues: BTreeMap<Position, char> = v
            .try_numbering(scheme)?
            .residues()
            .iter()
            .map(|r| (r.position, r.amino_acid))
            .collect();
        if let Some(j) = j {
            residues.extend(
                j.try_numbering(scheme)?
                    .residues()
                    .iter()
                    .map(|r| (r.position, r.amino_acid)),
            );
        }
        Ok(Self {
            v_id: v.id().to_string(),
            j_id: j.map(|j| j.id().to_string()),
            scheme,
            residues,
        })
    }

    pub fn v_id(&self) -> &str {
        &self.v_id
    }

    pub fn j_id(&self) -> Option<&str> {
        self.j_id.as_deref()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn get(&self, position: Position) -> Option<char> {
        self.residues.get(&position).copied()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.residues.contains_key(&position)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.residues.keys().copied()
    }

    pub fn germline_sequence(&self) -> String {
        self.residues.values().collect()
    }
}
