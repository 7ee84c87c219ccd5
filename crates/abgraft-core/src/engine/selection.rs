use super::error::{ChainRole, HumanizationError};
use crate::core::germlines::record::{GeneSegment, GermlineRecord};
use crate::core::germlines::registry::GermlineSet;
use crate::core::models::chain::NumberedChain;
use crate::core::regions::map::{CdrDefinitionMap, Region};
use std::cmp::Ordering;
use tracing::debug;

/// Framework identity as an exact fraction, `matches / shared`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub matches: usize,
    pub shared: usize,
}

impl Identity {
    pub fn value(&self) -> f64 {
        if self.shared == 0 {
            0.0
        } else {
            self.matches as f64 / self.shared as f64
        }
    }

    // No shared labels counts as zero identity.
    fn ratio(&self) -> (usize, usize) {
        if self.shared == 0 {
            (0, 1)
        } else {
            (self.matches, self.shared)
        }
    }
}

impl PartialOrd for Identity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identity {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a_num, a_den) = self.ratio();
        let (b_num, b_den) = other.ratio();
        (a_num * b_den).cmp(&(b_num * a_den))
    }
}

/// Identity over the framework labels present in both chains. With
/// `region` set, only labels of that framework region count.
pub fn framework_identity(
    chain: &NumberedChain,
    germline: &NumberedChain,
    map: &CdrDefinitionMap,
    region: Option<Region>,
) -> Identity {
    let mut identity = Identity {
        matches: 0,
        shared: 0,
    };
    for residue in chain.residues() {
        let Some(r) = map.region_of(residue.position) else {
            continue;
        };
        if r.is_cdr() || region.is_some_and(|wanted| wanted != r) {
            continue;
        }
        if let Some(germline_aa) = germline.get(residue.position) {
            identity.shared += 1;
            if germline_aa == residue.amino_acid {
                identity.matches += 1;
            }
        }
    }
    identity
}

/// Picks the V germline for `chain`: the explicit identifier when given,
/// otherwise the candidate with the highest framework identity.
pub fn select<'g>(
    chain: &NumberedChain,
    explicit: Option<&str>,
    germlines: &'g GermlineSet,
    map: &CdrDefinitionMap,
) -> Result<&'g GermlineRecord, HumanizationError> {
    if let Some(id) = explicit {
        return lookup(chain, id, GeneSegment::V, germlines);
    }
    best_candidate(chain, GeneSegment::V, germlines, map, None).ok_or(
        HumanizationError::NoCandidateGermline {
            chain_type: chain.chain_type(),
            segment: GeneSegment::V,
        },
    )
}

/// Picks the J germline for `chain` by FR4 identity. `Ok(None)` when the set
/// holds no J genes for the chain type and no identifier was given.
pub fn select_j<'g>(
    chain: &NumberedChain,
    explicit: Option<&str>,
    germlines: &'g GermlineSet,
    map: &CdrDefinitionMap,
) -> Result<Option<&'g GermlineRecord>, HumanizationError> {
    if let Some(id) = explicit {
        return lookup(chain, id, GeneSegment::J, germlines).map(Some);
    }
    Ok(best_candidate(
        chain,
        GeneSegment::J,
        germlines,
        map,
        Some(Region::Fr4),
    ))
}

// An id outside the chain's class is unknown. A light id of the other light
// type is known but cannot template this chain.
fn lookup<'g>(
    chain: &NumberedChain,
    id: &str,
    segment: GeneSegment,
    germlines: &'g GermlineSet,
) -> Result<&'g GermlineRecord, HumanizationError> {
    let role = ChainRole::of(chain.chain_type());
    let record = germlines
        .get(id)
        .filter(|r| r.segment() == segment && role.accepts(r.chain_type()))
        .ok_or_else(|| HumanizationError::UnknownGermline {
            id: id.to_string(),
            role,
            segment,
        })?;
    if record.chain_type() != chain.chain_type() {
        return Err(HumanizationError::GermlineChainMismatch {
            id: id.to_string(),
            germline: record.chain_type(),
            chain: chain.chain_type(),
            segment,
        });
    }
    Ok(record)
}

fn best_candidate<'g>(
    chain: &NumberedChain,
    segment: GeneSegment,
    germlines: &'g GermlineSet,
    map: &CdrDefinitionMap,
    region: Option<Region>,
) -> Option<&'g GermlineRecord> {
    let mut best: Option<(&GermlineRecord, Identity)> = None;
    // Candidates arrive in identifier order; only a strictly better score
    // replaces the current best, so ties keep the smallest identifier.
    for record in germlines.candidates(chain.chain_type(), segment) {
        let Some(numbering) = record.numbering(chain.scheme()) else {
            continue;
        };
        let identity = framework_identity(chain, numbering, map, region);
        debug!(
            germline = record.id(),
            matches = identity.matches,
            shared = identity.shared,
            identity = identity.value(),
            "Scored germline candidate."
        );
        if best.is_none_or(|(_, top)| identity > top) {
            best = Some((record, identity));
        }
    }
    best.map(|(record, _)| record)
}
