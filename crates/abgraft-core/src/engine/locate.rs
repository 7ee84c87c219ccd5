use crate::core::models::chain::NumberedChain;
use crate::core::models::position::Position;
use crate::core::models::scheme::CdrDefinition;
use crate::core::regions::map::{CdrDefinitionMap, UnsupportedDefinitionError};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CdrLocation {
    /// Labels of the chain that fall inside a CDR loop.
    pub cdr_positions: BTreeSet<Position>,
    /// Framework Vernier-zone positions for the chain's scheme and class,
    /// whether or not the chain carries them.
    pub vernier_positions: BTreeSet<Position>,
}

pub fn locate(
    chain: &NumberedChain,
    definition: CdrDefinition,
) -> Result<CdrLocation, UnsupportedDefinitionError> {
    let map = CdrDefinitionMap::lookup(chain.scheme(), definition, chain.chain_type())?;
    Ok(locate_with(chain, &map))
}

pub fn locate_with(chain: &NumberedChain, map: &CdrDefinitionMap) -> CdrLocation {
    CdrLocation {
        cdr_positions: chain.positions().filter(|&p| map.is_cdr(p)).collect(),
        vernier_positions: map.vernier_positions().collect(),
    }
}
