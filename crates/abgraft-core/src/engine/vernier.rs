use super::graft::{GraftPlan, ResidueSource};
use crate::core::models::chain::NumberedChain;
use crate::core::models::position::Position;
use std::collections::BTreeSet;
use tracing::debug;

/// Restores parental residues at Vernier-zone framework positions.
///
/// Only positions currently sourced from the germline are touched, and only
/// where the parental chain has a residue that differs from it.
pub fn backmutate(
    mut plan: GraftPlan,
    original: &NumberedChain,
    vernier_positions: &BTreeSet<Position>,
    enabled: bool,
) -> GraftPlan {
    if !enabled {
        return plan;
    }
    let prefix = plan.chain_type().prefix();
    for entry in plan.entries_mut() {
        if entry.source != ResidueSource::Germline || !vernier_positions.contains(&entry.position) {
            continue;
        }
        let Some(parental) = original.get(entry.position) else {
            continue;
        };
        if entry.residue != Some(parental) {
            debug!(
                position = %entry.position.label(prefix),
                germline = ?entry.residue,
                parental = %parental,
                "Backmutating Vernier residue."
            );
            entry.residue = Some(parental);
            entry.source = ResidueSource::InputVernier;
        }
    }
    plan
}
