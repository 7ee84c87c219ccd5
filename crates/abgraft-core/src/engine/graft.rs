use super::error::HumanizationError;
use crate::core::germlines::record::GermlineTemplate;
use crate::core::models::chain::{ChainOrderError, ChainType, NumberedChain, Residue};
use crate::core::models::position::Position;
use crate::core::models::scheme::Scheme;
use crate::core::numbering::layout::SchemeLayout;
use crate::core::regions::map::CdrDefinitionMap;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// Where the residue at a plan position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueSource {
    Germline,
    InputCdr,
    InputVernier,
    InputUnmappedFramework,
    Refined,
    /// Germline-only label inside a CDR loop; contributes no residue.
    Omitted,
}

impl ResidueSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResidueSource::Germline => "germline",
            ResidueSource::InputCdr => "input-CDR",
            ResidueSource::InputVernier => "input-vernier",
            ResidueSource::InputUnmappedFramework => "input-unmapped-framework",
            ResidueSource::Refined => "refined",
            ResidueSource::Omitted => "omitted",
        }
    }
}

impl fmt::Display for ResidueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanEntry {
    pub position: Position,
    pub source: ResidueSource,
    /// Residue emitted at this position, `None` for a gap.
    pub residue: Option<char>,
    pub germline: Option<char>,
    pub original: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraftPlan {
    chain_type: ChainType,
    scheme: Scheme,
    template: GermlineTemplate,
    entries: Vec<PlanEntry>,
}

impl GraftPlan {
    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn template(&self) -> &GermlineTemplate {
        &self.template
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [PlanEntry] {
        &mut self.entries
    }

    pub fn get(&self, position: Position) -> Option<&PlanEntry> {
        self.entries
            .binary_search_by(|e| e.position.cmp(&position))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn sequence(&self) -> String {
        self.entries.iter().filter_map(|e| e.residue).collect()
    }

    /// Structural warnings: input framework labels without a germline counterpart.
    pub fn warnings(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.source == ResidueSource::InputUnmappedFramework)
            .map(|e| {
                format!(
                    "{} has no germline counterpart in {}; kept input residue {}",
                    e.position.label(self.chain_type.prefix()),
                    self.template.v_id(),
                    e.residue.unwrap_or('-')
                )
            })
            .collect()
    }

    pub fn humanized_chain(&self) -> Result<NumberedChain, ChainOrderError> {
        let residues = self
            .entries
            .iter()
            .filter_map(|e| {
                e.residue.map(|amino_acid| Residue {
                    position: e.position,
                    amino_acid,
                })
            })
            .collect();
        NumberedChain::new(self.scheme, self.chain_type, residues)
    }

    /// Maps a refined sequence, residue by residue, onto the plan's occupied
    /// positions. Changed residues are marked [`ResidueSource::Refined`].
    pub fn apply_refined(
        &self,
        refined: &str,
        iterations: usize,
    ) -> Result<Self, HumanizationError> {
        let refined: Vec<char> = refined.chars().collect();
        let occupied = self.entries.iter().filter(|e| e.residue.is_some()).count();
        if refined.len() != occupied {
            return Err(HumanizationError::Refinement {
                iteration: iterations,
                reason: format!(
                    "refined sequence has {} residues but the plan has {}",
                    refined.len(),
                    occupied
                ),
            });
        }

        let mut plan = self.clone();
        let mut next = refined.into_iter();
        for entry in plan.entries.iter_mut().filter(|e| e.residue.is_some()) {
            let Some(aa) = next.next() else { break };
            if entry.residue != Some(aa) {
                entry.residue = Some(aa);
                entry.source = ResidueSource::Refined;
            }
        }
        Ok(plan)
    }
}

/// Builds the per-position graft of `chain` onto `template`.
///
/// CDR labels of the input keep the input residue. Every other label the
/// template carries takes the germline residue, except template-only labels
/// inside a CDR loop, which are omitted. Input framework labels missing from
/// the template keep the input residue and are reported as warnings.
pub fn graft(
    chain: &NumberedChain,
    template: GermlineTemplate,
    cdr_positions: &BTreeSet<Position>,
    map: &CdrDefinitionMap,
) -> Result<GraftPlan, HumanizationError> {
    let anchors = SchemeLayout::new(chain.scheme(), chain.chain_type()).anchor_positions();
    if let Some(missing) = anchors
        .framework()
        .into_iter()
        .find(|&p| !template.contains(p))
    {
        return Err(HumanizationError::IncompleteGermline {
            id: template.v_id().to_string(),
            position: missing.label(chain.chain_type().prefix()),
        });
    }

    let labels: BTreeSet<Position> = chain.positions().chain(template.positions()).collect();
    let mut entries = Vec::with_capacity(labels.len());
    for position in labels {
        let original = chain.get(position);
        let germline = template.get(position);
        let (source, residue) = match (original, germline) {
            (Some(aa), _) if cdr_positions.contains(&position) => (ResidueSource::InputCdr, Some(aa)),
            (_, Some(_)) if map.is_cdr(position) => (ResidueSource::Omitted, None),
            (_, Some(aa)) => (ResidueSource::Germline, Some(aa)),
            (Some(aa), None) => {
                warn!(
                    position = %position.label(chain.chain_type().prefix()),
                    germline = template.v_id(),
                    "Framework position missing from germline; keeping input residue."
                );
                (ResidueSource::InputUnmappedFramework, Some(aa))
            }
            (None, None) => continue,
        };
        entries.push(PlanEntry {
            position,
            source,
            residue,
            germline,
            original,
        });
    }

    Ok(GraftPlan {
        chain_type: chain.chain_type(),
        scheme: chain.scheme(),
        template,
        entries,
    })
}
