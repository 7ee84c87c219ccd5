use super::anchors::{self, Anchors};
use super::error::NumberingError;
use super::layout::{SchemeLayout, SegmentId};
use crate::core::models::chain::{ChainType, NumberedChain, Residue, is_standard_amino_acid};
use crate::core::models::position::Position;
use crate::core::models::scheme::Scheme;
use tracing::{trace, warn};

/// Shortest sequence accepted as a variable domain.
pub const MIN_DOMAIN_LENGTH: usize = 70;
/// Shortest sequence accepted as a J gene.
pub const MIN_J_GENE_LENGTH: usize = 8;

/// Assigns scheme positions to a raw variable-domain sequence.
pub trait Numberer: Send + Sync {
    /// Numbers `sequence`, identifying the chain type along the way.
    fn number(&self, sequence: &str, scheme: Scheme) -> Result<NumberedChain, NumberingError>;

    /// Numbers `sequence` as a chain of the given type.
    fn number_as(
        &self,
        sequence: &str,
        scheme: Scheme,
        chain_type: ChainType,
    ) -> Result<NumberedChain, NumberingError> {
        let chain = self.number(sequence, scheme)?;
        if chain.chain_type() != chain_type {
            return Err(NumberingError::ChainTypeMismatch {
                expected: chain_type.as_str(),
                found: chain.chain_type(),
            });
        }
        Ok(chain)
    }
}

/// Numbers sequences by locating the conserved anchors of the domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorNumberer;

impl AnchorNumberer {
    pub fn new() -> Self {
        Self
    }

    fn number_with(
        &self,
        sequence: &str,
        scheme: Scheme,
        forced: Option<ChainType>,
    ) -> Result<NumberedChain, NumberingError> {
        let seq = normalize(sequence, MIN_DOMAIN_LENGTH)?;
        let anchors = anchors::find_anchors(&seq)?;
        let chain_type = forced.unwrap_or_else(|| anchors::detect_chain_type(&seq, &anchors));
        trace!(?anchors, %chain_type, %scheme, "Located numbering anchors.");

        let layout = SchemeLayout::new(scheme, chain_type);
        let residues = label_domain(&seq, &anchors, &layout)?;
        NumberedChain::new(scheme, chain_type, residues)
            .map_err(|e| NumberingError::InvalidOrder(e.to_string()))
    }
}

impl Numberer for AnchorNumberer {
    fn number(&self, sequence: &str, scheme: Scheme) -> Result<NumberedChain, NumberingError> {
        self.number_with(sequence, scheme, None)
    }

    fn number_as(
        &self,
        sequence: &str,
        scheme: Scheme,
        chain_type: ChainType,
    ) -> Result<NumberedChain, NumberingError> {
        self.number_with(sequence, scheme, Some(chain_type))
    }
}

/// Numbers a J gene: the motif residue takes the scheme's J anchor position
/// and the residues after it fill FR4 from its first slot. Residues in front
/// of the motif belong to CDR3 and are left unnumbered.
pub fn number_j_gene(
    sequence: &str,
    scheme: Scheme,
    chain_type: ChainType,
) -> Result<NumberedChain, NumberingError> {
    let seq = normalize(sequence, MIN_J_GENE_LENGTH)?;
    let motif = anchors::find_j_motif(&seq, 0, seq.len())
        .ok_or(NumberingError::MissingAnchor { anchor: "J-region motif" })?;
    let layout = SchemeLayout::new(scheme, chain_type);

    let mut residues = vec![Residue {
        position: layout.anchor_positions().j_motif,
        amino_acid: seq[motif] as char,
    }];
    let tail = &seq[motif + 1..];
    let (labels, dropped) = layout
        .segment(SegmentId::Tail)
        .label_from_start(tail.len(), false);
    if dropped > 0 {
        warn!(dropped, "Dropping J-gene residues past the end of the scheme.");
    }
    push_labeled(&mut residues, &labels, tail);

    NumberedChain::new(scheme, chain_type, residues)
        .map_err(|e| NumberingError::InvalidOrder(e.to_string()))
}

fn normalize(sequence: &str, minimum: usize) -> Result<Vec<u8>, NumberingError> {
    let mut seq = Vec::with_capacity(sequence.len());
    for (index, character) in sequence.trim().chars().enumerate() {
        let upper = character.to_ascii_uppercase();
        if !is_standard_amino_acid(upper) {
            return Err(NumberingError::UnsupportedCharacter { character, index });
        }
        seq.push(upper as u8);
    }
    if seq.len() < minimum {
        return Err(NumberingError::TooShort {
            length: seq.len(),
            minimum,
        });
    }
    Ok(seq)
}

fn label_domain(
    seq: &[u8],
    anchors: &Anchors,
    layout: &SchemeLayout,
) -> Result<Vec<Residue>, NumberingError> {
    let mut residues = Vec::with_capacity(seq.len());

    let head = &seq[..=anchors.cys1];
    let (labels, dropped) = layout.segment(SegmentId::Head).label_to_end(head.len());
    if dropped > 0 {
        warn!(dropped, "Dropping leading residues in front of the first scheme position.");
    }
    push_labeled(&mut residues, &labels, &head[dropped..]);

    let first_loop = &seq[anchors.cys1 + 1..=anchors.trp];
    let labels = layout
        .segment(SegmentId::FirstLoop)
        .label_anchored(first_loop.len())?;
    push_labeled(&mut residues, &labels, first_loop);

    let second_loop = &seq[anchors.trp + 1..=anchors.cys2];
    let labels = layout
        .segment(SegmentId::SecondLoop)
        .label_anchored(second_loop.len())?;
    push_labeled(&mut residues, &labels, second_loop);

    let Some(j) = anchors.j_motif else {
        // V genes end inside CDR3; there is no motif to anchor against.
        let rest = &seq[anchors.cys2 + 1..];
        let (labels, dropped) = layout
            .segment(SegmentId::ThirdLoop)
            .label_from_start(rest.len(), true);
        if dropped > 0 {
            warn!(dropped, "Dropping trailing residues beyond the unanchored CDR3 slots.");
        }
        push_labeled(&mut residues, &labels, rest);
        return Ok(residues);
    };

    let third_loop = &seq[anchors.cys2 + 1..=j];
    let labels = layout
        .segment(SegmentId::ThirdLoop)
        .label_anchored(third_loop.len())?;
    push_labeled(&mut residues, &labels, third_loop);

    let tail = &seq[j + 1..];
    let (labels, dropped) = layout
        .segment(SegmentId::Tail)
        .label_from_start(tail.len(), false);
    if dropped > 0 {
        warn!(dropped, "Dropping trailing residues past the last scheme position.");
    }
    push_labeled(&mut residues, &labels, tail);

    Ok(residues)
}

fn push_labeled(residues: &mut Vec<Residue>, labels: &[Position], seq: &[u8]) {
    residues.extend(labels.iter().zip(seq).map(|(&position, &aa)| Residue {
        position,
        amino_acid: aa as char,
    }));
}
