use super::error::NumberingError;
use crate::core::models::chain::ChainType;
use std::ops::RangeInclusive;

// Offsets (0-based) between consecutive anchors, wide enough for the longest
// human CDR1 and CDR2 loops.
const CYS1_SEARCH: RangeInclusive<usize> = 15..=40;
const TRP_OFFSET: RangeInclusive<usize> = 10..=22;
const CYS2_OFFSET: RangeInclusive<usize> = 45..=75;
const J_MOTIF_OFFSET: RangeInclusive<usize> = 4..=50;

// Lambda frameworks put the first cysteine one residue earlier than kappa.
const LAMBDA_CYS1_INDEX: usize = 21;

/// Sequence indices of the conserved residues of a variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Anchors {
    pub cys1: usize,
    pub trp: usize,
    pub cys2: usize,
    pub j_motif: Option<usize>,
}

pub(crate) fn find_anchors(seq: &[u8]) -> Result<Anchors, NumberingError> {
    let mut missing = "first cysteine";
    for cys1 in candidates(seq, 0, CYS1_SEARCH, b'C') {
        missing = "conserved tryptophan";
        let Some(trp) = find_trp(seq, cys1) else {
            continue;
        };
        missing = "second cysteine";
        let Some(cys2) = find_cys2(seq, trp) else {
            continue;
        };
        return Ok(Anchors {
            cys1,
            trp,
            cys2,
            j_motif: find_j_motif(seq, cys2 + J_MOTIF_OFFSET.start(), cys2 + J_MOTIF_OFFSET.end()),
        });
    }
    Err(NumberingError::MissingAnchor { anchor: missing })
}

/// Finds the first `[WF]G.G` motif starting within `from..=to`.
pub(crate) fn find_j_motif(seq: &[u8], from: usize, to: usize) -> Option<usize> {
    if seq.len() < from + 4 {
        return None;
    }
    let last_start = to.min(seq.len() - 4);
    (from..=last_start).find(|&i| {
        matches!(seq[i], b'W' | b'F') && seq[i + 1] == b'G' && seq[i + 3] == b'G'
    })
}

pub(crate) fn detect_chain_type(seq: &[u8], anchors: &Anchors) -> ChainType {
    let heavy = match anchors.j_motif {
        Some(j) => seq[j] == b'W',
        None => {
            matches!(seq.get(anchors.trp + 1), Some(b'V' | b'I' | b'M'))
                && seq.get(anchors.trp + 2) == Some(&b'R')
        }
    };
    if heavy {
        return ChainType::Heavy;
    }

    let tail = anchors
        .j_motif
        .map(|j| &seq[j..seq.len().min(j + 12)])
        .unwrap_or(&[]);
    if contains(tail, b"TVL") {
        ChainType::Lambda
    } else if contains(tail, b"IK") {
        ChainType::Kappa
    } else if anchors.cys1 == LAMBDA_CYS1_INDEX {
        ChainType::Lambda
    } else {
        ChainType::Kappa
    }
}

fn candidates(
    seq: &[u8],
    base: usize,
    offsets: RangeInclusive<usize>,
    residue: u8,
) -> impl Iterator<Item = usize> + '_ {
    offsets
        .map(move |offset| base + offset)
        .take_while(move |&i| i < seq.len())
        .filter(move |&i| seq[i] == residue)
}

fn find_trp(seq: &[u8], cys1: usize) -> Option<usize> {
    let mut fallback = None;
    for i in candidates(seq, cys1, TRP_OFFSET, b'W') {
        // W-x-x-Q: WVRQ / WIRQ in heavy chains, WYQQ / WYLQ in light chains.
        if seq.get(i + 3) == Some(&b'Q') {
            return Some(i);
        }
        fallback.get_or_insert(i);
    }
    fallback
}

fn find_cys2(seq: &[u8], trp: usize) -> Option<usize> {
    let mut fallback = None;
    for i in candidates(seq, trp, CYS2_OFFSET, b'C') {
        if matches!(seq[i - 1], b'Y' | b'F') {
            return Some(i);
        }
        fallback.get_or_insert(i);
    }
    fallback
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
