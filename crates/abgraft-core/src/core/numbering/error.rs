use crate::core::models::chain::ChainType;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberingError {
    #[error("Sequence is too short for a variable domain ({length} residues, at least {minimum} required)")]
    TooShort { length: usize, minimum: usize },

    #[error("Unsupported character '{character}' at sequence index {index}")]
    UnsupportedCharacter { character: char, index: usize },

    #[error("Conserved {anchor} anchor not found")]
    MissingAnchor { anchor: &'static str },

    #[error("Segment '{segment}' has {length} residues but the scheme can label at most {capacity}")]
    SegmentTooLong {
        segment: &'static str,
        length: usize,
        capacity: usize,
    },

    #[error("Segment '{segment}' has {length} residues but the scheme needs at least {required}")]
    SegmentTooShort {
        segment: &'static str,
        length: usize,
        required: usize,
    },

    #[error("Expected a {expected} chain but the sequence was identified as {found}")]
    ChainTypeMismatch {
        expected: &'static str,
        found: ChainType,
    },

    #[error("Numbering produced invalid position order: {0}")]
    InvalidOrder(String),
}
