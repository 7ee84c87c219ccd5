//! # Numbering Module
//!
//! Assigns scheme positions (Kabat, Chothia, IMGT, AHo) to raw variable-domain
//! sequences.
//!
//! The [`engine::Numberer`] trait is the only capability downstream stages
//! depend on, so a profile-alignment numberer can be dropped in without
//! touching them. The built-in [`engine::AnchorNumberer`] locates the four
//! conserved anchors of a variable domain (first cysteine, conserved
//! tryptophan, second cysteine, J-region `[WF]G.G` motif) and labels the
//! segments between them with the per-scheme layouts in [`layout`].

pub(crate) mod anchors;
pub mod engine;
pub mod error;
pub mod layout;
