//! Provides high-level, user-facing procedures for antibody humanization.
//!
//! This module is the primary entry point for end users of the library. It
//! composes the stages of the [`crate::engine`] layer into a complete run that
//! takes raw heavy and/or light chain sequences and returns the humanized
//! chains together with their provenance.
//!
//! # Workflows
//!
//! - [`humanize`] - CDR grafting onto the closest human germline, with optional
//!   Vernier backmutation and oracle-driven refinement
pub mod humanize;
