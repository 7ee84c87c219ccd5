//! # Engine Module
//!
//! This module implements the CDR-grafting stages that turn one numbered
//! antibody chain into its humanized counterpart.
//!
//! ## Overview
//!
//! Every stage is a pure function over explicit inputs: the numbered chain,
//! the region map of the chosen CDR definition, and the read-only germline
//! set. No stage keeps state between chains, so a batch can be processed in
//! parallel by sharing the same reference data.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Scheme, definition, germline choices and options
//! - **CDR Location** ([`locate`]) - CDR and Vernier-zone positions of a chain
//! - **Germline Selection** ([`selection`]) - Explicit lookup or framework-identity ranking
//! - **Grafting** ([`graft`]) - Per-position merge of input CDRs into a germline template
//! - **Vernier Backmutation** ([`vernier`]) - Restores parental residues at Vernier positions
//! - **Refinement** ([`refine`]) - Chained calls into an injected mutation oracle
//! - **Assembly** ([`assemble`]) - Final sequences, mutation lists and report helpers
//! - **Progress Monitoring** ([`progress`]) - Progress callback plumbing
//! - **Error Handling** ([`error`]) - Error kinds, categories and pipeline context

pub mod assemble;
pub mod config;
pub mod error;
pub mod graft;
pub mod locate;
pub mod progress;
pub mod refine;
pub mod selection;
pub mod vernier;
