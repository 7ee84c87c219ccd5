//! # abgraft Core Library
//!
//! A library for humanizing antibody variable domains by CDR grafting: the
//! antigen-binding loops of an input chain are transplanted onto the framework
//! of the closest human germline, with optional Vernier-zone backmutation and
//! optional refinement passes by an external mutation oracle.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Immutable data models (`Position`, `NumberedChain`),
//!   the numbering engine, the CDR definition and Vernier tables, and the human
//!   germline reference set.
//!
//! - **[`engine`]: The Logic Core.** The individual pipeline stages: CDR location,
//!   germline selection, grafting, Vernier backmutation, refinement and result
//!   assembly, together with the error taxonomy and run configuration.
//!
//! - **[`workflows`]: The Public API.** Composes the stages into a complete
//!   per-antibody humanization run for heavy and/or light chains.

pub mod core;
pub mod engine;
pub mod workflows;
