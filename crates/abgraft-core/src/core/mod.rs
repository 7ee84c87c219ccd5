//! # Core Module
//!
//! Stateless building blocks shared by every pipeline stage.
//!
//! - **Sequence Models** ([`models`]) - Positions, residues, numbered chains, schemes
//! - **Numbering** ([`numbering`]) - Assignment of scheme positions to raw sequences
//! - **Regions** ([`regions`]) - CDR definition maps and Vernier-zone tables
//! - **Germlines** ([`germlines`]) - The human germline reference set
//!
//! All reference data in this module is read-only once constructed, so a single
//! instance can be shared by reference across any number of concurrent runs.

pub mod germlines;
pub mod models;
pub mod numbering;
pub mod regions;
