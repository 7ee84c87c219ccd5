//! # Regions Module
//!
//! Static region-boundary and Vernier tables plus the [`map::CdrDefinitionMap`]
//! view that classifies numbered positions as framework or CDR under a given
//! (scheme, definition, chain class) triple.

pub mod map;
mod tables;
