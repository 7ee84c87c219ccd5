//! # Germlines Module
//!
//! Human reference germline genes. [`record::GermlineRecord`] holds one V or
//! J gene numbered under every scheme, [`registry::GermlineSet`] is the
//! read-only set queried by the selector, and [`record::GermlineTemplate`]
//! merges a V gene with an optional J gene into one per-position map.

pub mod record;
pub mod registry;
