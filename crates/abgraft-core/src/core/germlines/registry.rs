use super::record::{GeneSegment, GermlineRecord};
use crate::core::models::chain::ChainType;
use crate::core::numbering::engine::Numberer;
use crate::core::numbering::error::NumberingError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const BUILTIN_GERMLINES: &str = include_str!("../../../data/germlines.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GermlineFile {
    #[serde(default, rename = "germline")]
    germlines: Vec<GermlineEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GermlineEntry {
    id: String,
    chain: ChainType,
    segment: GeneSegment,
    sequence: String,
}

/// Read-only reference germline set, ordered by identifier.
#[derive(Debug, Clone, Default)]
pub struct GermlineSet {
    records: Vec<GermlineRecord>,
    index: HashMap<String, usize>,
}

impl GermlineSet {
    pub fn load(path: &Path, numberer: &dyn Numberer) -> Result<Self, GermlineLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| GermlineLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, numberer).map_err(|e| match e {
            GermlineLoadError::Toml { source, .. } => GermlineLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source,
            },
            other => other,
        })
    }

    /// The human germline set shipped with the library.
    pub fn builtin(numberer: &dyn Numberer) -> Result<Self, GermlineLoadError> {
        Self::parse(BUILTIN_GERMLINES, numberer)
    }

    pub fn parse(content: &str, numberer: &dyn Numberer) -> Result<Self, GermlineLoadError> {
        let file: GermlineFile = toml::from_str(content).map_err(|e| GermlineLoadError::Toml {
            path: "<inline>".to_string(),
            source: e,
        })?;
        let records = file
            .germlines
            .into_iter()
            .map(|entry| {
                GermlineRecord::new(
                    entry.id.clone(),
                    entry.chain,
                    entry.segment,
                    entry.sequence,
                    numberer,
                )
                .map_err(|source| GermlineLoadError::Numbering {
                    id: entry.id,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let set = Self::from_records(records)?;
        debug!(count = set.len(), "Loaded germline reference set.");
        Ok(set)
    }

    pub fn from_records(
        records: impl IntoIterator<Item = GermlineRecord>,
    ) -> Result<Self, GermlineLoadError> {
        let mut records: Vec<GermlineRecord> = records.into_iter().collect();
        records.sort_by(|a, b| a.id().cmp(b.id()));

        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.id().to_string(), i).is_some() {
                return Err(GermlineLoadError::Duplicate(record.id().to_string()));
            }
        }
        Ok(Self { records, index })
    }

    pub fn get(&self, id: &str) -> Option<&GermlineRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Records of one chain type and segment, in identifier order.
    pub fn candidates(
        &self,
        chain_type: ChainType,
        segment: GeneSegment,
    ) -> impl Iterator<Item = &GermlineRecord> + '_ {
        self.records
            .iter()
            .filter(move |r| r.chain_type() == chain_type && r.segment() == segment)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GermlineRecord> + '_ {
        self.records.iter()
    }
}

#[derive(Debug, Error)]
pub enum GermlineLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Failed to number germline '{id}': {source}")]
    Numbering {
        id: String,
        source: NumberingError,
    },
    #[error("Duplicate germline identifier '{0}'")]
    Duplicate(String),
}
