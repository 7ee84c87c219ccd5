use crate::core::germlines::record::{GeneSegment, MissingNumberingError};
use crate::core::models::chain::ChainType;
use crate::core::models::scheme::{CdrDefinition, Scheme};
use crate::core::numbering::error::NumberingError;
use crate::core::regions::map::UnsupportedDefinitionError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HumanizationError {
    #[error("Numbering failed: {0}")]
    Numbering(#[from] NumberingError),

    #[error("CDR definition '{definition}' is not available for the '{scheme}' numbering scheme")]
    UnsupportedDefinition {
        scheme: Scheme,
        definition: CdrDefinition,
    },

    #[error("Refinement iterations requested ({iterations}) but no refinement oracle was provided")]
    MissingOracle { iterations: usize },

    #[error("Unknown {role} {segment} germline '{id}'")]
    UnknownGermline {
        id: String,
        role: ChainRole,
        segment: GeneSegment,
    },

    #[error("Germline '{id}' is a {germline} {segment} gene and cannot template a {chain} chain")]
    GermlineChainMismatch {
        id: String,
        germline: ChainType,
        chain: ChainType,
        segment: GeneSegment,
    },

    #[error("No {chain_type} {segment} germline candidates in the reference set")]
    NoCandidateGermline {
        chain_type: ChainType,
        segment: GeneSegment,
    },

    #[error("Germline '{id}' does not cover framework anchor position {position}")]
    IncompleteGermline { id: String, position: String },

    #[error("Refinement failed at iteration {iteration}: {reason}")]
    Refinement { iteration: usize, reason: String },

    #[error("At least one of the heavy or light chain is required")]
    EmptyInput,
}

impl From<UnsupportedDefinitionError> for HumanizationError {
    fn from(e: UnsupportedDefinitionError) -> Self {
        HumanizationError::UnsupportedDefinition {
            scheme: e.scheme,
            definition: e.definition,
        }
    }
}

impl From<MissingNumberingError> for HumanizationError {
    fn from(e: MissingNumberingError) -> Self {
        HumanizationError::IncompleteGermline {
            id: e.id,
            position: format!("(no {} numbering)", e.scheme),
        }
    }
}

/// Coarse classification used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The input sequence itself is unusable.
    MalformedInput,
    /// The run configuration is invalid; no record can succeed.
    Configuration,
    /// The reference data lacks what the chain needs.
    DataCompleteness,
    /// An injected collaborator failed.
    Collaborator,
}

impl ErrorCategory {
    /// Whether a batch should stop instead of moving on to the next record.
    pub fn aborts_run(&self) -> bool {
        matches!(self, ErrorCategory::Configuration)
    }
}

impl HumanizationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HumanizationError::Numbering(_) | HumanizationError::EmptyInput => {
                ErrorCategory::MalformedInput
            }
            HumanizationError::UnsupportedDefinition { .. }
            | HumanizationError::MissingOracle { .. }
            | HumanizationError::UnknownGermline { .. } => ErrorCategory::Configuration,
            HumanizationError::NoCandidateGermline { .. }
            | HumanizationError::GermlineChainMismatch { .. }
            | HumanizationError::IncompleteGermline { .. } => ErrorCategory::DataCompleteness,
            HumanizationError::Refinement { .. } => ErrorCategory::Collaborator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainRole {
    Heavy,
    Light,
}

impl ChainRole {
    pub fn of(chain_type: ChainType) -> Self {
        if chain_type.is_heavy() {
            ChainRole::Heavy
        } else {
            ChainRole::Light
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainRole::Heavy => "heavy",
            ChainRole::Light => "light",
        }
    }

    pub fn accepts(&self, chain_type: ChainType) -> bool {
        match self {
            ChainRole::Heavy => chain_type.is_heavy(),
            ChainRole::Light => chain_type.is_light(),
        }
    }
}

impl fmt::Display for ChainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configuration,
    Numbering,
    CdrLocation,
    GermlineSelection,
    Grafting,
    Backmutation,
    Refinement,
    Assembly,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Configuration => "configuration",
            Stage::Numbering => "numbering",
            Stage::CdrLocation => "CDR location",
            Stage::GermlineSelection => "germline selection",
            Stage::Grafting => "grafting",
            Stage::Backmutation => "Vernier backmutation",
            Stage::Refinement => "refinement",
            Stage::Assembly => "assembly",
        })
    }
}

/// A [`HumanizationError`] tagged with the chain and stage that produced it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{} failed{}: {source}", .stage, .role.map(|r| format!(" for the {r} chain")).unwrap_or_default())]
pub struct PipelineError {
    pub role: Option<ChainRole>,
    pub stage: Stage,
    #[source]
    pub source: HumanizationError,
}

impl PipelineError {
    pub fn new(role: Option<ChainRole>, stage: Stage, source: impl Into<HumanizationError>) -> Self {
        Self {
            role,
            stage,
            source: source.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.source.category()
    }
}
