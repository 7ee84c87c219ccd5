use crate::core::models::scheme::{CdrDefinition, Scheme};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// How a germline gene is chosen for one chain segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GermlineChoice {
    /// Highest framework identity across the reference set.
    #[default]
    Auto,
    /// A specific `gene*allele` identifier.
    Explicit(String),
}

impl GermlineChoice {
    pub fn explicit_id(&self) -> Option<&str> {
        match self {
            GermlineChoice::Auto => None,
            GermlineChoice::Explicit(id) => Some(id),
        }
    }
}

impl FromStr for GermlineChoice {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            Ok(GermlineChoice::Auto)
        } else {
            Ok(GermlineChoice::Explicit(trimmed.to_string()))
        }
    }
}

impl fmt::Display for GermlineChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GermlineChoice::Auto => f.write_str("auto"),
            GermlineChoice::Explicit(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChainGermlines {
    pub v: GermlineChoice,
    pub j: GermlineChoice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanizationParams {
    pub scheme: Scheme,
    pub cdr_definition: CdrDefinition,
    pub heavy_germlines: ChainGermlines,
    pub light_germlines: ChainGermlines,
    pub backmutate_vernier: bool,
    pub refinement_iterations: usize,
}

impl Default for HumanizationParams {
    fn default() -> Self {
        Self {
            scheme: Scheme::Kabat,
            cdr_definition: CdrDefinition::Kabat,
            heavy_germlines: ChainGermlines::default(),
            light_germlines: ChainGermlines::default(),
            backmutate_vernier: false,
            refinement_iterations: 0,
        }
    }
}

#[derive(Default)]
pub struct HumanizationParamsBuilder {
    scheme: Option<Scheme>,
    cdr_definition: Option<CdrDefinition>,
    heavy_germlines: ChainGermlines,
    light_germlines: ChainGermlines,
    backmutate_vernier: bool,
    refinement_iterations: usize,
}

impl HumanizationParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = Some(scheme);
        self
    }
    pub fn cdr_definition(mut self, definition: CdrDefinition) -> Self {
        self.cdr_definition = Some(definition);
        self
    }
    pub fn heavy_v_germline(mut self, choice: GermlineChoice) -> Self {
        self.heavy_germlines.v = choice;
        self
    }
    pub fn heavy_j_germline(mut self, choice: GermlineChoice) -> Self {
        self.heavy_germlines.j = choice;
        self
    }
    pub fn light_v_germline(mut self, choice: GermlineChoice) -> Self {
        self.light_germlines.v = choice;
        self
    }
    pub fn light_j_germline(mut self, choice: GermlineChoice) -> Self {
        self.light_germlines.j = choice;
        self
    }
    pub fn backmutate_vernier(mut self, enabled: bool) -> Self {
        self.backmutate_vernier = enabled;
        self
    }
    pub fn refinement_iterations(mut self, iterations: usize) -> Self {
        self.refinement_iterations = iterations;
        self
    }

    pub fn build(self) -> Result<HumanizationParams, ConfigError> {
        Ok(HumanizationParams {
            scheme: self.scheme.ok_or(ConfigError::MissingParameter("scheme"))?,
            cdr_definition: self
                .cdr_definition
                .ok_or(ConfigError::MissingParameter("cdr_definition"))?,
            heavy_germlines: self.heavy_germlines,
            light_germlines: self.light_germlines,
            backmutate_vernier: self.backmutate_vernier,
            refinement_iterations: self.refinement_iterations,
        })
    }
}
