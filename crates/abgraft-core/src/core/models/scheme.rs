use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Imgt,
    Aho,
    Chothia,
    Kabat,
}

impl Scheme {
    pub const ALL: [Scheme; 4] = [Scheme::Imgt, Scheme::Aho, Scheme::Chothia, Scheme::Kabat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Imgt => "imgt",
            Scheme::Aho => "aho",
            Scheme::Chothia => "chothia",
            Scheme::Kabat => "kabat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CdrDefinition {
    Imgt,
    Chothia,
    Kabat,
    North,
}

impl CdrDefinition {
    pub const ALL: [CdrDefinition; 4] = [
        CdrDefinition::Imgt,
        CdrDefinition::Chothia,
        CdrDefinition::Kabat,
        CdrDefinition::North,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CdrDefinition::Imgt => "imgt",
            CdrDefinition::Chothia => "chothia",
            CdrDefinition::Kabat => "kabat",
            CdrDefinition::North => "north",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ParseSchemeError {
    #[error("Unknown numbering scheme '{0}'. Expected one of: imgt, aho, chothia, kabat")]
    Scheme(String),
    #[error("Unknown CDR definition '{0}'. Expected one of: imgt, chothia, kabat, north")]
    Definition(String),
}

impl FromStr for Scheme {
    type Err = ParseSchemeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imgt" => Ok(Scheme::Imgt),
            "aho" => Ok(Scheme::Aho),
            "chothia" => Ok(Scheme::Chothia),
            "kabat" => Ok(Scheme::Kabat),
            _ => Err(ParseSchemeError::Scheme(s.to_string())),
        }
    }
}

impl FromStr for CdrDefinition {
    type Err = ParseSchemeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imgt" => Ok(CdrDefinition::Imgt),
            "chothia" => Ok(CdrDefinition::Chothia),
            "kabat" => Ok(CdrDefinition::Kabat),
            "north" => Ok(CdrDefinition::North),
            _ => Err(ParseSchemeError::Definition(s.to_string())),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CdrDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
