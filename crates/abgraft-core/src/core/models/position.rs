use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A scheme-defined position label such as `31` or `100A`.
///
/// Positions order by number first and insertion letter second, with the bare
/// number preceding all of its insertions (`100 < 100A < 100B < 101`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub number: u16,
    pub insertion: Option<char>,
}

impl Position {
    pub const fn new(number: u16) -> Self {
        Self {
            number,
            insertion: None,
        }
    }

    pub const fn with_insertion(number: u16, insertion: char) -> Self {
        Self {
            number,
            insertion: Some(insertion),
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.insertion.is_some()
    }

    /// Formats the position with a chain prefix, e.g. `H31A` or `L27`.
    pub fn label(&self, prefix: char) -> String {
        format!("{}{}", prefix, self)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.insertion {
            Some(letter) => write!(f, "{}{}", self.number, letter),
            None => write!(f, "{}", self.number),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Invalid position label '{0}'")]
pub struct ParsePositionError(pub String);

impl FromStr for Position {
    type Err = ParsePositionError;

    /// Accepts `31`, `31A`, and the chain-prefixed forms `H31`, `L27B`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePositionError(s.to_string());
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix(['H', 'L', 'K', 'h', 'l', 'k'])
            .unwrap_or(trimmed);

        let digits_end = body
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(body.len());
        if digits_end == 0 {
            return Err(err());
        }
        let number: u16 = body[..digits_end].parse().map_err(|_| err())?;

        let mut rest = body[digits_end..].chars();
        let insertion = match (rest.next(), rest.next()) {
            (None, _) => None,
            (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
            _ => return Err(err()),
        };

        Ok(Self { number, insertion })
    }
}
