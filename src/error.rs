//! Error types.
//!
//! The terrain core has no fatal failure modes: configuration problems are only
//! possible while loading files, and lookup misses are reported as values.

use std::fmt;

use crate::coords::ElementId;

/// Errors that can occur while loading configuration or biome tables
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    EmptyRegistry,
    DuplicateBiome(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::EmptyRegistry => write!(f, "Biome registry contains no biomes"),
            ConfigError::DuplicateBiome(name) => write!(f, "Biome '{}' is defined twice", name),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Why a destroy or damage request had no effect
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestroyError {
    /// No resident chunk holds an element with this id
    NotFound(ElementId),
    /// The element was destroyed earlier
    AlreadyDestroyed(ElementId),
}

impl fmt::Display for DestroyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestroyError::NotFound(id) => write!(f, "Destructible element {} not found", id),
            DestroyError::AlreadyDestroyed(id) => {
                write!(f, "Destructible element {} is already destroyed", id)
            }
        }
    }
}

impl std::error::Error for DestroyError {}

/// A string that is not a valid `x:z:index` element id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseIdError {
    input: String,
}

impl ParseIdError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid element id '{}', expected x:z:index", self.input)
    }
}

impl std::error::Error for ParseIdError {}
