//! Error types for level loading and settings

use std::fmt;

/// Failure to load a level from the level table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// The level number has no entry in the attempts table
    UnknownLevel { number: u32 },
    /// The level has an attempts entry but no wall layout
    MissingLayout { number: u32 },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLevel { number } => {
                write!(f, "level {number} has no entry in the attempts table")
            }
            Self::MissingLayout { number } => write!(f, "level {number} has no wall layout"),
        }
    }
}

impl std::error::Error for LevelError {}

/// Failure to read settings from disk
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "could not read settings: {e}"),
            Self::Parse(e) => write!(f, "invalid settings JSON: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}
