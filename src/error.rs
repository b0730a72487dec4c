//! Error types for scanning, lexing, parsing, and settings.

use crate::model::EntityKind;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Scanner failure. Fatal for the file, never for the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("unterminated documentation block opened at line {line}")]
    Unterminated { line: usize },
}

/// Tag lexer failure for a single block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("documentation block has no content")]
    EmptyBlock,

    #[error("malformed tag block: {message}")]
    MalformedTag { message: String },
}

/// Tag parser diagnostics. Only `MissingRequiredTag` drops a record; the
/// others are collected and the offending tag is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown tag @{tag} in {kind} block")]
    UnknownTag { kind: EntityKind, tag: String },

    #[error("invalid value for @{tag}: {message}")]
    InvalidValue { tag: String, message: String },

    #[error("{kind} block is missing required @{tag}")]
    MissingRequiredTag { kind: EntityKind, tag: &'static str },
}

/// Settings file failure.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write default settings to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A recovered problem reported alongside the assembled model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub path: String,
    /// Zero-based index of the block within its file, when block-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<usize>,
    pub message: String,
}

impl Warning {
    pub fn file(path: impl Into<String>, message: impl ToString) -> Self {
        Warning {
            path: path.into(),
            block: None,
            message: message.to_string(),
        }
    }

    pub fn block(path: impl Into<String>, block: usize, message: impl ToString) -> Self {
        Warning {
            path: path.into(),
            block: Some(block),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.block {
            Some(i) => write!(f, "{} (block {}): {}", self.path, i, self.message),
            None => write!(f, "{}: {}", self.path, self.message),
        }
    }
}
