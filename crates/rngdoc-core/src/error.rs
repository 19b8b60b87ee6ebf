//! Error taxonomy for grammar loading, rendering and catalog building.
//!
//! Every variant is fatal to the operation that raised it: there is no
//! partial catalog and no retry.

use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The grammar source is not a well-formed pattern tree.
    #[error("malformed grammar: {reason}")]
    MalformedGrammar { reason: String },

    /// The baseline grammar is missing or unusable.
    #[error("cannot load baseline grammar: {reason}")]
    BaselineLoad { reason: String },

    /// A pattern kind outside the supported set.
    #[error("unrenderable pattern <{kind}>")]
    UnrenderablePattern { kind: String },

    /// A `start` pattern with a `combine` mode other than `choice` or `interleave`.
    #[error("unsupported combine mode \"{mode}\" on start")]
    UnsupportedCombineMode { mode: String },

    /// A `ref` whose target is neither a define nor an element of the grammar.
    #[error("dangling reference \"{name}\" in element \"{element}\"")]
    DanglingReference { name: String, element: String },
}

impl Error {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedGrammar {
            reason: reason.into(),
        }
    }

    pub fn baseline(reason: impl Into<String>) -> Self {
        Self::BaselineLoad {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code, used in JSON error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedGrammar { .. } => "RNGDOC-E001",
            Error::BaselineLoad { .. } => "RNGDOC-E002",
            Error::UnrenderablePattern { .. } => "RNGDOC-E003",
            Error::UnsupportedCombineMode { .. } => "RNGDOC-E004",
            Error::DanglingReference { .. } => "RNGDOC-E005",
        }
    }
}
