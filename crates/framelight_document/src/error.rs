// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document error types.

use thiserror::Error;

/// Errors raised while deserializing a timeline document.
///
/// Every variant is fatal to the load call; the current document is left
/// unchanged in all cases.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The text is not parseable JSON
    #[error("Invalid JSON")]
    InvalidJson,

    /// A required top-level field is absent
    #[error("missing {0} field")]
    MissingField(&'static str),

    /// A numeric setting is zero or negative
    #[error("{0} must be a positive number")]
    NonPositive(&'static str),

    /// A layer node lacks a string id (checked recursively)
    #[error("layer must have a valid id")]
    InvalidLayerId,

    /// The tree parsed and validated but does not match the document shape
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Error parsing a `"<layerId>:<frame>"` frame reference
#[derive(Debug, Error)]
#[error("invalid frame reference: {text}")]
pub struct FrameRefParseError {
    /// The text that failed to parse
    pub text: String,
}

impl FrameRefParseError {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
