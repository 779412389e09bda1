// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for the claim validator

use thiserror::Error;

use crate::intake::format_bytes;

/// Result type alias for claim validator operations
pub type Result<T> = std::result::Result<T, ClaimError>;

/// Shown for every service or response failure that is not a safety block
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Failed to analyze documents. The AI model may be overloaded. Please try again later.";

/// Shown when the model refused the documents on safety grounds
pub const SAFETY_BLOCKED_MESSAGE: &str =
    "The analysis was blocked due to safety concerns with the uploaded content.";

/// Shown when analysis is requested with an empty file list
pub const NO_DOCUMENTS_MESSAGE: &str = "Please upload at least one document to analyze.";

/// Shown when an upload could not be turned into a claim file
pub const INTAKE_FAILED_MESSAGE: &str =
    "There was an error processing your files. Please try again.";

/// Claim validator error types
#[derive(Error, Debug)]
pub enum ClaimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Analysis service returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Analysis blocked by safety filter: {0}")]
    SafetyBlocked(String),

    #[error("AI did not return any JSON text")]
    EmptyResponse,

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("No documents to analyze")]
    NoDocuments,

    #[error("An analysis is already running")]
    AnalysisInProgress,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File too large: {name} is {size} bytes (limit {limit})")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("Documents total {total} bytes (limit {limit})")]
    BatchTooLarge { total: u64, limit: u64 },

    #[error("Intake error: {0}")]
    Intake(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClaimError {
    /// Message suitable for the result panel. Detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ClaimError::SafetyBlocked(_) => SAFETY_BLOCKED_MESSAGE.to_string(),
            ClaimError::NoDocuments => NO_DOCUMENTS_MESSAGE.to_string(),
            ClaimError::AnalysisInProgress => {
                "An analysis is already running. Please wait for it to finish.".to_string()
            }
            ClaimError::UnsupportedFileType(_) => {
                format!("{} Only images and PDF documents are accepted.", INTAKE_FAILED_MESSAGE)
            }
            ClaimError::FileTooLarge { limit, .. } => format!(
                "{} Each document must be at most {}.",
                INTAKE_FAILED_MESSAGE,
                format_bytes(*limit)
            ),
            ClaimError::BatchTooLarge { limit, .. } => format!(
                "{} All documents together must be at most {}.",
                INTAKE_FAILED_MESSAGE,
                format_bytes(*limit)
            ),
            ClaimError::Intake(_) => INTAKE_FAILED_MESSAGE.to_string(),
            ClaimError::Config(msg) => format!("Configuration error: {}", msg),
            ClaimError::Api(_)
            | ClaimError::Upstream { .. }
            | ClaimError::EmptyResponse
            | ClaimError::MalformedResponse(_)
            | ClaimError::Json(_)
            | ClaimError::FileSystem(_) => ANALYSIS_FAILED_MESSAGE.to_string(),
        }
    }

    /// Errors the user can fix from the upload panel
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ClaimError::NoDocuments
                | ClaimError::UnsupportedFileType(_)
                | ClaimError::FileTooLarge { .. }
                | ClaimError::BatchTooLarge { .. }
                | ClaimError::Intake(_)
        )
    }
}
