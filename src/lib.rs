// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Claim Validator: AI Insurance Claim Validation
//!
//! Upload claim documents (PDFs, photos, invoices), send them to a hosted
//! Gemini model with a fixed instruction and response schema, and render the
//! structured verdict it returns.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod gemini;
pub mod intake;
pub mod session;
pub mod verdict;
pub mod web;

pub use analyzer::{analyze_documents, ClaimAnalyzer, GeminiAnalyzer};
pub use config::AppConfig;
pub use error::{ClaimError, Result};
pub use intake::ClaimFile;
pub use verdict::{PolicyChecks, Verdict, VerdictReport};
