// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! In-memory UI session: the selected files and the analysis state

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::intake::{ClaimFile, ClaimFileSummary};
use crate::verdict::VerdictReport;
use crate::{ClaimError, Result};

/// Where the result panel currently is
#[derive(Debug, Clone, Default, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisState {
    #[default]
    Idle,
    Analyzing {
        started_at: DateTime<Utc>,
    },
    Completed {
        report: VerdictReport,
        finished_at: DateTime<Utc>,
    },
    Failed {
        message: String,
    },
}

impl AnalysisState {
    pub fn is_analyzing(&self) -> bool {
        matches!(self, AnalysisState::Analyzing { .. })
    }
}

/// Files selected for the current session plus the result panel state
#[derive(Debug, Default)]
pub struct Session {
    files: Vec<ClaimFile>,
    state: AnalysisState,
}

/// Serializable view of a session, without file payloads
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub files: Vec<ClaimFileSummary>,
    pub state: AnalysisState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[ClaimFile] {
        &self.files
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    /// Append files; names are not deduplicated
    pub fn add_files(&mut self, files: Vec<ClaimFile>) {
        self.files.extend(files);
    }

    /// Remove every file with this name, returning how many went
    pub fn remove_file(&mut self, name: &str) -> usize {
        let before = self.files.len();
        self.files.retain(|f| f.name != name);
        before - self.files.len()
    }

    /// Drop all files and return to idle. Refused while an analysis runs.
    pub fn clear(&mut self) -> Result<()> {
        if self.state.is_analyzing() {
            return Err(ClaimError::AnalysisInProgress);
        }
        self.files.clear();
        self.state = AnalysisState::Idle;
        Ok(())
    }

    /// Show an error in the result panel, unless an analysis owns it
    pub fn record_error(&mut self, message: impl Into<String>) {
        if !self.state.is_analyzing() {
            self.state = AnalysisState::Failed {
                message: message.into(),
            };
        }
    }

    /// Move to `Analyzing` and hand back the files to send.
    ///
    /// Clears any previous result or error.
    pub fn begin_analysis(&mut self) -> Result<Vec<ClaimFile>> {
        if self.state.is_analyzing() {
            return Err(ClaimError::AnalysisInProgress);
        }
        if self.files.is_empty() {
            self.state = AnalysisState::Failed {
                message: ClaimError::NoDocuments.user_message(),
            };
            return Err(ClaimError::NoDocuments);
        }

        self.state = AnalysisState::Analyzing {
            started_at: Utc::now(),
        };
        Ok(self.files.clone())
    }

    /// Record the outcome of the analysis started by `begin_analysis`
    pub fn finish_analysis(&mut self, result: &Result<VerdictReport>) {
        self.state = match result {
            Ok(report) => AnalysisState::Completed {
                report: report.clone(),
                finished_at: Utc::now(),
            },
            Err(e) => AnalysisState::Failed {
                message: e.user_message(),
            },
        };
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            files: self.files.iter().map(ClaimFile::summary).collect(),
            state: self.state.clone(),
        }
    }
}
