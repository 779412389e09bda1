// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Claim document intake: MIME resolution, limits and base64 encoding

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::config::IntakeConfig;
use crate::{ClaimError, Result};

const PDF_MIME: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

/// A document selected for analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    /// Standard base64, no data-URL prefix
    pub base64: String,
}

/// File list entry without the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimFileSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
}

impl ClaimFile {
    /// Build a claim file from raw bytes.
    ///
    /// `declared_mime` is what the browser sent with the upload, if anything.
    /// It wins over the extension, which wins over content sniffing.
    pub fn from_bytes(
        name: &str,
        declared_mime: Option<&str>,
        bytes: &[u8],
        limits: &IntakeConfig,
    ) -> Result<Self> {
        let name = display_name(name);
        if name.is_empty() {
            return Err(ClaimError::Intake("upload has no file name".to_string()));
        }
        if bytes.is_empty() {
            return Err(ClaimError::Intake(format!("{} is empty", name)));
        }

        let size = bytes.len() as u64;
        if size > limits.max_file_bytes {
            return Err(ClaimError::FileTooLarge {
                name,
                size,
                limit: limits.max_file_bytes,
            });
        }

        let mime_type = resolve_mime(&name, declared_mime, bytes)
            .ok_or_else(|| ClaimError::UnsupportedFileType(format!("{} (unknown type)", name)))?;
        if !limits.accepts(&mime_type) {
            return Err(ClaimError::UnsupportedFileType(format!("{} ({})", name, mime_type)));
        }

        debug!("Accepted {} as {} ({} bytes)", name, mime_type, size);

        Ok(Self {
            name,
            mime_type,
            size,
            base64: general_purpose::STANDARD.encode(bytes),
        })
    }

    /// Read a claim file from disk
    pub fn from_path(path: &Path, limits: &IntakeConfig) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if metadata.len() > limits.max_file_bytes {
            return Err(ClaimError::FileTooLarge {
                name: path.display().to_string(),
                size: metadata.len(),
                limit: limits.max_file_bytes,
            });
        }

        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Self::from_bytes(&name, None, &bytes, limits)
    }

    pub fn summary(&self) -> ClaimFileSummary {
        ClaimFileSummary {
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            size: self.size,
        }
    }
}

/// Strip any directory components a browser may send along with the name
fn display_name(raw: &str) -> String {
    raw.rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
        .trim()
        .to_string()
}

/// Resolve the MIME type of an upload
pub fn resolve_mime(name: &str, declared: Option<&str>, bytes: &[u8]) -> Option<String> {
    if let Some(declared) = declared.map(str::trim) {
        let essence = declared.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        if !essence.is_empty() && essence != "application/octet-stream" {
            return Some(essence);
        }
    }

    mime_from_extension(name).or_else(|| sniff_mime(bytes))
}

fn mime_from_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(PDF_MIME.to_string()),
        "heic" => Some("image/heic".to_string()),
        "heif" => Some("image/heif".to_string()),
        _ => image::ImageFormat::from_extension(&ext).map(|f| f.to_mime_type().to_string()),
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<String> {
    if bytes.starts_with(PDF_MAGIC) {
        return Some(PDF_MIME.to_string());
    }
    image::guess_format(bytes)
        .ok()
        .map(|f| f.to_mime_type().to_string())
}

/// Human-readable size for the file list: base 1024, at most two decimals
pub fn format_bytes(bytes: u64) -> String {
    const SIZES: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZES.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZES[unit])
}

/// Sum of raw sizes across a file set
pub fn total_bytes(files: &[ClaimFile]) -> u64 {
    files.iter().map(|f| f.size).sum()
}

/// Reject a file set whose combined size exceeds the upload limit
pub fn check_total(files: &[ClaimFile], limits: &IntakeConfig) -> Result<()> {
    let total = total_bytes(files);
    if total > limits.max_upload_bytes as u64 {
        return Err(ClaimError::BatchTooLarge {
            total,
            limit: limits.max_upload_bytes as u64,
        });
    }
    Ok(())
}
