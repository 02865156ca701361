//! Metadata fixer contract.
//!
//! The eventual pipeline takes a set of images, runs the external tool on
//! each to extract and convert embedded generation metadata, and writes the
//! corrected metadata back in place. Only the request/report contract exists
//! today; [`MetadataFixer::run`] reports zero work for any input.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Images to process. An absent body is the same as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixerRequest {
    #[serde(default)]
    pub images: Vec<PathBuf>,
}

/// Per-file result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixOutcome {
    Fixed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixDetail {
    pub file: String,
    pub outcome: FixOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Summary returned to the caller: `{fixed, errors, details}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixerReport {
    pub fixed: u32,
    pub errors: u32,
    pub details: Vec<FixDetail>,
}

impl FixerReport {
    /// Fold per-file details into counts.
    pub fn from_details(details: Vec<FixDetail>) -> Self {
        let fixed = details
            .iter()
            .filter(|d| d.outcome == FixOutcome::Fixed)
            .count() as u32;
        let errors = details
            .iter()
            .filter(|d| d.outcome == FixOutcome::Failed)
            .count() as u32;
        Self {
            fixed,
            errors,
            details,
        }
    }
}

/// Entry point for the fixer pipeline.
#[derive(Debug, Clone, Default)]
pub struct MetadataFixer;

impl MetadataFixer {
    /// Whether the pipeline actually processes images.
    pub fn is_available(&self) -> bool {
        false
    }

    pub fn run(&self, request: &FixerRequest) -> FixerReport {
        tracing::warn!(
            images = request.images.len(),
            "metadata_fixer_not_implemented"
        );
        FixerReport::default()
    }
}
