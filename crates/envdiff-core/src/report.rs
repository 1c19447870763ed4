//! Report assembly and rendering
//!
//! A [`ComparisonReport`] bundles the diff and the advisories of one run. It is
//! a plain value: serializing it twice, or assembling it twice from the same
//! inputs, gives identical output.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::diff::{Classification, DiffRecord, DiffReport};
use crate::error::Result;
use crate::rules::{Advisory, AdvisoryEvaluation, ReportWarning, Severity};

/// Record counts per classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub total_paths: usize,
    pub consistent: usize,
    pub modified: usize,
    pub missing: usize,
    pub unique: usize,
}

impl DiffSummary {
    /// Count records by classification
    pub fn tally(records: &[DiffRecord]) -> Self {
        let mut summary = Self {
            total_paths: records.len(),
            ..Self::default()
        };
        for record in records {
            match record.classification {
                Classification::Consistent => summary.consistent += 1,
                Classification::Modified => summary.modified += 1,
                Classification::Missing => summary.missing += 1,
                Classification::Unique => summary.unique += 1,
            }
        }
        summary
    }

    /// Count for one classification
    pub fn count(&self, classification: Classification) -> usize {
        match classification {
            Classification::Consistent => self.consistent,
            Classification::Modified => self.modified,
            Classification::Missing => self.missing,
            Classification::Unique => self.unique,
        }
    }
}

/// Advisory counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorySummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl AdvisorySummary {
    pub fn tally(advisories: &[Advisory]) -> Self {
        let mut summary = Self {
            total: advisories.len(),
            ..Self::default()
        };
        for advisory in advisories {
            match advisory.severity {
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }
}

/// Advisories in evaluation order, with their summary and any warnings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryReport {
    pub advisories: Vec<Advisory>,
    pub summary: AdvisorySummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ReportWarning>,
}

/// The complete result of one comparison run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub diff: DiffReport,
    pub advisories: AdvisoryReport,
}

/// Combine a diff and its rule evaluation into one report
pub fn assemble(diff: DiffReport, evaluation: AdvisoryEvaluation) -> ComparisonReport {
    let summary = AdvisorySummary::tally(&evaluation.advisories);
    ComparisonReport {
        diff,
        advisories: AdvisoryReport {
            advisories: evaluation.advisories,
            summary,
            warnings: evaluation.warnings,
        },
    }
}

impl ComparisonReport {
    /// Whether any environment failed to load
    pub fn is_degraded(&self) -> bool {
        self.diff.degraded
    }

    /// Highest severity among the advisories
    pub fn max_severity(&self) -> Option<Severity> {
        self.advisories.advisories.iter().map(|a| a.severity).min()
    }

    /// Pretty JSON form of the report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Content fingerprint of the report, stable across runs on the same input
    pub fn fingerprint(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(self)?);
        Ok(format!("sha256:{:x}", hasher.finalize()))
    }

    /// Plain-text rendering for terminals and logs.
    ///
    /// Consistent paths are left out; absent values show as `N/A`.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let summary = &self.diff.summary;

        let environments = self
            .diff
            .environments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "Environments: {environments}");
        let _ = writeln!(
            out,
            "Paths: {} total, {} consistent, {} modified, {} missing, {} unique",
            summary.total_paths, summary.consistent, summary.modified, summary.missing, summary.unique
        );
        if self.diff.degraded {
            let _ = writeln!(out, "Report is degraded: some environments failed to load");
        }

        let differences: Vec<&DiffRecord> = self
            .diff
            .records
            .iter()
            .filter(|r| r.classification != Classification::Consistent)
            .collect();
        if !differences.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Differences:");
            for record in differences {
                let _ = writeln!(out, "  {} {}", marker(record.classification), record.path);
                for slot in &record.values {
                    let value = slot
                        .value
                        .as_ref()
                        .map_or_else(|| "N/A".to_string(), ToString::to_string);
                    let _ = writeln!(out, "      {}: {value}", slot.environment);
                }
            }
        }

        let advisories = &self.advisories;
        if !advisories.advisories.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Advisories ({}):", advisories.summary.total);
            for advisory in &advisories.advisories {
                let _ = writeln!(
                    out,
                    "  [{}] {}: {}",
                    advisory.severity, advisory.rule, advisory.description
                );
                let _ = writeln!(out, "      -> {}", advisory.recommendation);
            }
        }

        if !advisories.warnings.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Warnings:");
            for warning in &advisories.warnings {
                let _ = writeln!(out, "  {}", warning.message);
            }
        }

        out
    }
}

/// Single-character marker used in text output
pub fn marker(classification: Classification) -> char {
    match classification {
        Classification::Consistent => '=',
        Classification::Modified => '~',
        Classification::Missing => '!',
        Classification::Unique => '+',
    }
}
