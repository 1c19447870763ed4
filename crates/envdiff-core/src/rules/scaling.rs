//! inconsistent-scaling rule

use std::collections::BTreeSet;

use super::rule::{Advisory, AdvisoryKind, AdvisoryRule, RuleContext, Severity};
use crate::config::ScalingConfig;
use crate::diff::DiffRecord;

/// Flags a numeric setting that grows with environment rank everywhere except
/// in a single outlier environment.
#[derive(Debug, Clone, Default)]
pub struct InconsistentScaling {
    config: ScalingConfig,
}

impl InconsistentScaling {
    pub fn new(config: ScalingConfig) -> Self {
        Self { config }
    }
}

struct Point<'a> {
    environment: &'a str,
    number: f64,
    text: String,
}

fn non_decreasing(numbers: impl Iterator<Item = f64>) -> bool {
    let mut previous = f64::NEG_INFINITY;
    for n in numbers {
        if n < previous {
            return false;
        }
        previous = n;
    }
    true
}

/// Pick the outlier of a sequence that is not non-decreasing.
///
/// Candidates are points whose removal leaves a sequence that rises from its
/// first to its last value without ever decreasing. A candidate lying outside
/// the span of the remaining values wins over one inside it; ties go to the
/// lowest rank.
fn find_outlier(points: &[Point<'_>]) -> Option<usize> {
    let mut fallback = None;
    for skip in 0..points.len() {
        let rest: Vec<f64> = points
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, p)| p.number)
            .collect();
        let (Some(&first), Some(&last)) = (rest.first(), rest.last()) else {
            continue;
        };
        if first >= last || !non_decreasing(rest.iter().copied()) {
            continue;
        }

        let value = points[skip].number;
        if value < first || value > last {
            return Some(skip);
        }
        fallback.get_or_insert(skip);
    }
    fallback
}

impl AdvisoryRule for InconsistentScaling {
    fn id(&self) -> &str {
        "inconsistent-scaling"
    }

    fn evaluate(&self, record: &DiffRecord, ctx: &RuleContext<'_>) -> Vec<Advisory> {
        // Environments lacking the path are skipped. Slots are already in
        // canonical order, so ranked ones come first by rank
        let points: Vec<Point<'_>> = record
            .present_in()
            .filter(|v| ctx.is_healthy(&v.environment) && ctx.rank(&v.environment).is_some())
            .filter_map(|v| {
                let value = v.value.as_ref()?;
                Some(Point {
                    environment: v.environment.as_str(),
                    number: value.as_f64()?,
                    text: value.to_string(),
                })
            })
            .collect();

        if points.len() < self.config.min_environments.max(3) {
            return Vec::new();
        }
        if non_decreasing(points.iter().map(|p| p.number)) {
            return Vec::new();
        }
        let Some(index) = find_outlier(&points) else {
            return Vec::new();
        };

        let outlier = &points[index];
        let severity = if ctx.is_critical(outlier.environment) {
            Severity::Medium
        } else {
            Severity::Low
        };
        let sequence = points
            .iter()
            .map(|p| format!("{}={}", p.environment, p.text))
            .collect::<Vec<_>>()
            .join(", ");

        vec![Advisory {
            rule: self.id().to_string(),
            kind: AdvisoryKind::InconsistentScaling,
            severity,
            description: format!(
                "`{}` grows from lower to higher environments except in {} ({}); sequence: {sequence}",
                record.path, outlier.environment, outlier.text
            ),
            recommendation: format!(
                "Review `{}` in {}; values are expected to increase with environment rank",
                record.path, outlier.environment
            ),
            paths: BTreeSet::from([record.path.clone()]),
            environments: vec![outlier.environment.to_string()],
        }]
    }
}
