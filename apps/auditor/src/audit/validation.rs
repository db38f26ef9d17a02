//! Consistency checks on a model-produced report.
//!
//! Findings are advisory: the report is still accepted and shown verbatim, with the
//! warnings listed next to it. Nothing here rewrites a score.

use serde::Serialize;

use crate::audit::models::Report;
use crate::rubric::{self, grade_band};

/// Category score may differ from its metric sum by at most this much.
const CATEGORY_SUM_TOLERANCE: f64 = 0.5;
/// Overall score may differ from the category sum by at most this much.
const OVERALL_SUM_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyWarning {
    MetricOutOfRange {
        metric_id: String,
        score: f64,
        max_score: f64,
    },
    MetricMaxMismatch {
        metric_id: String,
        reported: f64,
        rubric: u32,
    },
    CategorySumMismatch {
        category: String,
        reported: f64,
        metric_sum: f64,
    },
    CategoryMaxMismatch {
        category: String,
        reported: f64,
        rubric: u32,
    },
    OverallSumMismatch {
        reported: f64,
        category_sum: f64,
    },
    GradeMismatch {
        reported: String,
        expected: String,
        band_label: String,
    },
}

impl ConsistencyWarning {
    pub fn message(&self) -> String {
        match self {
            ConsistencyWarning::MetricOutOfRange {
                metric_id,
                score,
                max_score,
            } => format!("{metric_id} scored {score} outside 0..={max_score}"),
            ConsistencyWarning::MetricMaxMismatch {
                metric_id,
                reported,
                rubric,
            } => format!("{metric_id} reports max {reported}, rubric allows {rubric}"),
            ConsistencyWarning::CategorySumMismatch {
                category,
                reported,
                metric_sum,
            } => format!("{category} score {reported} does not match its metric sum {metric_sum}"),
            ConsistencyWarning::CategoryMaxMismatch {
                category,
                reported,
                rubric,
            } => format!("{category} reports max {reported}, rubric weight is {rubric}"),
            ConsistencyWarning::OverallSumMismatch {
                reported,
                category_sum,
            } => format!("Overall score {reported} does not match category total {category_sum}"),
            ConsistencyWarning::GradeMismatch {
                reported,
                expected,
                band_label,
            } => {
                format!("Grade {reported} does not match the rubric band {expected} ({band_label})")
            }
        }
    }
}

pub fn check_report(report: &Report) -> Vec<ConsistencyWarning> {
    let mut warnings = Vec::new();
    let mut category_sum = 0.0;

    for (category, result) in report.breakdown.iter() {
        category_sum += result.score;

        if (result.max_score - category.max_points() as f64).abs() > f64::EPSILON {
            warnings.push(ConsistencyWarning::CategoryMaxMismatch {
                category: category.key().to_string(),
                reported: result.max_score,
                rubric: category.max_points(),
            });
        }

        for m in &result.metrics {
            if m.score < 0.0 || m.score > m.max_score {
                warnings.push(ConsistencyWarning::MetricOutOfRange {
                    metric_id: m.id.clone(),
                    score: m.score,
                    max_score: m.max_score,
                });
            }
            if let Some(spec) = rubric::metric(&m.id) {
                if (m.max_score - spec.max_points as f64).abs() > f64::EPSILON {
                    warnings.push(ConsistencyWarning::MetricMaxMismatch {
                        metric_id: m.id.clone(),
                        reported: m.max_score,
                        rubric: spec.max_points,
                    });
                }
            }
        }

        // an empty metric list carries no evidence either way
        if !result.metrics.is_empty() {
            let metric_sum: f64 = result.metrics.iter().map(|m| m.score).sum();
            if (metric_sum - result.score).abs() > CATEGORY_SUM_TOLERANCE {
                warnings.push(ConsistencyWarning::CategorySumMismatch {
                    category: category.key().to_string(),
                    reported: result.score,
                    metric_sum,
                });
            }
        }
    }

    if (category_sum - report.overall_score).abs() > OVERALL_SUM_TOLERANCE {
        warnings.push(ConsistencyWarning::OverallSumMismatch {
            reported: report.overall_score,
            category_sum,
        });
    }

    if let Some(band) = grade_band(report.overall_score) {
        if !band.grade.eq_ignore_ascii_case(report.grade.trim()) {
            warnings.push(ConsistencyWarning::GradeMismatch {
                reported: report.grade.clone(),
                expected: band.grade.to_string(),
                band_label: band.label.to_string(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::models::fixtures::{metric, vector_db_report};

    #[test]
    fn test_consistent_report_has_no_warnings() {
        assert!(check_report(&vector_db_report()).is_empty());
    }

    #[test]
    fn test_flags_metric_above_max() {
        let mut report = vector_db_report();
        report.breakdown.geo.metrics[0] = metric("GEO-1", 14.0, 12.0);
        report.breakdown.geo.score = 38.0;
        report.overall_score = 85.0;
        let warnings = check_report(&report);
        assert_eq!(
            warnings,
            vec![ConsistencyWarning::MetricOutOfRange {
                metric_id: "GEO-1".to_string(),
                score: 14.0,
                max_score: 12.0,
            }]
        );
    }

    #[test]
    fn test_flags_category_and_overall_sums() {
        let mut report = vector_db_report();
        report.breakdown.aio.score = 28.0;
        let warnings = check_report(&report);
        assert!(warnings.iter().any(|w| matches!(
            w,
            ConsistencyWarning::CategorySumMismatch { category, .. } if category == "AIO"
        )));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ConsistencyWarning::OverallSumMismatch { .. })));
    }

    #[test]
    fn test_flags_grade_outside_band() {
        let mut report = vector_db_report();
        report.grade = "A+".to_string();
        let warnings = check_report(&report);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message(),
            "Grade A+ does not match the rubric band A- (High Quality)"
        );
    }

    #[test]
    fn test_unnamed_band_skips_grade_check() {
        let mut report = vector_db_report();
        report.overall_score = 65.0;
        report.grade = "C".to_string();
        let warnings = check_report(&report);
        assert!(!warnings
            .iter()
            .any(|w| matches!(w, ConsistencyWarning::GradeMismatch { .. })));
    }

    #[test]
    fn test_flags_rubric_max_mismatch() {
        let mut report = vector_db_report();
        report.breakdown.seo.max_score = 25.0;
        report.breakdown.seo.metrics[3] = metric("SEO-4", 4.0, 6.0);
        let warnings = check_report(&report);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ConsistencyWarning::CategoryMaxMismatch { rubric: 30, .. })));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ConsistencyWarning::MetricMaxMismatch { rubric: 5, .. })));
    }
}
