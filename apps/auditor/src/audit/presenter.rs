//! Presentational derivations for the report dashboard.
//!
//! None of these values are authoritative scores: they only pick colours, bar widths
//! and previews. Reported scores are always displayed as returned.

use std::collections::BTreeSet;

use crate::audit::models::CategoryResult;
use crate::rubric::Category;

const SUMMARY_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub fn css_class(self) -> &'static str {
        match self {
            Tier::High => "tier-high",
            Tier::Medium => "tier-medium",
            Tier::Low => "tier-low",
        }
    }
}

/// `round(score / max_score * 100)`; a non-positive maximum yields 0.
pub fn compliance_percent(result: &CategoryResult) -> i64 {
    if result.max_score <= 0.0 {
        return 0;
    }
    (result.score / result.max_score * 100.0).round() as i64
}

/// Category badge tier: 80 and above is high, 60 and above medium.
pub fn compliance_tier(percent: i64) -> Tier {
    match percent {
        p if p >= 80 => Tier::High,
        p if p >= 60 => Tier::Medium,
        _ => Tier::Low,
    }
}

/// Unrounded metric percentage, used for the progress bar.
pub fn metric_percent(score: f64, max_score: f64) -> f64 {
    if max_score <= 0.0 {
        0.0
    } else {
        score / max_score * 100.0
    }
}

/// Metric bar tier: 80 and above is high, 50 and above medium.
pub fn metric_tier(percent: f64) -> Tier {
    if percent >= 80.0 {
        Tier::High
    } else if percent >= 50.0 {
        Tier::Medium
    } else {
        Tier::Low
    }
}

pub fn bar_width(percent: f64) -> f64 {
    percent.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeTone {
    Top,
    Middle,
    Low,
}

impl GradeTone {
    /// Picks the tone from the first character of the grade: `A…`, `B…`, anything else.
    pub fn for_grade(grade: &str) -> Self {
        match grade.chars().next() {
            Some('A') => GradeTone::Top,
            Some('B') => GradeTone::Middle,
            _ => GradeTone::Low,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            GradeTone::Top => "grade-top",
            GradeTone::Middle => "grade-middle",
            GradeTone::Low => "grade-low",
        }
    }
}

/// Score as a percentage of the category's rubric weight (the radar-chart value).
pub fn weighted_percent(category: Category, result: &CategoryResult) -> f64 {
    result.score / category.weight() as f64 * 100.0
}

/// First 80 characters of a summary followed by `...`, as shown on a collapsed card.
pub fn summary_preview(summary: &str) -> String {
    let preview: String = summary.chars().take(SUMMARY_PREVIEW_CHARS).collect();
    format!("{preview}...")
}

/// Which category cards are expanded. Carried in the `expand` query parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedCategories(BTreeSet<Category>);

impl ExpandedCategories {
    /// Parses `"GEO,SEO"`; unknown keys are ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        Self(
            raw.unwrap_or_default()
                .split(',')
                .filter_map(Category::from_key)
                .collect(),
        )
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0.contains(&category)
    }

    /// The set after flipping one card.
    pub fn toggled(&self, category: Category) -> Self {
        let mut next = self.0.clone();
        if !next.remove(&category) {
            next.insert(category);
        }
        Self(next)
    }

    /// Query value in canonical order, e.g. `GEO,SEO`.
    pub fn to_query(&self) -> String {
        self.0.iter().map(|c| c.key()).collect::<Vec<_>>().join(",")
    }
}
