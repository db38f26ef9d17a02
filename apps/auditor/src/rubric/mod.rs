//! IDVS 2025 rubric: the fixed catalog every audit is scored against.
//!
//! `IDVS_RUBRIC_TEXT` is what the model sees. The typed catalog below carries the same
//! numbers for code that needs them (validation, presentation). Tests keep the two in sync.

use serde::{Deserialize, Serialize};

pub const RUBRIC_VERSION: &str = "IDVS 2025";

/// Rubric text embedded verbatim in the auditor system instruction.
pub const IDVS_RUBRIC_TEXT: &str = r#"
IDVS 2025: Integrated Digital Visibility Standard
Weighting: GEO (40%) / AIO (30%) / SEO (30%)

--- 1. GEO (Generative Engine Optimization) - Max 40 pts ---
Goal: Maximize probability of retrieval and synthesis by LLMs (RAG).
Metrics:
- GEO-1: Information Gain (12 pts). Does it offer unique data, new entities, or original research not found in general consensus?
- GEO-2: Citation Authority (8 pts). Does it reference external authoritative sources/studies?
- GEO-3: Stat Density (8 pts). Are there extractable data tables, percentages, or specific definitions?
- GEO-4: RAG Readability (7 pts). Is the Flesch-Kincaid Grade 8-10? Simple syntax for vector matching.
- GEO-5: Contextual Completeness (5 pts). Semantic coverage of related entities (LSI).

--- 2. AIO (Answer Engine Optimization) - Max 30 pts ---
Goal: Be selected as the Direct Answer / Featured Snippet.
Metrics:
- AIO-1: Snippet Format (10 pts). Direct answer (40-60 words) immediately following a heading.
- AIO-2: Q&A Structure (8 pts). H2/H3 are questions. Follows What/Why/How.
- AIO-3: Conversational Utility (7 pts). Natural flow for text-to-speech. No "see image below" dependencies.
- AIO-4: Fact Verification (5 pts). Consensus-backed claims or clear opinion labeling.

--- 3. SEO (Search Engine Optimization) - Max 30 pts ---
Goal: Discovery layer and Trust signals.
Metrics:
- SEO-1: E-E-A-T Signals (10 pts). Clear author, first-hand experience indicators.
- SEO-2: Schema Potential (8 pts). Is the content structured to support Article, FAQPage, ClaimReview schema?
- SEO-3: Technical/Content Health (7 pts). Logical hierarchy, no keyword stuffing.
- SEO-4: Intent Alignment (5 pts). Matches user intent (Informational vs Transactional).

Grading Scale:
90-100: A+ (Reference Standard)
80-89: A- (High Quality)
70-79: B (Competitive)
< 60: F (Invisible)
"#;

/// The three scoring dimensions. Serialized as the upper-case keys used in `breakdown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "GEO")]
    Geo,
    #[serde(rename = "AIO")]
    Aio,
    #[serde(rename = "SEO")]
    Seo,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Geo, Category::Aio, Category::Seo];

    pub fn key(self) -> &'static str {
        match self {
            Category::Geo => "GEO",
            Category::Aio => "AIO",
            Category::Seo => "SEO",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Geo => "Generative Engine Optimization",
            Category::Aio => "Answer Engine Optimization",
            Category::Seo => "Search Engine Optimization",
        }
    }

    /// Weight in percent; equal to the category's maximum points.
    pub fn weight(self) -> u32 {
        match self {
            Category::Geo => 40,
            Category::Aio => 30,
            Category::Seo => 30,
        }
    }

    pub fn max_points(self) -> u32 {
        self.weight()
    }

    pub fn metrics(self) -> impl Iterator<Item = &'static MetricSpec> {
        METRICS.iter().filter(move |m| m.category == self)
    }

    /// Case-insensitive lookup by breakdown key.
    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(key.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub max_points: u32,
}

pub const METRICS: &[MetricSpec] = &[
    MetricSpec { id: "GEO-1", name: "Information Gain", category: Category::Geo, max_points: 12 },
    MetricSpec { id: "GEO-2", name: "Citation Authority", category: Category::Geo, max_points: 8 },
    MetricSpec { id: "GEO-3", name: "Stat Density", category: Category::Geo, max_points: 8 },
    MetricSpec { id: "GEO-4", name: "RAG Readability", category: Category::Geo, max_points: 7 },
    MetricSpec { id: "GEO-5", name: "Contextual Completeness", category: Category::Geo, max_points: 5 },
    MetricSpec { id: "AIO-1", name: "Snippet Format", category: Category::Aio, max_points: 10 },
    MetricSpec { id: "AIO-2", name: "Q&A Structure", category: Category::Aio, max_points: 8 },
    MetricSpec { id: "AIO-3", name: "Conversational Utility", category: Category::Aio, max_points: 7 },
    MetricSpec { id: "AIO-4", name: "Fact Verification", category: Category::Aio, max_points: 5 },
    MetricSpec { id: "SEO-1", name: "E-E-A-T Signals", category: Category::Seo, max_points: 10 },
    MetricSpec { id: "SEO-2", name: "Schema Potential", category: Category::Seo, max_points: 8 },
    MetricSpec { id: "SEO-3", name: "Technical/Content Health", category: Category::Seo, max_points: 7 },
    MetricSpec { id: "SEO-4", name: "Intent Alignment", category: Category::Seo, max_points: 5 },
];

pub fn metric(id: &str) -> Option<&'static MetricSpec> {
    METRICS.iter().find(|m| m.id.eq_ignore_ascii_case(id.trim()))
}

/// One named band of the grading scale. `min`/`max` are inclusive overall scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeBand {
    pub grade: &'static str,
    pub label: &'static str,
    pub min: u32,
    pub max: u32,
}

/// The rubric names no band for 60 to 69.
pub const GRADE_BANDS: &[GradeBand] = &[
    GradeBand { grade: "A+", label: "Reference Standard", min: 90, max: 100 },
    GradeBand { grade: "A-", label: "High Quality", min: 80, max: 89 },
    GradeBand { grade: "B", label: "Competitive", min: 70, max: 79 },
    GradeBand { grade: "F", label: "Invisible", min: 0, max: 59 },
];

/// Band for a (rounded) overall score, or `None` for the unnamed 60–69 range.
pub fn grade_band(overall_score: f64) -> Option<&'static GradeBand> {
    let rounded = overall_score.round().clamp(0.0, 100.0) as u32;
    GRADE_BANDS
        .iter()
        .find(|b| rounded >= b.min && rounded <= b.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_hundred() {
        let total: u32 = Category::ALL.iter().map(|c| c.weight()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_metric_maxima_sum_to_category_max() {
        for category in Category::ALL {
            let sum: u32 = category.metrics().map(|m| m.max_points).sum();
            assert_eq!(sum, category.max_points(), "category {}", category.key());
        }
    }

    #[test]
    fn test_rubric_text_mentions_every_metric() {
        for m in METRICS {
            let line = format!("{}: {} ({} pts)", m.id, m.name, m.max_points);
            assert!(IDVS_RUBRIC_TEXT.contains(&line), "missing `{line}`");
        }
    }

    #[test]
    fn test_rubric_text_mentions_every_grade() {
        for band in GRADE_BANDS {
            assert!(IDVS_RUBRIC_TEXT.contains(&format!("{} ({})", band.grade, band.label)));
        }
    }

    #[test]
    fn test_grade_band_boundaries() {
        assert_eq!(grade_band(90.0).map(|b| b.grade), Some("A+"));
        assert_eq!(grade_band(89.4).map(|b| b.grade), Some("A-"));
        assert_eq!(grade_band(80.0).map(|b| b.grade), Some("A-"));
        assert_eq!(grade_band(79.0).map(|b| b.grade), Some("B"));
        assert_eq!(grade_band(65.0), None);
        assert_eq!(grade_band(59.0).map(|b| b.grade), Some("F"));
    }

    #[test]
    fn test_category_serializes_as_upper_key() {
        assert_eq!(serde_json::to_string(&Category::Aio).unwrap(), "\"AIO\"");
        assert_eq!(Category::from_key("seo"), Some(Category::Seo));
        assert_eq!(Category::from_key("XYZ"), None);
    }
}
