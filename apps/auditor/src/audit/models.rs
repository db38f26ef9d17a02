use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::rubric::Category;

/// Score for one rubric metric, e.g. `GEO-1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricScore {
    pub id: String,
    pub name: String,
    pub score: f64,
    pub max_score: f64,
    pub observation: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    pub score: f64,
    pub max_score: f64,
    pub summary: String,
    pub metrics: Vec<MetricScore>,
}

/// Exactly one result per category; a missing key fails deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    #[serde(rename = "GEO")]
    pub geo: CategoryResult,
    #[serde(rename = "AIO")]
    pub aio: CategoryResult,
    #[serde(rename = "SEO")]
    pub seo: CategoryResult,
}

impl Breakdown {
    pub fn get(&self, category: Category) -> &CategoryResult {
        match category {
            Category::Geo => &self.geo,
            Category::Aio => &self.aio,
            Category::Seo => &self.seo,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryResult)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// One IDVS evaluation result. Immutable once parsed.
///
/// `timestamp` is not part of the model's output schema; it defaults to the parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    pub target_url_or_title: String,
    pub overall_score: f64,
    pub grade: String,
    pub breakdown: Breakdown,
    pub critical_issues: Vec<String>,
    /// Free-form structured data; must be a JSON object, otherwise never interpreted.
    pub json_ld_suggestion: Map<String, Value>,
}

impl Report {
    /// The JSON-LD suggestion as 2-space indented JSON, the text offered for copying.
    pub fn json_ld_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.json_ld_suggestion).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::json;

    pub fn metric(id: &str, score: f64, max_score: f64) -> MetricScore {
        MetricScore {
            id: id.to_string(),
            name: format!("{id} metric"),
            score,
            max_score,
            observation: format!("{id} observation"),
            recommendation: format!("{id} recommendation"),
        }
    }

    pub fn category(score: f64, max_score: f64, metrics: Vec<MetricScore>) -> CategoryResult {
        CategoryResult {
            score,
            max_score,
            summary: "The article covers the topic with moderate depth but few sources."
                .to_string(),
            metrics,
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected a JSON object, got {other}"),
        }
    }

    /// Scenario report: 82 / A-, GEO 35/40, AIO 24/30, SEO 23/30, no issues.
    pub fn vector_db_report() -> Report {
        Report {
            timestamp: Utc::now(),
            target_url_or_title: "Vector DB Guide".to_string(),
            overall_score: 82.0,
            grade: "A-".to_string(),
            breakdown: Breakdown {
                geo: category(
                    35.0,
                    40.0,
                    vec![
                        metric("GEO-1", 11.0, 12.0),
                        metric("GEO-2", 7.0, 8.0),
                        metric("GEO-3", 7.0, 8.0),
                        metric("GEO-4", 6.0, 7.0),
                        metric("GEO-5", 4.0, 5.0),
                    ],
                ),
                aio: category(
                    24.0,
                    30.0,
                    vec![
                        metric("AIO-1", 8.0, 10.0),
                        metric("AIO-2", 6.0, 8.0),
                        metric("AIO-3", 6.0, 7.0),
                        metric("AIO-4", 4.0, 5.0),
                    ],
                ),
                seo: category(
                    23.0,
                    30.0,
                    vec![
                        metric("SEO-1", 8.0, 10.0),
                        metric("SEO-2", 6.0, 8.0),
                        metric("SEO-3", 5.0, 7.0),
                        metric("SEO-4", 4.0, 5.0),
                    ],
                ),
            },
            critical_issues: vec![],
            json_ld_suggestion: object(json!({
                "@context": "https://schema.org",
                "@type": "Article",
                "headline": "Vector DB Guide",
                "mainEntity": {
                    "@type": "FAQPage",
                    "mainEntity": [{"@type": "Question", "name": "What is a vector database?"}]
                }
            })),
        }
    }

    /// The same report as the model would return it (no timestamp).
    pub fn vector_db_model_json() -> Value {
        let mut value = serde_json::to_value(vector_db_report()).unwrap();
        value.as_object_mut().unwrap().remove("timestamp");
        value
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_parses_model_output_without_timestamp() {
        let before = Utc::now();
        let report: Report = serde_json::from_value(vector_db_model_json()).unwrap();
        assert!(report.timestamp >= before);
        assert_eq!(report.grade, "A-");
        assert_eq!(report.breakdown.get(Category::Geo).score, 35.0);
    }

    #[test]
    fn test_missing_category_is_rejected() {
        let mut value = vector_db_model_json();
        value["breakdown"].as_object_mut().unwrap().remove("SEO");
        let err = serde_json::from_value::<Report>(value).unwrap_err();
        assert!(err.to_string().contains("SEO"), "{err}");
    }

    #[test]
    fn test_non_object_json_ld_is_rejected() {
        for bad in [Value::Null, Value::from("text"), serde_json::json!([1])] {
            let mut value = vector_db_model_json();
            value["jsonLdSuggestion"] = bad.clone();
            let err = serde_json::from_value::<Report>(value).unwrap_err();
            assert!(err.to_string().contains("map"), "{bad}: {err}");
        }
    }

    #[test]
    fn test_serializes_camel_case_fields() {
        let value = serde_json::to_value(vector_db_report()).unwrap();
        for key in [
            "targetUrlOrTitle",
            "overallScore",
            "criticalIssues",
            "jsonLdSuggestion",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["breakdown"]["GEO"]["metrics"][0].get("maxScore").is_some());
    }

    #[test]
    fn test_json_ld_copy_text_parses_back_equal() {
        let report = vector_db_report();
        let text = report.json_ld_pretty();
        assert!(text.contains("\n  \"@context\""));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, Value::Object(report.json_ld_suggestion));
    }
}
