//! Gemini response schema for an IDVS report.
//!
//! Uses the OpenAPI subset Gemini accepts (`OBJECT`, `ARRAY`, `STRING`, `NUMBER`).
//! Mirrors `audit::models::Report` minus `timestamp`, which the client stamps itself.

use serde_json::{json, Map, Value};

use crate::rubric::Category;

fn metric_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING", "description": "e.g., GEO-1" },
            "name": { "type": "STRING", "description": "Metric Name" },
            "score": { "type": "NUMBER", "description": "Score awarded" },
            "maxScore": { "type": "NUMBER", "description": "Maximum possible score" },
            "observation": { "type": "STRING", "description": "Why this score was given based on the text" },
            "recommendation": { "type": "STRING", "description": "How to improve this specific metric" }
        },
        "required": ["id", "name", "score", "maxScore", "observation", "recommendation"]
    })
}

fn category_result_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "NUMBER" },
            "maxScore": { "type": "NUMBER" },
            "summary": { "type": "STRING" },
            "metrics": { "type": "ARRAY", "items": metric_schema() }
        },
        "required": ["score", "maxScore", "summary", "metrics"]
    })
}

/// The full report schema. Every field is required; `breakdown` requires all three categories.
pub fn report_schema() -> Value {
    let mut categories = Map::new();
    for category in Category::ALL {
        categories.insert(category.key().to_string(), category_result_schema());
    }
    let required: Vec<&str> = Category::ALL.iter().map(|c| c.key()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "targetUrlOrTitle": { "type": "STRING" },
            "overallScore": { "type": "NUMBER" },
            "grade": { "type": "STRING" },
            "criticalIssues": { "type": "ARRAY", "items": { "type": "STRING" } },
            "breakdown": {
                "type": "OBJECT",
                "properties": categories,
                "required": required
            },
            "jsonLdSuggestion": {
                "type": "OBJECT",
                "description": "A suggested JSON-LD structure for the content"
            }
        },
        "required": [
            "targetUrlOrTitle",
            "overallScore",
            "grade",
            "breakdown",
            "criticalIssues",
            "jsonLdSuggestion"
        ]
    })
}
