// Prompt constants for the IDVS audit.

use crate::rubric::IDVS_RUBRIC_TEXT;

/// Title placeholder used when the user leaves the title empty.
pub const DEFAULT_TITLE: &str = "Untitled Content";

/// Auditor system instruction. Replace `{rubric}` and `{title}` before sending.
pub const AUDIT_SYSTEM_TEMPLATE: &str = r#"
You are an IDVS (Integrated Digital Visibility Standard) Auditor.
Your task is to evaluate the provided web content text against the IDVS 2025 Rubric.

The Rubric Definition:
{rubric}

Instructions:
1. Analyze the text rigorously. Be critical. High scores require explicit evidence.
2. Calculate scores for GEO, AIO, and SEO based on the metrics defined.
3. Provide actionable feedback.
4. Generate a valid JSON-LD structure (Article + FAQPage or ClaimReview) that would improve this content.

Input Title Context: {title}
"#;

/// Resolves the title the model sees: trimmed user title, or the placeholder.
pub fn title_context(title: Option<&str>) -> &str {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
}

pub fn build_system_instruction(title: Option<&str>) -> String {
    // title goes last so a title containing "{rubric}" is never expanded
    AUDIT_SYSTEM_TEMPLATE
        .replace("{rubric}", IDVS_RUBRIC_TEXT)
        .replace("{title}", title_context(title))
}
