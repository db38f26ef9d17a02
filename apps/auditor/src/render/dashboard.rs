//! Report dashboard, a pure function of `(Report, warnings, expanded cards)`.

use crate::audit::models::{CategoryResult, MetricScore, Report};
use crate::audit::presenter::{
    bar_width, compliance_percent, compliance_tier, metric_percent, metric_tier,
    summary_preview, weighted_percent, ExpandedCategories, GradeTone,
};
use crate::audit::validation::ConsistencyWarning;
use crate::render::{escape_html, layout};
use crate::rubric::Category;

pub const NO_ISSUES_MESSAGE: &str = "No critical blocking issues found.";

pub fn render_dashboard_page(
    report: &Report,
    warnings: &[ConsistencyWarning],
    expanded: &ExpandedCategories,
) -> String {
    let body = format!(
        r#"<form method="post" action="/audit/reset"><button type="submit" class="link-button">&larr; Evaluate Another Article</button></form>
{}"#,
        render_dashboard(report, warnings, expanded)
    );
    layout(&body, None)
}

pub fn render_dashboard(
    report: &Report,
    warnings: &[ConsistencyWarning],
    expanded: &ExpandedCategories,
) -> String {
    let mut html = String::new();
    html.push_str(&score_card(report, warnings));
    html.push_str(&category_overview(report));
    html.push_str(&critical_issues(&report.critical_issues));

    html.push_str("<section><h2>Detailed Analysis</h2>\n");
    for (category, result) in report.breakdown.iter() {
        html.push_str(&category_card(category, result, expanded));
    }
    html.push_str("</section>\n");

    html.push_str(&json_ld_panel(report));
    html
}

fn score_card(report: &Report, warnings: &[ConsistencyWarning]) -> String {
    let tone = GradeTone::for_grade(&report.grade);
    let notes = if warnings.is_empty() {
        String::new()
    } else {
        let items: String = warnings
            .iter()
            .map(|w| format!("<li>{}</li>", escape_html(&w.message())))
            .collect();
        format!(r#"<ul class="warnings" title="Consistency notes">{items}</ul>"#)
    };

    format!(
        r#"<section class="card score-card">
<h2>IDVS Score</h2>
<div class="score">{score}</div>
<div class="grade {tone}">Grade {grade}</div>
<div class="target">{target}</div>
{notes}
</section>
"#,
        score = report.overall_score,
        tone = tone.css_class(),
        grade = escape_html(&report.grade),
        target = escape_html(&report.target_url_or_title),
    )
}

fn category_overview(report: &Report) -> String {
    let rows: String = report
        .breakdown
        .iter()
        .map(|(category, result)| {
            format!(
                "<tr><th>{}</th><td>{:.0}%</td></tr>",
                category.key(),
                weighted_percent(category, result)
            )
        })
        .collect();
    format!(r#"<section class="card"><table class="overview">{rows}</table></section>"#)
}

fn critical_issues(issues: &[String]) -> String {
    let items = if issues.is_empty() {
        format!(r#"<li class="ok">{NO_ISSUES_MESSAGE}</li>"#)
    } else {
        issues
            .iter()
            .map(|issue| format!("<li>{}</li>", escape_html(issue)))
            .collect()
    };
    format!(
        r#"<section class="card issues"><h3>Critical Issues</h3><ul>{items}</ul></section>
"#
    )
}

fn category_card(
    category: Category,
    result: &CategoryResult,
    expanded: &ExpandedCategories,
) -> String {
    let percent = compliance_percent(result);
    let tier = compliance_tier(percent);
    let is_open = expanded.contains(category);
    let toggle_query = expanded.toggled(category).to_query();
    let toggle_href = if toggle_query.is_empty() {
        "/".to_string()
    } else {
        format!("/?expand={toggle_query}")
    };

    let detail = if is_open {
        let metrics: String = result.metrics.iter().map(metric_row).collect();
        format!(
            r#"<div class="detail"><blockquote>"{}"</blockquote>{metrics}</div>"#,
            escape_html(&result.summary)
        )
    } else {
        String::new()
    };

    format!(
        r#"<article class="card category" id="{key}">
<a href="{toggle_href}" class="toggle" aria-expanded="{is_open}">
<h3>{title}</h3>
<p class="preview">{preview}</p>
<div class="category-score">{score}/{max}</div>
<span class="badge {tier_class}">{percent}% Compliance</span>
</a>
{detail}
</article>
"#,
        key = category.key(),
        title = category.title(),
        preview = escape_html(&summary_preview(&result.summary)),
        score = result.score,
        max = result.max_score,
        tier_class = tier.css_class(),
    )
}

fn metric_row(metric: &MetricScore) -> String {
    let percent = metric_percent(metric.score, metric.max_score);
    format!(
        r#"<div class="metric">
<span class="metric-id">{id}</span> <strong>{score} / {max}</strong>
<h4>{name}</h4>
<div class="bar"><div class="{tier}" style="width: {width:.1}%"></div></div>
<div class="observation"><b>Observation</b><p>{observation}</p></div>
<div class="recommendation"><b>Recommendation</b><p>{recommendation}</p></div>
</div>
"#,
        id = escape_html(&metric.id),
        score = metric.score,
        max = metric.max_score,
        name = escape_html(&metric.name),
        tier = metric_tier(percent).css_class(),
        width = bar_width(percent),
        observation = escape_html(&metric.observation),
        recommendation = escape_html(&metric.recommendation),
    )
}

fn json_ld_panel(report: &Report) -> String {
    let pretty = escape_html(&report.json_ld_pretty());
    format!(
        r#"<section class="card json-ld">
<h3>Suggested Structured Data (JSON-LD)</h3>
<button type="button" onclick="navigator.clipboard.writeText(document.getElementById('json-ld').textContent)">Copy</button>
<a href="/report/json-ld" download="json-ld.json">Download</a>
<pre id="json-ld">{pretty}</pre>
</section>
"#
    )
}
