use crate::audit::input::{InputDraft, ACCEPTED_EXTENSIONS};
use crate::render::{escape_html, layout};
use crate::rubric::Category;

/// Seconds between polls while an audit is running.
const ANALYZING_REFRESH_SECS: u32 = 2;

pub struct InputView<'a> {
    pub draft: &'a InputDraft,
    pub analyzing: bool,
    pub error: Option<&'a str>,
}

/// The input page: intro, form, and (when present) the last error.
pub fn render_input_page(view: &InputView<'_>) -> String {
    let mut body = String::new();

    if !view.analyzing {
        body.push_str(&intro());
    }
    body.push_str(&input_form(view));
    if let Some(error) = view.error {
        body.push_str(&format!(
            r#"<div class="error" role="alert">{}</div>"#,
            escape_html(error)
        ));
    }

    let refresh = view.analyzing.then_some(ANALYZING_REFRESH_SECS);
    layout(&body, refresh)
}

fn intro() -> String {
    let blurbs = Category::ALL
        .iter()
        .map(|c| {
            let blurb = match c {
                Category::Geo => {
                    "Optimizes for LLM retrieval, information gain, and RAG readability."
                }
                Category::Aio => "Optimizes for direct answer snippets and voice search structure.",
                Category::Seo => "Foundational discovery, E-E-A-T, and technical health.",
            };
            let metrics: String = c
                .metrics()
                .map(|m| format!("<li>{} ({} pts)</li>", escape_html(m.name), m.max_points))
                .collect();
            format!(
                r#"<div class="card"><strong>{} ({}%)</strong><p>{}</p><ul class="metrics">{}</ul></div>"#,
                c.key(),
                c.weight(),
                blurb,
                metrics
            )
        })
        .collect::<String>();

    format!(
        r#"<section class="intro">
<h2>Is your content ready for AI Search?</h2>
<p>Evaluate your articles against the 2025 IDVS framework. We audit for Generative Engine Optimization (GEO), Answer Engine Optimization (AIO), and traditional SEO.</p>
{blurbs}
</section>
"#
    )
}

fn input_form(view: &InputView<'_>) -> String {
    let draft = view.draft;
    let accept = ACCEPTED_EXTENSIONS
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(",");

    // Whitespace-only content passes `required`; the server suppresses it.
    let submit = if view.analyzing {
        r#"<button type="submit" formaction="/audit" disabled>Analyzing Structure...</button>"#
    } else {
        r#"<button type="submit" formaction="/audit">Run IDVS Audit</button>"#
    };
    let cancel = if view.analyzing {
        r#"<button type="submit" formaction="/audit/cancel" class="link-button">Cancel</button>"#
    } else {
        ""
    };

    format!(
        r#"<form method="post" action="/audit" enctype="multipart/form-data" class="card">
<label for="title">Content Title (Optional)</label>
<input type="text" id="title" name="title" value="{title}" placeholder="e.g., The Ultimate Guide to Vector Databases">
<label for="content">Content Body *</label>
<textarea id="content" name="content" placeholder="Paste your article content here for IDVS evaluation..." required>{content}</textarea>
<div class="char-count">{chars} chars</div>
<div class="upload">Or upload a .txt / .md file
<input type="file" name="file" accept="{accept}">
<button type="submit" formaction="/input/upload" formnovalidate class="link-button">Load file</button>
</div>
<div class="actions">{submit}{cancel}</div>
</form>
"#,
        title = escape_html(&draft.title),
        content = escape_html(&draft.content),
        chars = draft.char_count(),
    )
}
