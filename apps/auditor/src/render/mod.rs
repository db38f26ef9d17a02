//! Server-side HTML rendering. Every function here is pure: same inputs, same markup.

pub mod dashboard;
pub mod form;

/// Escapes text for HTML element content and double-quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wraps a page body in the document shell. `refresh_secs` adds a meta refresh.
pub fn layout(body: &str, refresh_secs: Option<u32>) -> String {
    let refresh = refresh_secs
        .map(|s| format!(r#"<meta http-equiv="refresh" content="{s}">"#))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{refresh}
<title>IDVS Auditor</title>
<style>{STYLE}</style>
</head>
<body>
<header><h1>IDVS Auditor</h1><span class="subtitle">Integrated Digital Visibility Standard</span></header>
<main>
{body}
</main>
</body>
</html>
"#
    )
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #0f172a; color: #e2e8f0; margin: 0; }
header { padding: 1rem 2rem; border-bottom: 1px solid #1e293b; }
header h1 { display: inline; font-size: 1.25rem; margin-right: 1rem; }
.subtitle { color: #94a3b8; font-family: monospace; font-size: 0.8rem; }
main { max-width: 64rem; margin: 0 auto; padding: 2rem; }
.card { background: #0f1629; border: 1px solid #1e293b; border-radius: 0.75rem; padding: 1.25rem; margin-bottom: 1rem; }
.error { background: #3b0d0d; border: 1px solid #7f1d1d; color: #fecaca; padding: 0.75rem 1rem; border-radius: 0.5rem; margin-top: 1rem; }
.warnings { color: #fde68a; font-size: 0.85rem; }
textarea, input[type=text] { width: 100%; box-sizing: border-box; background: #0b1220; color: #fff; border: 1px solid #334155; border-radius: 0.5rem; padding: 0.75rem; }
textarea { height: 16rem; font-family: monospace; }
button { background: #4f46e5; color: #fff; border: 0; border-radius: 0.5rem; padding: 0.6rem 1.2rem; cursor: pointer; }
button[disabled] { background: #334155; color: #94a3b8; cursor: not-allowed; }
.link-button { background: none; color: #94a3b8; padding: 0; }
.score { font-size: 4rem; font-weight: 900; font-family: monospace; }
.grade-top { color: #34d399; } .grade-middle { color: #60a5fa; } .grade-low { color: #f87171; }
.tier-high { background: #064e3b; color: #6ee7b7; } .tier-medium { background: #713f12; color: #fde047; } .tier-low { background: #7f1d1d; color: #fca5a5; }
.badge { font-size: 0.75rem; font-weight: bold; padding: 0.1rem 0.5rem; border-radius: 999px; }
.bar { background: #1e293b; height: 0.5rem; border-radius: 999px; }
.bar > div { height: 0.5rem; border-radius: 999px; }
.bar .tier-high { background: #10b981; } .bar .tier-medium { background: #eab308; } .bar .tier-low { background: #ef4444; }
.ok { color: #34d399; }
pre { color: #34d399; font-size: 0.8rem; overflow-x: auto; }
table { border-collapse: collapse; } td, th { padding: 0.25rem 0.75rem; text-align: left; }
"#;
