//! Server-rendered HTML for the dashboard.

use crate::agent::tool_specs;
use crate::analysis::{AnalysisReport, ReplayedCall};
use crate::config::Settings;
use crate::samples::{word_count, SampleClaim, SAMPLE_CLAIMS};
use crate::workspace::ConnectionStatus;
use std::fmt::Write;

/// Characters of each sample shown on the home page.
const SAMPLE_PREVIEW_CHARS: usize = 250;

/// Calls rendered open; later ones start collapsed.
const EXPANDED_CALLS: usize = 2;

const STYLE: &str = "
body { margin: 0; font-family: system-ui, sans-serif; background: #0A1929; color: #E7EBF0; display: flex; }
aside { width: 260px; min-height: 100vh; background: #132F4C; padding: 20px; box-sizing: border-box; }
main { flex: 1; padding: 30px 40px; max-width: 1100px; }
a { color: #00D9FF; }
h1, h2, h3 { color: #00D9FF; }
.card { background: #132F4C; border: 1px solid #1E4976; border-radius: 12px; padding: 18px; margin: 14px 0; }
.ok { color: #00CCA3; } .bad { color: #FF6B6B; }
.warn { background: #FFE66D; color: #333; padding: 14px; border-radius: 10px; }
.error { background: #FF6B6B22; border: 1px solid #FF6B6B; padding: 14px; border-radius: 10px; }
.metrics { display: flex; gap: 16px; } .metrics .card { flex: 1; text-align: center; }
.metric { font-size: 2.2rem; font-weight: 700; }
textarea { width: 100%; height: 220px; background: #0A1929; color: #E7EBF0; border: 1px solid #1E4976; border-radius: 8px; padding: 10px; }
pre { white-space: pre-wrap; background: #0A1929; padding: 10px; border-radius: 8px; }
.badge { padding: 4px 10px; border-radius: 8px; font-weight: 600; }
.badge.fraud { background: #FF6B6B; } .badge.legit { background: #4ECDC4; }
button { background: #00D9FF; color: #0A1929; border: none; padding: 10px 18px; border-radius: 8px; font-weight: 700; cursor: pointer; }
";

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a sample name for a query string.
fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn sidebar(status: &ConnectionStatus, settings: &Settings) -> String {
    let (class, icon) = if status.is_connected() {
        ("ok", "🟢")
    } else {
        ("bad", "❌")
    };

    format!(
        r#"<aside>
<h2>🛡️ Claimscope</h2>
<p class="{class}"><b>{icon} {label}</b><br><small>{detail}</small></p>
<div class="card"><small>
Catalog: <code>{catalog}</code><br>
Schema: <code>{schema}</code><br>
Warehouse: <code>{warehouse}</code><br>
Environment: <code>{env}</code><br>
Model: <code>{model}</code>
</small></div>
<nav><a href="/">🏠 Home</a><br><a href="/analysis">📊 Claim Analysis</a></nav>
</aside>"#,
        class = class,
        icon = icon,
        label = status.label(),
        detail = escape_html(status.detail()),
        catalog = escape_html(&settings.catalog.catalog),
        schema = escape_html(&settings.catalog.schema),
        warehouse = escape_html(&settings.workspace.warehouse_id),
        env = escape_html(&settings.general.environment),
        model = escape_html(&settings.agent.llm_endpoint),
    )
}

fn layout(title: &str, status: &ConnectionStatus, settings: &Settings, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title><style>{STYLE}</style></head>\n<body>{sidebar}<main>{body}</main></body></html>",
        title = escape_html(title),
        sidebar = sidebar(status, settings),
        body = body,
    )
}

fn sample_badge(sample: &SampleClaim) -> String {
    let class = if sample.is_fraud { "fraud" } else { "legit" };
    format!(r#"<span class="badge {}">{}</span>"#, class, sample.badge())
}

/// Home page: capabilities, system status and the sample library.
pub fn home_page(status: &ConnectionStatus, settings: &Settings) -> String {
    let mut body = String::from(
        "<h1>AI-Powered Fraud Detection</h1>\n<p>An agent triages healthcare claims by calling fraud tools hosted in the workspace.</p>\n",
    );

    body.push_str("<h3>🔧 Agent tools</h3>\n");
    for spec in tool_specs() {
        let _ = writeln!(
            body,
            r#"<div class="card"><b>{}</b><br><small>{}</small></div>"#,
            escape_html(&spec.name),
            escape_html(&spec.description)
        );
    }

    let (class, state) = if status.is_connected() {
        ("ok", "Active")
    } else {
        ("bad", "Error")
    };
    let _ = writeln!(
        body,
        r#"<h3>System status</h3><div class="card"><span class="{}">{}</span> {}</div>"#,
        class,
        state,
        escape_html(status.detail())
    );

    body.push_str("<h3>💡 Example claims</h3>\n");
    body.push_str(&sample_library());

    layout("Claimscope", status, settings, &body)
}

fn sample_library() -> String {
    let mut out = String::new();
    for sample in SAMPLE_CLAIMS.iter() {
        let _ = writeln!(
            out,
            r#"<div class="card"><b>{name}</b> {badge}<pre>{preview}</pre><a href="/analysis?sample={query}">Analyze this claim</a></div>"#,
            name = escape_html(sample.name),
            badge = sample_badge(sample),
            preview = escape_html(&sample.preview(SAMPLE_PREVIEW_CHARS)),
            query = encode_query_value(sample.name),
        );
    }
    out
}

/// What the analysis page shows below the form.
pub enum AnalysisOutcome<'a> {
    None,
    Report(&'a AnalysisReport),
    Error(&'a str),
}

fn claim_form(claim_text: &str, selected: Option<&SampleClaim>) -> String {
    let mut options = String::from(r#"<option value="">Custom</option>"#);
    for sample in SAMPLE_CLAIMS.iter() {
        let selected_attr = if selected.map(|s| s.name) == Some(sample.name) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape_html(sample.name),
            selected_attr
        );
    }

    let badge = selected.map(sample_badge).unwrap_or_default();
    let words = word_count(claim_text);

    format!(
        r#"<form method="get" action="/analysis"><label>🔖 Sample claim: <select name="sample" onchange="this.form.submit()">{options}</select></label> {badge}</form>
<form method="post" action="/analysis" onsubmit="this.querySelector('button').disabled=true;document.getElementById('busy').hidden=false">
<textarea name="claim_text" placeholder="Enter claim ID, member ID, provider, date of service, billed amount, and description...">{text}</textarea>
<p><button type="submit">🚀 Analyze with AI Agent</button> <small>{words} words</small></p>
<p id="busy" hidden>🧠 Agent is analyzing the claim...</p>
</form>"#,
        options = options,
        badge = badge,
        text = escape_html(claim_text),
        words = words,
    )
}

fn render_call(out: &mut String, index: usize, call: &ReplayedCall) {
    let category = call.category();
    let open = if index <= EXPANDED_CALLS { " open" } else { "" };
    let arguments =
        serde_json::to_string_pretty(&call.arguments).unwrap_or_else(|_| call.arguments.to_string());

    let _ = writeln!(
        out,
        r#"<details class="card"{open}><summary>{icon} <b>Tool {index}: {name}</b></summary>
<p><b>📥 Input Parameters:</b></p><pre>{arguments}</pre>
<p><b>📤 Output Result:</b></p><pre>{result}</pre></details>"#,
        open = open,
        icon = category.icon(),
        index = index,
        name = escape_html(&call.name),
        arguments = escape_html(&arguments),
        result = escape_html(&call.result_display()),
    );
}

fn render_report(out: &mut String, report: &AnalysisReport) {
    if report.no_tools_used {
        out.push_str(r#"<div class="warn"><b>⚠️ No tool calls detected in agent execution</b></div>"#);
    } else {
        let _ = writeln!(
            out,
            "<h3>🔧 Agent Tools Execution</h3><p>The agent used <b>{}</b> out of {} available tools</p>",
            report.tool_count, report.tools_available
        );
        for (i, call) in report.calls.iter().enumerate() {
            render_call(out, i + 1, call);
        }
    }

    out.push_str("<h3>💡 Final Fraud Assessment</h3>\n");
    match &report.final_answer {
        Some(answer) => {
            let _ = writeln!(out, r#"<div class="card"><pre>{}</pre></div>"#, escape_html(answer));
        }
        None => out.push_str(
            r#"<div class="card ok"><b>✓ Agent completed analysis. Check tool outputs above for details.</b></div>"#,
        ),
    }

    if !report.thoughts.is_empty() {
        out.push_str("<details class=\"card\"><summary>Intermediate thoughts</summary>");
        for thought in &report.thoughts {
            let _ = write!(out, "<pre>{}</pre>", escape_html(thought));
        }
        out.push_str("</details>\n");
    }

    let _ = writeln!(
        out,
        r#"<h3>📊 Performance Metrics</h3><div class="metrics">
<div class="card"><div class="metric">{tools}</div>Tools Used</div>
<div class="card"><div class="metric">{ms}ms</div>Processing Time</div>
<div class="card"><div class="metric">{cost}</div>Estimated Cost</div></div>"#,
        tools = report.tools_used_label(),
        ms = report.elapsed_ms,
        cost = report.cost_label(),
    );

    out.push_str("<details class=\"card\"><summary>🔍 Debug: Raw Agent Messages</summary>");
    for (i, digest) in report.messages.iter().enumerate() {
        let _ = write!(
            out,
            "<p><b>Message {}:</b> {}<br>Content: {}",
            i + 1,
            digest.kind,
            escape_html(&digest.content)
        );
        if digest.tool_calls > 0 {
            let _ = write!(out, "<br>Tool calls: {}", digest.tool_calls);
        }
        out.push_str("</p><hr>");
    }
    let _ = writeln!(out, "<small>Request {}</small></details>", report.request_id);
}

/// Claim analysis page: form plus the outcome of the last submission.
pub fn analysis_page(
    status: &ConnectionStatus,
    settings: &Settings,
    claim_text: &str,
    selected: Option<&SampleClaim>,
    outcome: AnalysisOutcome<'_>,
) -> String {
    let mut body = String::from("<h1>📊 Claim Analysis</h1>\n");
    body.push_str(&claim_form(claim_text, selected));

    match outcome {
        AnalysisOutcome::None => {}
        AnalysisOutcome::Report(report) => render_report(&mut body, report),
        AnalysisOutcome::Error(message) => {
            let _ = writeln!(
                body,
                r#"<div class="error"><b>Error running agent</b><pre>{}</pre></div>"#,
                escape_html(message)
            );
        }
    }

    body.push_str("<details class=\"card\"><summary>💡 Example Healthcare Claims Library</summary>\n");
    body.push_str(&sample_library());
    body.push_str("</details>\n");

    layout("Claim Analysis", status, settings, &body)
}
