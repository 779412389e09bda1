// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! HTML rendering for the single-page UI

use std::f64::consts::PI;

use crate::intake::{format_bytes, ClaimFile};
use crate::session::AnalysisState;
use crate::verdict::{Verdict, VerdictReport};

const RING_RADIUS: f64 = 45.0;

/// Escape text for HTML element and attribute content
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn base_template(title: &str, content: &str, auto_refresh: bool) -> String {
    let refresh = if auto_refresh {
        r#"<meta http-equiv="refresh" content="2">"#
    } else {
        ""
    };

    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {}
    <title>{} - AI Insurance Claim Validator</title>
    <style>
        :root {{
            --bg-primary: #f8fafc;
            --bg-card: #ffffff;
            --bg-muted: #f1f5f9;
            --text-primary: #0f172a;
            --text-secondary: #64748b;
            --accent: #2563eb;
            --accent-hover: #1d4ed8;
            --success: #22c55e;
            --warning: #eab308;
            --danger: #ef4444;
            --border: #e2e8f0;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }}
        header {{
            background: var(--bg-card);
            border-bottom: 1px solid var(--border);
            box-shadow: 0 1px 3px rgba(0,0,0,0.08);
            padding: 12px 20px;
            position: sticky;
            top: 0;
        }}
        header h1 {{ font-size: 1.4em; display: flex; align-items: center; gap: 10px; }}
        header .shield {{ color: var(--accent); }}
        .container {{ max-width: 1400px; margin: 0 auto; padding: 24px; }}
        .grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 32px; }}
        .card {{
            background: var(--bg-card);
            border: 1px solid var(--border);
            border-radius: 16px;
            box-shadow: 0 4px 12px rgba(0,0,0,0.06);
            padding: 24px;
        }}
        .panel {{ min-height: 400px; display: flex; align-items: center; justify-content: center; }}
        h2 {{ margin-bottom: 16px; }}
        .drop-zone {{
            display: flex;
            flex-direction: column;
            align-items: center;
            border: 2px dashed var(--border);
            border-radius: 10px;
            padding: 32px;
            text-align: center;
            cursor: pointer;
            transition: border-color 0.3s, background 0.3s;
        }}
        .drop-zone:hover {{ border-color: var(--accent); }}
        .drop-zone.dragging {{ border-color: var(--accent); background: #eff6ff; }}
        .drop-zone .upload-icon {{ font-size: 2.5em; color: var(--text-secondary); }}
        .drop-zone strong {{ color: var(--accent); }}
        .hint {{ font-size: 0.8em; color: var(--text-secondary); }}
        .file-list {{ list-style: none; margin-top: 12px; max-height: 240px; overflow-y: auto; }}
        .file-list li {{
            display: flex;
            align-items: center;
            justify-content: space-between;
            background: var(--bg-muted);
            border-radius: 6px;
            padding: 10px 12px;
            margin-bottom: 8px;
        }}
        .file-name {{ font-weight: 500; font-size: 0.9em; overflow: hidden; text-overflow: ellipsis; }}
        .file-size {{ font-size: 0.75em; color: var(--text-secondary); }}
        .remove {{ background: none; border: none; color: var(--text-secondary); cursor: pointer; font-size: 1.1em; }}
        .remove:hover {{ color: var(--danger); }}
        .analyze {{
            width: 100%;
            margin-top: 24px;
            padding: 12px;
            border: none;
            border-radius: 8px;
            background: var(--accent);
            color: white;
            font-size: 1.1em;
            font-weight: bold;
            cursor: pointer;
        }}
        .analyze:hover {{ background: var(--accent-hover); }}
        .analyze:disabled {{ background: #94a3b8; cursor: not-allowed; }}
        .reset {{ margin-top: 12px; background: none; border: none; color: var(--text-secondary); cursor: pointer; }}
        .error {{ color: var(--danger); background: #fee2e2; padding: 16px; border-radius: 8px; }}
        .loader {{ text-align: center; }}
        .spinner {{
            width: 64px;
            height: 64px;
            margin: 0 auto 16px;
            border: 4px dashed var(--accent);
            border-radius: 50%;
            animation: spin 1.5s linear infinite;
        }}
        @keyframes spin {{ to {{ transform: rotate(360deg); }} }}
        .get-started {{ text-align: center; padding: 32px; }}
        .get-started .shield {{ font-size: 5em; color: var(--accent); }}
        .get-started p {{ color: var(--text-secondary); max-width: 640px; margin: 0 auto; }}
        .result {{ width: 100%; display: flex; flex-direction: column; gap: 24px; }}
        .verdict {{ display: flex; align-items: center; gap: 12px; padding: 16px; border-radius: 8px; }}
        .verdict h2 {{ margin: 0; }}
        .verdict-valid {{ background: #dcfce7; color: #15803d; }}
        .verdict-suspicious {{ background: #fef9c3; color: #a16207; }}
        .verdict-invalid {{ background: #fee2e2; color: #b91c1c; }}
        .metrics {{ display: grid; grid-template-columns: 1fr 1fr; gap: 24px; }}
        .metric {{
            background: var(--bg-muted);
            border-radius: 8px;
            padding: 16px;
            display: flex;
            flex-direction: column;
            align-items: center;
            justify-content: center;
        }}
        .metric h3 {{ font-size: 0.8em; color: var(--text-secondary); margin-bottom: 8px; }}
        .payout {{ font-size: 2em; font-weight: bold; }}
        .ring {{ position: relative; width: 128px; height: 128px; display: flex; align-items: center; justify-content: center; }}
        .ring svg {{ position: absolute; inset: 0; }}
        .ring .score {{ font-size: 1.8em; font-weight: bold; }}
        .band-low {{ color: var(--success); }}
        .band-elevated {{ color: var(--warning); }}
        .band-high {{ color: var(--danger); }}
        .section {{ background: var(--bg-muted); border-radius: 8px; padding: 16px; }}
        .section p {{ font-size: 0.9em; color: var(--text-secondary); }}
        .checks {{ list-style: none; }}
        .checks li {{ font-size: 0.9em; margin-bottom: 6px; }}
        .check-pass {{ color: var(--text-secondary); }}
        .check-pass .mark {{ color: var(--success); }}
        .check-fail {{ color: var(--danger); font-weight: 600; }}
    </style>
</head>
<body>
    <header>
        <h1><span class="shield">&#x1F6E1;</span> AI Insurance Claim Validator</h1>
    </header>
    <main class="container">
        {}
    </main>
    <script>
        (function () {{
            var zone = document.getElementById('drop-zone');
            var input = document.getElementById('file-upload');
            var form = document.getElementById('upload-form');
            if (!zone || !input || !form) return;
            input.addEventListener('change', function () {{
                if (input.files.length > 0) form.submit();
            }});
            ['dragenter', 'dragover'].forEach(function (name) {{
                zone.addEventListener(name, function (e) {{
                    e.preventDefault();
                    e.stopPropagation();
                    zone.classList.add('dragging');
                }});
            }});
            zone.addEventListener('dragleave', function (e) {{
                e.preventDefault();
                e.stopPropagation();
                zone.classList.remove('dragging');
            }});
            zone.addEventListener('drop', function (e) {{
                e.preventDefault();
                e.stopPropagation();
                zone.classList.remove('dragging');
                if (e.dataTransfer.files && e.dataTransfer.files.length > 0) {{
                    input.files = e.dataTransfer.files;
                    form.submit();
                }}
            }});
        }})();
    </script>
</body>
</html>"#, refresh, title, content)
}

/// Full page: upload card on the left, result panel on the right
pub fn render_index(files: &[ClaimFile], state: &AnalysisState) -> String {
    let analyzing = state.is_analyzing();

    let content = format!(r#"
        <div class="grid">
            <div class="card">
                {}
            </div>
            <div class="card panel">
                {}
            </div>
        </div>
    "#, render_upload_card(files, analyzing, state), render_panel(state));

    base_template("Upload Documents", &content, analyzing)
}

fn render_upload_card(files: &[ClaimFile], analyzing: bool, state: &AnalysisState) -> String {
    let file_list = if files.is_empty() {
        String::new()
    } else {
        let items: String = files.iter()
            .map(|f| {
                let name = escape_html(&f.name);
                format!(r#"
                    <li>
                        <div>
                            <div class="file-name">&#x1F4C4; {}</div>
                            <div class="file-size">{}</div>
                        </div>
                        <form action="/files/remove" method="post">
                            <input type="hidden" name="name" value="{}">
                            <button class="remove" type="submit" aria-label="Remove {}">&#x1F5D1;</button>
                        </form>
                    </li>
                "#, name, format_bytes(f.size), name, name)
            })
            .collect();

        format!(r#"
            <h3 style="margin-top: 24px;">Uploaded Files:</h3>
            <ul class="file-list">{}</ul>
        "#, items)
    };

    let disabled = if analyzing || files.is_empty() { " disabled" } else { "" };
    let button_label = if analyzing {
        "Analyzing...".to_string()
    } else {
        format!("Analyze {} Document(s)", files.len())
    };

    let show_reset = !analyzing && (!files.is_empty() || !matches!(state, AnalysisState::Idle));
    let reset = if show_reset {
        r#"<form action="/reset" method="post"><button class="reset" type="submit">Start over</button></form>"#
    } else {
        ""
    };

    format!(r#"
        <h2>Upload Documents</h2>
        <form id="upload-form" action="/files" method="post" enctype="multipart/form-data">
            <label id="drop-zone" class="drop-zone" for="file-upload">
                <input type="file" id="file-upload" name="files" multiple accept="image/*,.pdf" hidden>
                <span class="upload-icon">&#x21EA;</span>
                <p><strong>Click to upload</strong> or drag and drop</p>
                <p class="hint">PDF, PNG, JPG, etc.</p>
            </label>
            <noscript><button type="submit">Upload</button></noscript>
        </form>
        {}
        <form action="/analyze" method="post">
            <button class="analyze" type="submit"{}>{}</button>
        </form>
        {}
    "#, file_list, disabled, button_label, reset)
}

/// Error, then loader, then result, then the get-started view
fn render_panel(state: &AnalysisState) -> String {
    match state {
        AnalysisState::Failed { message } => {
            format!(r#"<div class="error">{}</div>"#, escape_html(message))
        }
        AnalysisState::Analyzing { .. } => render_loader(),
        AnalysisState::Completed { report, .. } => render_result(report),
        AnalysisState::Idle => render_get_started(),
    }
}

fn render_loader() -> String {
    r#"
        <div class="loader">
            <div class="spinner"></div>
            <h3>Analyzing Documents...</h3>
            <p class="hint">The AI agents are at work. This may take a moment.</p>
        </div>
    "#.to_string()
}

fn render_get_started() -> String {
    r#"
        <div class="get-started">
            <div class="shield">&#x1F6E1;</div>
            <h2>AI Insurance Claim Validator</h2>
            <p>Upload your claim documents (PDFs, images of invoices, photos, etc.) and our AI agents
            will perform a comprehensive analysis for validity, fraud, and policy compliance.</p>
        </div>
    "#.to_string()
}

fn verdict_banner(verdict: Verdict) -> (&'static str, &'static str) {
    match verdict {
        Verdict::Valid => ("verdict-valid", "&#x2714;"),
        Verdict::Suspicious => ("verdict-suspicious", "&#x26A0;"),
        Verdict::Invalid => ("verdict-invalid", "&#x2716;"),
    }
}

fn render_fraud_ring(report: &VerdictReport) -> String {
    let circumference = 2.0 * PI * RING_RADIUS;
    let offset = circumference - (report.fraud_score / 100.0) * circumference;
    let band = format!("band-{}", report.fraud_band().label());

    format!(r##"
        <div class="ring">
            <svg viewBox="0 0 100 100">
                <circle stroke="#e2e8f0" stroke-width="10" fill="transparent" r="45" cx="50" cy="50"/>
                <circle class="{band}" stroke="currentColor" stroke-width="10" fill="transparent"
                        stroke-dasharray="{c:.2}" stroke-dashoffset="{o:.2}" stroke-linecap="round"
                        r="45" cx="50" cy="50" transform="rotate(-90 50 50)"/>
            </svg>
            <div class="score {band}">{score}</div>
        </div>
    "##, band = band, c = circumference, o = offset, score = report.display_score())
}

pub(crate) fn render_result(report: &VerdictReport) -> String {
    let (verdict_class, icon) = verdict_banner(report.final_verdict);

    let checks: String = report.policy_checks.items().iter()
        .map(|(label, passed)| {
            if *passed {
                format!(r#"<li class="check-pass"><span class="mark">&#x2714;</span> {}</li>"#, label)
            } else {
                format!(r#"<li class="check-fail"><span class="mark">&#x2716;</span> {}</li>"#, label)
            }
        })
        .collect();

    format!(r#"
        <div class="result">
            <div class="verdict {}">
                <span>{}</span>
                <h2>{}</h2>
            </div>
            <div class="metrics">
                <div class="metric">
                    <h3>FRAUD PROBABILITY</h3>
                    {}
                </div>
                <div class="metric">
                    <h3>ESTIMATED PAYOUT</h3>
                    <p class="payout">{}</p>
                </div>
            </div>
            <div class="section">
                <h3>Summary</h3>
                <p>{}</p>
            </div>
            <div class="section">
                <h3>Policy Rule Checks</h3>
                <ul class="checks">{}</ul>
            </div>
        </div>
    "#,
        verdict_class,
        icon,
        report.final_verdict.title(),
        render_fraud_ring(report),
        escape_html(&report.estimated_payout),
        escape_html(&report.summary),
        checks,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::PolicyChecks;

    fn report(score: f64) -> VerdictReport {
        VerdictReport {
            final_verdict: Verdict::Suspicious,
            fraud_score: score,
            summary: "Receipt total <script>alert(1)</script> differs".to_string(),
            estimated_payout: "$400".to_string(),
            policy_checks: PolicyChecks {
                policy_active: true,
                incident_covered: false,
                time_limit_ok: true,
            },
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_result_escapes_model_text() {
        let html = render_result(&report(55.0));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("Claim Suspicious"));
        assert!(html.contains("verdict-suspicious"));
        assert!(html.contains("band-elevated"));
    }

    #[test]
    fn test_failed_policy_check_is_flagged() {
        let html = render_result(&report(10.0));
        assert!(html.contains(r#"<li class="check-fail"><span class="mark">&#x2716;</span> Incident type is covered by policy</li>"#));
        assert!(html.contains("band-low"));
    }

    #[test]
    fn test_panel_precedence() {
        let idle = render_index(&[], &AnalysisState::Idle);
        assert!(idle.contains("Upload your claim documents"));
        assert!(idle.contains("Analyze 0 Document(s)</button>"));
        assert!(idle.contains(" disabled>"));

        let analyzing = render_index(&[], &AnalysisState::Analyzing { started_at: chrono::Utc::now() });
        assert!(analyzing.contains("Analyzing Documents..."));
        assert!(analyzing.contains(r#"http-equiv="refresh""#));
        assert!(analyzing.contains("Analyzing...</button>"));

        let failed = render_index(&[], &AnalysisState::Failed { message: "Nope & nope".to_string() });
        assert!(failed.contains(r#"<div class="error">Nope &amp; nope</div>"#));
        assert!(!failed.contains("Upload your claim documents"));
    }

    #[test]
    fn test_file_list_shows_sizes_and_enables_button() {
        let files = vec![ClaimFile {
            name: "claim \"form\".pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 1536,
            base64: String::new(),
        }];
        let html = render_index(&files, &AnalysisState::Idle);
        assert!(html.contains("1.5 KB"));
        assert!(html.contains("claim &quot;form&quot;.pdf"));
        assert!(html.contains(r#"<button class="analyze" type="submit">Analyze 1 Document(s)</button>"#));
    }
}
