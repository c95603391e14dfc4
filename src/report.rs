//! Rendered HTML reports for the no-AI paths: the deterministic
//! classifier fallback and the "nothing today" notice.

use chrono::Local;

use crate::classify::Classified;
use crate::types::NormalizedEmail;

/// How much of each body shows up as a preview in the fallback report.
const PREVIEW_CHARS: usize = 150;

/// Render the fallback report from classified emails, high priority
/// first. Deterministic: same input, same output, modulo the generation
/// timestamp in the header.
pub fn render_fallback(classified: &Classified<'_>) -> String {
    let now = Local::now();
    let total = classified.total();

    let mut sections = String::new();
    sections.push_str(&render_section(
        "High priority: system & billing",
        "#f44336",
        &classified.system,
    ));
    sections.push_str(&render_section(
        "Medium priority: other",
        "#ff9800",
        &classified.other,
    ));
    sections.push_str(&render_section(
        "Low priority: marketing",
        "#4caf50",
        &classified.marketing,
    ));

    format!(
        r#"<html>
<head>
<meta charset="utf-8">
<style>
body {{ font-family: Arial, sans-serif; line-height: 1.6; padding: 20px; background: #f5f5f5; color: #333; }}
.container {{ max-width: 800px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; }}
.header {{ background: #455a64; color: white; padding: 20px; border-radius: 8px; }}
.summary {{ background: #e3f2fd; padding: 15px; border-radius: 8px; margin: 20px 0; }}
</style>
</head>
<body>
<div class="container">
<div class="header">
<h1>Daily mail digest</h1>
<p>{date} &middot; generated {time}</p>
</div>
<div class="summary">
<p><strong>{total}</strong> emails today &mdash; system/billing: {system}, other: {other}, marketing: {marketing}</p>
</div>
{sections}
</div>
</body>
</html>
"#,
        date = now.format("%Y-%m-%d"),
        time = now.format("%H:%M:%S"),
        total = total,
        system = classified.system.len(),
        other = classified.other.len(),
        marketing = classified.marketing.len(),
        sections = sections,
    )
}

/// Report used when the scan found no emails for the day.
pub fn render_no_emails() -> String {
    format!(
        r#"<html>
<head><meta charset="utf-8"></head>
<body style="font-family: Arial, sans-serif; padding: 20px;">
<h2>Daily mail digest</h2>
<p>{date}</p>
<p>No new emails today.</p>
</body>
</html>
"#,
        date = Local::now().format("%Y-%m-%d"),
    )
}

fn render_section(title: &str, color: &str, emails: &[&NormalizedEmail]) -> String {
    if emails.is_empty() {
        return String::new();
    }
    let mut out = format!(
        "<div style=\"margin-bottom: 30px;\">\n\
         <h3 style=\"color: {color}; border-bottom: 2px solid {color};\">{title} ({count})</h3>\n",
        color = color,
        title = title,
        count = emails.len(),
    );
    for email in emails {
        out.push_str(&render_item(email, color));
    }
    out.push_str("</div>\n");
    out
}

fn render_item(email: &NormalizedEmail, color: &str) -> String {
    let preview: String = email.body.chars().take(PREVIEW_CHARS).collect();
    let preview = if preview.is_empty() {
        "(no body)".to_string()
    } else {
        escape(&preview)
    };
    format!(
        "<div style=\"margin-bottom: 15px; padding: 12px; border-left: 4px solid {color}; background: #fafafa;\">\n\
         <h4 style=\"margin: 0 0 8px 0;\">{subject}</h4>\n\
         <p style=\"margin: 4px 0; color: #666;\">From: {from}<br>Time: {time}</p>\n\
         <p style=\"margin: 8px 0 0 0; color: #555;\">{preview}</p>\n\
         </div>\n",
        color = color,
        subject = escape(&email.subject),
        from = escape(&email.from),
        time = email.local_time_display(),
        preview = preview,
    )
}

/// Minimal HTML escaping for untrusted message text embedded in the
/// report.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
