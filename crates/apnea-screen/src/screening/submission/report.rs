use std::fmt::Write as _;

use super::payload::SubmissionPayload;

/// Render the operator-facing consultation report attached to the email
/// notification. Carries every field the notification contract requires:
/// subject identity, all five answers, BMI, score, risk level, priority, and
/// the session id.
pub fn render_report_html(payload: &SubmissionPayload) -> String {
    let mut html = String::new();

    writeln!(html, "<h1>New consultation request</h1>").expect("write heading");
    writeln!(
        html,
        "<p>Sleep apnea screening submitted {}</p>",
        payload.metadata.submitted_at.format("%Y-%m-%d %H:%M UTC")
    )
    .expect("write timestamp");

    html.push_str("<h2>Subject</h2><ul>");
    row(&mut html, "Name", &payload.name);
    row(&mut html, "Age", &payload.age.to_string());
    row(&mut html, "Phone", &payload.phone);
    row(&mut html, "Sex", &payload.sex);
    html.push_str("</ul>");

    html.push_str("<h2>Questionnaire</h2><ul>");
    row(&mut html, "Snoring", &payload.snoring);
    row(&mut html, "Tiredness", &payload.tiredness);
    row(&mut html, "Observed apnea", &payload.observed_apnea);
    row(&mut html, "Hypertension", &payload.hypertension);
    row(&mut html, "Neck circumference", &payload.neck_circumference);
    html.push_str("</ul>");

    html.push_str("<h2>Assessment</h2><ul>");
    row(
        &mut html,
        "BMI",
        &format!("{:.1} ({})", payload.bmi, payload.bmi_category),
    );
    row(
        &mut html,
        "Score",
        &format!("{}/{}", payload.raw_score, payload.max_score),
    );
    row(&mut html, "Risk level", &payload.risk_level);
    row(&mut html, "Priority", &payload.priority);
    row(&mut html, "Follow-up needed", &payload.follow_up_needed);
    html.push_str("</ul>");

    writeln!(html, "<p>{}</p>", escape_html(&payload.risk_category))
        .expect("write risk category");
    writeln!(
        html,
        "<p><em>Session {}</em></p>",
        escape_html(&payload.metadata.session_id)
    )
    .expect("write session id");

    html
}

fn row(html: &mut String, label: &str, value: &str) {
    writeln!(
        html,
        "<li><strong>{}:</strong> {}</li>",
        label,
        escape_html(value)
    )
    .expect("write report row");
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
