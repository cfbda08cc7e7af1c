//! HTTP file generator - converts test cases to .http format

use crate::testcase::{BodyMatcher, TestCase};

/// Generate .http file content from test cases
#[must_use]
pub fn to_http_file(cases: &[TestCase], base_url_var: &str) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "# Auto-generated test cases ({} cases)",
        cases.len()
    ));
    lines.push(format!("# Base URL variable: {{{{{base_url_var}}}}}"));
    lines.push(String::new());

    for case in cases {
        lines.push(format!("### {}", case.name));
        lines.push(format!(
            "# {} - expect {}",
            case.preparator, case.expected.status
        ));
        if let Some(BodyMatcher::Text(text)) = &case.expected.body {
            lines.push(format!("# expected body: {text}"));
        }

        lines.push(format!(
            "{} {{{{{base_url_var}}}}}{}",
            case.request.method, case.request.path
        ));

        for (key, value) in &case.request.headers {
            lines.push(format!("{key}: {value}"));
        }

        if let Some(body) = &case.request.body {
            let has_content_type = case
                .request
                .headers
                .keys()
                .any(|k| k.eq_ignore_ascii_case("content-type"));
            if !has_content_type {
                lines.push(format!("Content-Type: {}", body.media_type));
            }
            lines.push(String::new());
            lines.push(render_body(&body.content));
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

fn render_body(content: &serde_json::Value) -> String {
    match content {
        serde_json::Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
