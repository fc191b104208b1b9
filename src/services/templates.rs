// src/services/templates.rs

use std::collections::HashMap;

/// Substitute `{{name}}` placeholders. Unknown placeholders are left in place
/// so a half-filled template is visible rather than silently blanked.
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

/// Minimal HTML escaping for user-entered text interpolated into documents.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_all_occurrences() {
        let out = render_template(
            "Hello {{name}}, your event {{name}} on {{date}}",
            &vars(&[("name", "Dana"), ("date", "2026-06-20")]),
        );
        assert_eq!(out, "Hello Dana, your event Dana on 2026-06-20");
    }

    #[test]
    fn unknown_placeholders_stay_visible() {
        let out = render_template("Hi {{name}}, see {{missing}}", &vars(&[("name", "Dana")]));
        assert_eq!(out, "Hi Dana, see {{missing}}");
    }

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(
            escape_html(r#"<b>"A&B"</b>"#),
            "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;"
        );
    }
}
