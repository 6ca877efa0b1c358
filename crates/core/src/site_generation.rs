//! Helpers for the AI site builder: the generation brief and the response
//! shapes that count as success.

use serde_json::Value;

use crate::questionnaire::Answers;

/// Statuses the builder uses to report that generation started or finished.
const SUCCESS_STATUSES: &[&str] = &["success", "ok", "completed", "complete", "generating", "queued"];

/// Keys whose non-empty string value identifies the generated site.
const SITE_KEYS: &[&str] = &["site_id", "siteId", "url", "website_url", "websiteUrl", "preview_url"];

/// Answers included in the generation brief, with their headings.
const BRIEF_FIELDS: &[(&str, &str)] = &[
    ("businessName", "Business name"),
    ("businessType", "Business type"),
    ("businessTypeOther", "Business type details"),
    ("businessDescription", "About the business"),
    ("targetAudience", "Target audience"),
    ("services", "Services"),
    ("stylePreferences", "Preferred styles"),
    ("brandColors", "Brand colors"),
    ("pagesNeeded", "Pages"),
    ("additionalNotes", "Notes"),
];

/// Whether a builder response reports success.
///
/// The builder has returned several shapes over time: `{success: true}`,
/// `{status: "ok"}`, a bare site object, or any of those nested under
/// `data`.
pub fn is_generation_success(response: &Value) -> bool {
    if response.get("success").and_then(Value::as_bool) == Some(true) {
        return true;
    }
    if response
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| SUCCESS_STATUSES.contains(&s.to_ascii_lowercase().as_str()))
    {
        return true;
    }
    if site_reference(response).is_some() {
        return true;
    }
    response.get("data").is_some_and(is_generation_success)
}

/// The first non-empty site identifier or URL in a response.
pub fn site_reference(response: &Value) -> Option<String> {
    SITE_KEYS
        .iter()
        .filter_map(|key| response.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .or_else(|| response.get("data").and_then(site_reference))
}

/// Plain-text brief sent to the builder, one section per answered field.
pub fn build_brief(answers: &Answers) -> String {
    BRIEF_FIELDS
        .iter()
        .filter_map(|(key, heading)| {
            let text = answer_text(answers.get(*key)?)?;
            Some(format!("{heading}: {text}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn answer_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn recognizes_each_success_shape() {
        assert!(is_generation_success(&json!({ "success": true })));
        assert!(is_generation_success(&json!({ "status": "OK" })));
        assert!(is_generation_success(&json!({ "site_id": "abc" })));
        assert!(is_generation_success(&json!({ "data": { "websiteUrl": "https://x.site" } })));
        assert!(is_generation_success(&json!({ "data": { "status": "generating" } })));
    }

    #[test]
    fn rejects_failure_shapes() {
        assert!(!is_generation_success(&json!({ "success": false })));
        assert!(!is_generation_success(&json!({ "status": "error", "message": "quota" })));
        assert!(!is_generation_success(&json!({ "site_id": "" })));
        assert!(!is_generation_success(&json!(null)));
    }

    #[test]
    fn site_reference_searches_nested_data() {
        assert_eq!(
            site_reference(&json!({ "data": { "url": "https://x.site" } })).as_deref(),
            Some("https://x.site")
        );
        assert_eq!(site_reference(&json!({ "siteId": 42 })).as_deref(), Some("42"));
    }

    #[test]
    fn brief_lists_answered_fields_in_order() {
        let answers = json!({
            "businessName": "Crumb & Co",
            "services": [{ "name": "Cakes" }, { "name": "Bread" }],
            "pagesNeeded": ["home", "menu"],
            "brandColors": "  ",
        })
        .as_object()
        .cloned()
        .unwrap();
        assert_eq!(
            build_brief(&answers),
            "Business name: Crumb & Co\nServices: Cakes, Bread\nPages: home, menu"
        );
    }
}
