//! Answer validation and merging.
//!
//! Answers are kept as loosely-typed JSON because their shape depends on the
//! question kind. Structured kinds are decoded into the typed records below
//! only for validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidateEmail;

use super::{Question, QuestionKind};
use crate::error::FieldError;
use crate::plans::PlanTier;

/// Question id → answer value.
pub type Answers = serde_json::Map<String, Value>;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ().\-]{5,18}[0-9]$").expect("valid regex"));

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$").expect("valid regex")
});

static MAILBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9](?:[a-z0-9._-]{0,62})$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Structured answer shapes
// ---------------------------------------------------------------------------

/// Reference to an uploaded file, as stored in the answer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub name: String,
    pub url: String,
    pub mime_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub bio: Option<String>,
    pub photo: Option<FileRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceOffering {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub price: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialLink {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub url: String,
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Merge `incoming` into `stored`, key by key. Incoming values win; keys only
/// present in `stored` are kept so answers to currently hidden questions
/// survive.
pub fn merge_answers(stored: &mut Answers, incoming: Answers) {
    for (key, value) in incoming {
        stored.insert(key, value);
    }
}

/// Whether a value counts as an answer at all.
pub fn is_answered(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate one answer against its question.
///
/// Unanswered optional questions pass. Errors carry the question id as the
/// field name and a message meant for display next to the input.
pub fn validate_answer(
    question: &Question,
    value: Option<&Value>,
    plan: Option<PlanTier>,
) -> Result<(), FieldError> {
    if !is_answered(value) {
        return if question.required {
            Err(field_error(question, format!("{} is required", question.label)))
        } else {
            Ok(())
        };
    }
    let Some(value) = value else {
        return Ok(());
    };

    match question.kind {
        QuestionKind::Text | QuestionKind::Textarea => {
            expect_str(question, value)?;
        }
        QuestionKind::Email => {
            let email = expect_str(question, value)?;
            if !email.trim().validate_email() {
                return Err(field_error(question, "Please enter a valid email address"));
            }
        }
        QuestionKind::Phone => {
            let phone = expect_str(question, value)?;
            if !PHONE_RE.is_match(phone.trim()) {
                return Err(field_error(question, "Please enter a valid phone number"));
            }
        }
        QuestionKind::Domain => {
            let domain = expect_str(question, value)?;
            if !is_valid_domain(domain) {
                return Err(field_error(
                    question,
                    "Please enter a valid domain name, such as example.com",
                ));
            }
        }
        QuestionKind::Select | QuestionKind::Radio => {
            let choice = expect_str(question, value)?;
            if !question.options.contains(&choice) {
                return Err(field_error(question, format!("'{choice}' is not one of the available options")));
            }
        }
        QuestionKind::MultiSelect => {
            let choices = expect_str_array(question, value)?;
            if let Some(bad) = choices.iter().find(|c| !question.options.contains(c)) {
                return Err(field_error(question, format!("'{bad}' is not one of the available options")));
            }
        }
        QuestionKind::ProfessionalEmails => {
            validate_mailboxes(question, value, plan)?;
        }
        QuestionKind::TeamMembers => {
            let members: Vec<TeamMember> = decode(question, value, "team members")?;
            for (i, member) in members.iter().enumerate() {
                if member.name.trim().is_empty() || member.role.trim().is_empty() {
                    return Err(field_error(
                        question,
                        format!("Team member {} needs a name and a role", i + 1),
                    ));
                }
            }
        }
        QuestionKind::Services => {
            let services: Vec<ServiceOffering> = decode(question, value, "services")?;
            if let Some(i) = services.iter().position(|s| s.name.trim().is_empty()) {
                return Err(field_error(question, format!("Service {} needs a name", i + 1)));
            }
        }
        QuestionKind::SocialLinks => {
            let links: Vec<SocialLink> = decode(question, value, "social links")?;
            for link in &links {
                if link.platform.trim().is_empty() {
                    return Err(field_error(question, "Each social link needs a platform"));
                }
                if !is_http_url(&link.url) {
                    return Err(field_error(
                        question,
                        format!("The {} link must start with http:// or https://", link.platform),
                    ));
                }
            }
        }
        QuestionKind::File => {
            let file: FileRef = decode(question, value, "file")?;
            check_file_ref(question, &file)?;
        }
        QuestionKind::MultiFile => {
            let files: Vec<FileRef> = decode(question, value, "files")?;
            for file in &files {
                check_file_ref(question, file)?;
            }
        }
    }

    Ok(())
}

/// Validate every visible question before final submission.
pub fn validate_submission(
    visible: &[&Question],
    answers: &Answers,
    plan: Option<PlanTier>,
) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = visible
        .iter()
        .filter_map(|q| validate_answer(q, answers.get(q.id), plan).err())
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Lowercase domain name check (`example.com`, `shop.example.co.uk`).
pub fn is_valid_domain(domain: &str) -> bool {
    let domain = domain.trim().to_ascii_lowercase();
    domain.len() <= 253 && DOMAIN_RE.is_match(&domain)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn field_error(question: &Question, message: impl Into<String>) -> FieldError {
    FieldError::new(question.id, message)
}

fn expect_str<'v>(question: &Question, value: &'v Value) -> Result<&'v str, FieldError> {
    value
        .as_str()
        .ok_or_else(|| field_error(question, format!("{} must be text", question.label)))
}

fn expect_str_array<'v>(question: &Question, value: &'v Value) -> Result<Vec<&'v str>, FieldError> {
    value
        .as_array()
        .and_then(|items| items.iter().map(Value::as_str).collect::<Option<Vec<_>>>())
        .ok_or_else(|| field_error(question, format!("{} must be a list of choices", question.label)))
}

fn decode<T: serde::de::DeserializeOwned>(
    question: &Question,
    value: &Value,
    what: &str,
) -> Result<T, FieldError> {
    serde_json::from_value(value.clone())
        .map_err(|_| field_error(question, format!("The {what} provided are not in the expected format")))
}

fn validate_mailboxes(
    question: &Question,
    value: &Value,
    plan: Option<PlanTier>,
) -> Result<(), FieldError> {
    let mailboxes = expect_str_array(question, value)?;
    let slots = plan.unwrap_or(PlanTier::Launch).professional_email_slots();
    if mailboxes.len() > slots {
        let noun = if slots == 1 { "address" } else { "addresses" };
        return Err(field_error(
            question,
            format!("Your plan includes {slots} professional email {noun}"),
        ));
    }

    let mut seen: Vec<String> = Vec::with_capacity(mailboxes.len());
    for mailbox in mailboxes {
        let normalized = mailbox.trim().to_ascii_lowercase();
        if !MAILBOX_RE.is_match(&normalized) {
            return Err(field_error(question, format!("'{mailbox}' is not a valid mailbox name")));
        }
        if seen.contains(&normalized) {
            return Err(field_error(question, format!("'{mailbox}' is listed more than once")));
        }
        seen.push(normalized);
    }
    Ok(())
}

fn check_file_ref(question: &Question, file: &FileRef) -> Result<(), FieldError> {
    if file.name.is_empty() || file.url.is_empty() || file.mime_type.is_empty() {
        return Err(field_error(question, "The uploaded file reference is incomplete"));
    }
    Ok(())
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("https://") && url.len() > "https://".len())
        || (url.starts_with("http://") && url.len() > "http://".len())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::questionnaire::find_question;

    fn q(id: &str) -> &'static Question {
        find_question(id).expect("question exists")
    }

    #[test]
    fn merge_keeps_unshared_keys_and_prefers_second_write() {
        let mut stored = json!({ "businessName": "Old", "hasDomain": "yes", "existingDomain": "a.com" })
            .as_object()
            .cloned()
            .unwrap();
        let incoming = json!({ "businessName": "New", "hasDomain": "no" })
            .as_object()
            .cloned()
            .unwrap();

        merge_answers(&mut stored, incoming);

        assert_eq!(stored["businessName"], "New");
        assert_eq!(stored["hasDomain"], "no");
        assert_eq!(stored["existingDomain"], "a.com");
    }

    #[test]
    fn required_question_rejects_blank_answer() {
        let err = validate_answer(q("businessName"), Some(&json!("   ")), None).unwrap_err();
        assert_eq!(err.field, "businessName");
        assert!(err.message.contains("required"));
    }

    #[test]
    fn optional_question_accepts_missing_answer() {
        assert!(validate_answer(q("contactPhone"), None, None).is_ok());
    }

    #[test]
    fn email_and_phone_formats() {
        assert!(validate_answer(q("contactEmail"), Some(&json!("owner@shop.com")), None).is_ok());
        assert!(validate_answer(q("contactEmail"), Some(&json!("owner@")), None).is_err());
        assert!(validate_answer(q("contactPhone"), Some(&json!("+1 (555) 123-4567")), None).is_ok());
        assert!(validate_answer(q("contactPhone"), Some(&json!("call me")), None).is_err());
    }

    #[test]
    fn select_must_use_listed_option() {
        assert!(validate_answer(q("businessType"), Some(&json!("retail")), None).is_ok());
        let err = validate_answer(q("businessType"), Some(&json!("casino")), None).unwrap_err();
        assert!(err.message.contains("casino"));
    }

    #[test]
    fn multiselect_rejects_unknown_entries() {
        let ok = json!(["modern", "bold"]);
        let bad = json!(["modern", "grunge"]);
        assert!(validate_answer(q("stylePreferences"), Some(&ok), None).is_ok());
        assert!(validate_answer(q("stylePreferences"), Some(&bad), None).is_err());
    }

    #[test]
    fn domain_format() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("Shop.Example.co.uk"));
        assert!(!is_valid_domain("no spaces.com"));
        assert!(!is_valid_domain("localhost"));
    }

    #[test]
    fn launch_plan_allows_one_professional_email() {
        let question = q("professionalEmails");
        assert!(validate_answer(question, Some(&json!(["info"])), Some(PlanTier::Launch)).is_ok());
        let err = validate_answer(question, Some(&json!(["info", "sales"])), Some(PlanTier::Launch))
            .unwrap_err();
        assert_eq!(err.message, "Your plan includes 1 professional email address");
    }

    #[test]
    fn business_plan_allows_three_professional_emails() {
        let question = q("professionalEmails");
        let three = json!(["info", "sales", "hello"]);
        let four = json!(["info", "sales", "hello", "jobs"]);
        assert!(validate_answer(question, Some(&three), Some(PlanTier::Business)).is_ok());
        let err = validate_answer(question, Some(&four), Some(PlanTier::Business)).unwrap_err();
        assert_eq!(err.message, "Your plan includes 3 professional email addresses");
    }

    #[test]
    fn duplicate_mailboxes_are_rejected() {
        let question = q("professionalEmails");
        let dupes = json!(["info", "INFO"]);
        assert!(validate_answer(question, Some(&dupes), Some(PlanTier::Business)).is_err());
    }

    #[test]
    fn team_members_need_name_and_role() {
        let question = q("teamMembers");
        let ok = json!([{ "name": "Ada", "role": "Owner" }]);
        let missing_role = json!([{ "name": "Ada", "role": "Owner" }, { "name": "Bob" }]);
        assert!(validate_answer(question, Some(&ok), None).is_ok());
        let err = validate_answer(question, Some(&missing_role), None).unwrap_err();
        assert_eq!(err.message, "Team member 2 needs a name and a role");
    }

    #[test]
    fn social_links_need_http_urls() {
        let question = q("socialLinks");
        let ok = json!([{ "platform": "instagram", "url": "https://instagram.com/shop" }]);
        let bad = json!([{ "platform": "instagram", "url": "instagram.com/shop" }]);
        assert!(validate_answer(question, Some(&ok), None).is_ok());
        assert!(validate_answer(question, Some(&bad), None).is_err());
    }

    #[test]
    fn file_answers_must_be_complete_references() {
        let question = q("logoUpload");
        let ok = json!({ "name": "logo.png", "url": "https://cdn/logo.png", "mimeType": "image/png", "size": 1024 });
        let bad = json!({ "name": "logo.png" });
        assert!(validate_answer(question, Some(&ok), None).is_ok());
        assert!(validate_answer(question, Some(&bad), None).is_err());
    }

    #[test]
    fn submission_collects_every_error() {
        let visible = vec![q("businessName"), q("contactEmail"), q("contactPhone")];
        let answers = json!({ "contactEmail": "nope" }).as_object().cloned().unwrap();
        let errors = validate_submission(&visible, &answers, None).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["businessName", "contactEmail"]);
    }
}
