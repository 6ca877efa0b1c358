//! Business questionnaire: question definitions, visibility rules, answer
//! validation and navigation.
//!
//! The question list is static and code-defined ([`catalog::QUESTIONS`]).
//! What a user actually sees is recomputed on every request from their plan
//! and stored answers by [`filter::visible_questions`]; nothing about the
//! sequence itself is persisted apart from the current index.

pub mod answers;
pub mod catalog;
pub mod filter;

use serde::{Deserialize, Serialize};

use crate::plans::PlanTier;

pub use answers::{merge_answers, validate_answer, validate_submission, Answers};
pub use filter::{is_visible, visible_questions};

/// Delay clients should wait after the last change before auto-saving.
pub const AUTOSAVE_DEBOUNCE_MS: u64 = 1500;

// ---------------------------------------------------------------------------
// Question definitions
// ---------------------------------------------------------------------------

/// Input type of a question, which also determines the answer's JSON shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Text,
    Textarea,
    Email,
    Phone,
    Domain,
    Select,
    Radio,
    MultiSelect,
    ProfessionalEmails,
    TeamMembers,
    Services,
    SocialLinks,
    File,
    MultiFile,
}

impl QuestionKind {
    /// Whether answers to this kind are produced by the upload endpoint.
    pub fn is_upload(self) -> bool {
        matches!(self, Self::File | Self::MultiFile)
    }
}

/// Expected value(s) of the referenced answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Expected {
    One(&'static str),
    AnyOf(&'static [&'static str]),
}

/// Show a question only when an earlier answer has a given value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub question_id: &'static str,
    pub expected: Expected,
}

/// A single static question definition.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub category: &'static str,
    pub kind: QuestionKind,
    pub label: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Plans that may see this question. `None` means every plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plans: Option<&'static [PlanTier]>,
}

fn no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

/// Look up a question definition by id.
pub fn find_question(id: &str) -> Option<&'static Question> {
    catalog::QUESTIONS.iter().find(|q| q.id == id)
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Previous,
}

/// Compute the index to show after moving one step in `direction`.
///
/// The result always lies inside `0..len` (or is `0` for an empty sequence),
/// even when `current` points past the end because earlier answers hid
/// questions in the meantime.
pub fn step_index(current: usize, direction: Direction, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len - 1;
    let current = current.min(last);
    match direction {
        Direction::Next => (current + 1).min(last),
        Direction::Previous => current.saturating_sub(1),
    }
}
