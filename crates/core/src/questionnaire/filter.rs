//! Visibility rules and category ordering.

use serde_json::Value;

use super::{Answers, Condition, Expected, Question};
use crate::plans::PlanTier;

/// Category display order. Unknown categories sort after all of these.
pub const CATEGORY_ORDER: &[&str] = &[
    "basics",
    "business_type",
    "domain",
    "email",
    "branding",
    "content",
    "services",
    "team",
    "social",
    "media",
    "features",
    "additional_info",
];

/// Position of a category in [`CATEGORY_ORDER`], or one past the end.
pub fn category_rank(category: &str) -> usize {
    CATEGORY_ORDER
        .iter()
        .position(|c| *c == category)
        .unwrap_or(CATEGORY_ORDER.len())
}

/// Whether a single question is shown for this plan and answer set.
///
/// A plan restriction is checked first: a user without a plan never sees a
/// plan-restricted question. A question whose condition refers to an
/// unanswered question is hidden.
pub fn is_visible(question: &Question, plan: Option<PlanTier>, answers: &Answers) -> bool {
    if let Some(allowed) = question.plans {
        match plan {
            Some(plan) if allowed.contains(&plan) => {}
            _ => return false,
        }
    }

    match question.condition {
        None => true,
        Some(condition) => condition_holds(&condition, answers),
    }
}

/// Filter `catalog` down to the questions this user should see, ordered by
/// category priority. The sort is stable, so questions keep their catalog
/// order within a category.
pub fn visible_questions<'a>(
    catalog: &'a [Question],
    plan: Option<PlanTier>,
    answers: &Answers,
) -> Vec<&'a Question> {
    let mut visible: Vec<&Question> = catalog
        .iter()
        .filter(|q| is_visible(q, plan, answers))
        .collect();
    visible.sort_by_key(|q| category_rank(q.category));
    visible
}

fn condition_holds(condition: &Condition, answers: &Answers) -> bool {
    let Some(answer) = answers.get(condition.question_id) else {
        return false;
    };
    match condition.expected {
        Expected::One(expected) => answer_matches(answer, &[expected]),
        Expected::AnyOf(expected) => answer_matches(answer, expected),
    }
}

/// A scalar answer matches when it equals one of `expected`; an array answer
/// matches when any of its elements does.
fn answer_matches(answer: &Value, expected: &[&str]) -> bool {
    match answer {
        Value::Array(items) => items.iter().any(|item| scalar_matches(item, expected)),
        other => scalar_matches(other, expected),
    }
}

fn scalar_matches(value: &Value, expected: &[&str]) -> bool {
    match value {
        Value::String(s) => !s.is_empty() && expected.contains(&s.as_str()),
        Value::Bool(b) => {
            let as_text = if *b { ["true", "yes"] } else { ["false", "no"] };
            as_text.iter().any(|t| expected.contains(t))
        }
        Value::Number(n) => expected.contains(&n.to_string().as_str()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::plans::ALL_PLANS;
    use crate::questionnaire::catalog::QUESTIONS;
    use crate::questionnaire::QuestionKind;

    fn answers(value: Value) -> Answers {
        value.as_object().cloned().unwrap_or_default()
    }

    fn ids(questions: &[&Question]) -> Vec<&'static str> {
        questions.iter().map(|q| q.id).collect()
    }

    fn question(id: &'static str, category: &'static str) -> Question {
        Question {
            id,
            category,
            kind: QuestionKind::Text,
            label: id,
            required: false,
            options: &[],
            condition: None,
            plans: None,
        }
    }

    #[test]
    fn plan_restricted_questions_never_leak_to_other_plans() {
        let everything = answers(json!({
            "businessType": "restaurant",
            "onlineOrdering": "yes",
            "pagesNeeded": ["home", "blog"],
        }));
        for plan in ALL_PLANS {
            for q in visible_questions(QUESTIONS, Some(*plan), &everything) {
                if let Some(allowed) = q.plans {
                    assert!(allowed.contains(plan), "{} leaked to {:?}", q.id, plan);
                }
            }
        }
    }

    #[test]
    fn no_plan_hides_all_plan_restricted_questions() {
        let visible = visible_questions(QUESTIONS, None, &Answers::new());
        assert!(visible.iter().all(|q| q.plans.is_none()));
    }

    #[test]
    fn unanswered_condition_hides_dependent_question() {
        let visible = visible_questions(QUESTIONS, Some(PlanTier::Enterprise), &Answers::new());
        let visible = ids(&visible);
        assert!(!visible.contains(&"existingDomain"));
        assert!(!visible.contains(&"desiredDomain"));
        assert!(!visible.contains(&"businessTypeOther"));
    }

    #[test]
    fn empty_answers_fail_closed() {
        let given = answers(json!({ "hasDomain": "", "pagesNeeded": [] }));
        let visible = ids(&visible_questions(QUESTIONS, Some(PlanTier::Business), &given));
        assert!(!visible.contains(&"existingDomain"));
        assert!(!visible.contains(&"blogTopics"));
    }

    #[test]
    fn equality_condition_selects_branch() {
        let given = answers(json!({ "hasDomain": "yes" }));
        let visible = ids(&visible_questions(QUESTIONS, Some(PlanTier::Launch), &given));
        assert!(visible.contains(&"existingDomain"));
        assert!(visible.contains(&"domainRegistrar"));
        assert!(!visible.contains(&"desiredDomain"));
    }

    #[test]
    fn array_expectation_matches_any_member() {
        for business in ["restaurant", "retail"] {
            let given = answers(json!({ "businessType": business }));
            let visible = ids(&visible_questions(QUESTIONS, Some(PlanTier::Launch), &given));
            assert!(visible.contains(&"onlineOrdering"), "missing for {business}");
        }
        let given = answers(json!({ "businessType": "creative" }));
        let visible = ids(&visible_questions(QUESTIONS, Some(PlanTier::Launch), &given));
        assert!(!visible.contains(&"onlineOrdering"));
    }

    #[test]
    fn array_answer_matches_when_it_contains_expected() {
        let given = answers(json!({ "pagesNeeded": ["home", "blog"] }));
        let business = ids(&visible_questions(QUESTIONS, Some(PlanTier::Business), &given));
        assert!(business.contains(&"blogTopics"));

        let launch = ids(&visible_questions(QUESTIONS, Some(PlanTier::Launch), &given));
        assert!(!launch.contains(&"blogTopics"), "plan gate applies before condition");
    }

    #[test]
    fn boolean_answers_match_yes_no_expectations() {
        let given = answers(json!({ "hasLogo": true }));
        let visible = ids(&visible_questions(QUESTIONS, Some(PlanTier::Launch), &given));
        assert!(visible.contains(&"logoUpload"));
    }

    #[test]
    fn output_follows_category_priority() {
        let given = answers(json!({ "businessType": "retail", "onlineOrdering": "yes" }));
        let visible = visible_questions(QUESTIONS, Some(PlanTier::Enterprise), &given);
        let ranks: Vec<usize> = visible.iter().map(|q| category_rank(q.category)).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted);
        assert_eq!(visible.first().map(|q| q.id), Some("businessName"));
        assert_eq!(visible.last().map(|q| q.id), Some("additionalNotes"));
    }

    #[test]
    fn unknown_categories_keep_relative_order_at_end() {
        let catalog = [
            question("z1", "mystery"),
            question("b1", "basics"),
            question("z2", "elsewhere"),
            question("d1", "domain"),
            question("b2", "basics"),
        ];
        let visible = visible_questions(&catalog, None, &Answers::new());
        assert_eq!(ids(&visible), vec!["b1", "b2", "d1", "z1", "z2"]);
    }
}
