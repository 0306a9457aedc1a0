use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use super::issue;
use crate::database::models::{NewOption, NewProblem, ProblemBody};
use crate::types::ProblemType;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProblemOptionPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Option label is required"))]
    pub label: String,

    #[serde(default)]
    pub is_correct: bool,
}

/// Body of `POST /api/tenants/{tenant}/problems`.
///
/// `validate()` covers the per-field rules. The rules tying `type` to
/// `options` and `textAnswer` are applied by [`ProblemPayload::into_problem`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProblemPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,

    /// Reported as `type` in field errors
    #[serde(rename = "type", default)]
    #[validate(required(message = "Problem type is required"))]
    pub type_: Option<ProblemType>,

    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<ProblemOptionPayload>,

    pub text_answer: Option<String>,
    pub explanation: Option<String>,
}

impl ProblemPayload {
    /// Check the type-dependent rules and convert into the typed form the store writes.
    pub fn into_problem(self) -> Result<NewProblem, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let correct = self.options.iter().filter(|o| o.is_correct).count();
        let problem_type = self.type_.unwrap_or(ProblemType::Text);

        match problem_type {
            ProblemType::Text => {
                let answer_missing = self
                    .text_answer
                    .as_deref()
                    .map_or(true, |answer| answer.trim().is_empty());
                if answer_missing {
                    errors.add("text_answer", issue("required", "A model answer is required for text problems"));
                }
                if !self.options.is_empty() {
                    errors.add("options", issue("not_allowed", "Text problems do not take options"));
                }
            }
            ProblemType::SingleChoice | ProblemType::MultipleChoice => {
                if self.options.len() < 2 {
                    errors.add("options", issue("too_few", "At least two options are required"));
                }
                if problem_type == ProblemType::SingleChoice && correct != 1 {
                    errors.add("options", issue("correct_count", "Mark exactly one option as correct"));
                }
                if problem_type == ProblemType::MultipleChoice && correct < 1 {
                    errors.add("options", issue("correct_count", "Mark at least one option as correct"));
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let options = || {
            self.options
                .iter()
                .map(|o| NewOption {
                    label: o.label.clone(),
                    is_correct: o.is_correct,
                })
                .collect::<Vec<_>>()
        };
        let body = match problem_type {
            ProblemType::Text => ProblemBody::Text {
                answer: self.text_answer.clone().unwrap_or_default(),
            },
            ProblemType::SingleChoice => ProblemBody::SingleChoice { options: options() },
            ProblemType::MultipleChoice => ProblemBody::MultipleChoice { options: options() },
        };

        Ok(NewProblem {
            title: self.title,
            prompt: self.prompt,
            explanation: self.explanation.filter(|e| !e.trim().is_empty()),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::flatten_errors;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> ProblemPayload {
        serde_json::from_value(value).unwrap()
    }

    fn option(label: &str, is_correct: bool) -> serde_json::Value {
        json!({ "label": label, "isCorrect": is_correct })
    }

    #[test]
    fn text_problem_needs_answer_and_no_options() {
        let missing = payload(json!({ "title": "T", "prompt": "P", "type": "text", "textAnswer": "  " }));
        assert!(missing.validate().is_ok());
        let errors = flatten_errors(&missing.into_problem().unwrap_err());
        assert!(errors.contains_key("textAnswer"));

        let with_options = payload(json!({
            "title": "T", "prompt": "P", "type": "text", "textAnswer": "42",
            "options": [option("a", true)],
        }));
        let errors = flatten_errors(&with_options.into_problem().unwrap_err());
        assert!(errors.contains_key("options"));

        let ok = payload(json!({ "title": "T", "prompt": "P", "type": "text", "textAnswer": "42" }))
            .into_problem()
            .unwrap();
        assert_eq!(ok.body, ProblemBody::Text { answer: "42".to_string() });
        assert!(ok.options().is_empty());
    }

    #[test]
    fn single_choice_needs_exactly_one_correct() {
        let none = payload(json!({
            "title": "T", "prompt": "P", "type": "single_choice",
            "options": [option("a", false), option("b", false)],
        }));
        assert!(none.into_problem().is_err());

        let two = payload(json!({
            "title": "T", "prompt": "P", "type": "single_choice",
            "options": [option("a", true), option("b", true)],
        }));
        assert!(two.into_problem().is_err());

        let one = payload(json!({
            "title": "T", "prompt": "P", "type": "single_choice",
            "options": [option("a", true), option("b", false)],
        }))
        .into_problem()
        .unwrap();
        assert_eq!(one.problem_type(), ProblemType::SingleChoice);
        assert_eq!(one.options().len(), 2);
        assert_eq!(one.answer_text(), None);
    }

    #[test]
    fn choice_problems_need_two_options() {
        let lonely = payload(json!({
            "title": "T", "prompt": "P", "type": "multiple_choice",
            "options": [option("a", true)],
        }));
        let errors = flatten_errors(&lonely.into_problem().unwrap_err());
        assert_eq!(errors["options"], vec!["At least two options are required".to_string()]);
    }

    #[test]
    fn multiple_choice_needs_a_correct_option() {
        let none = payload(json!({
            "title": "T", "prompt": "P", "type": "multiple_choice",
            "options": [option("a", false), option("b", false)],
        }));
        assert!(none.into_problem().is_err());

        let both = payload(json!({
            "title": "T", "prompt": "P", "type": "multiple_choice",
            "options": [option("a", true), option("b", true), option("c", false)],
        }))
        .into_problem()
        .unwrap();
        assert_eq!(both.options().iter().filter(|o| o.is_correct).count(), 2);
    }

    #[test]
    fn field_rules_cover_nested_options() {
        let p = payload(json!({
            "title": "", "prompt": "P",
            "options": [option("a", true), option("", false)],
        }));
        let errors = flatten_errors(&p.validate().unwrap_err());
        assert!(errors.contains_key("title"));
        assert_eq!(errors["type"], vec!["Problem type is required".to_string()]);
        assert!(errors.contains_key("options[1].label"));
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let p = payload(json!({
            "title": "T", "prompt": "P", "type": "text", "textAnswer": "x", "explanation": " ",
        }))
        .into_problem()
        .unwrap();
        assert_eq!(p.explanation, None);
    }
}
