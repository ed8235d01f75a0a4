// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::utils::html::clean_html;

/// A quiz question as delivered by the quiz API.
///
/// The question type is carried in the `type` field of the flattened
/// [`QuestionKind`], so the wire shape is a single flat object. Validation
/// only checks that the question can be graded: choice questions have
/// options and their correct labels are among them, short-text questions
/// accept at least one non-blank answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Question {
    pub id: String,

    /// The text shown to the user. May contain basic HTML.
    pub prompt: String,

    #[serde(flatten)]
    #[validate(custom(function = validate_kind))]
    pub kind: QuestionKind,
}

/// Question type together with its options and correct answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Exactly one option is correct.
    SingleChoice { options: Vec<String>, correct: String },
    /// A set of options is correct; all of them, and only them, must be picked.
    MultiChoice { options: Vec<String>, correct: Vec<String> },
    /// Free text compared against any of the accepted strings.
    ShortText { accepted: Vec<String> },
}

/// The correct answer of a question, captured at grading time for later review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum CorrectAnswer {
    SingleChoice(String),
    MultiChoice(Vec<String>),
    ShortText(Vec<String>),
}

/// DTO for sending a question to the client (excludes the correct answer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub options: Vec<String>,
}

impl QuestionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::SingleChoice { .. } => "single-choice",
            QuestionKind::MultiChoice { .. } => "multi-choice",
            QuestionKind::ShortText { .. } => "short-text",
        }
    }

    /// Option labels; empty for short-text questions.
    pub fn options(&self) -> &[String] {
        match self {
            QuestionKind::SingleChoice { options, .. } | QuestionKind::MultiChoice { options, .. } => {
                options
            }
            QuestionKind::ShortText { .. } => &[],
        }
    }

    pub fn correct_answer(&self) -> CorrectAnswer {
        match self {
            QuestionKind::SingleChoice { correct, .. } => CorrectAnswer::SingleChoice(correct.clone()),
            QuestionKind::MultiChoice { correct, .. } => CorrectAnswer::MultiChoice(correct.clone()),
            QuestionKind::ShortText { accepted } => CorrectAnswer::ShortText(accepted.clone()),
        }
    }
}

impl Question {
    pub fn to_public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id.clone(),
            prompt: clean_html(&self.prompt),
            question_type: self.kind.type_name().to_string(),
            options: self.kind.options().to_vec(),
        }
    }
}

fn validate_kind(kind: &QuestionKind) -> Result<(), ValidationError> {
    match kind {
        QuestionKind::SingleChoice { options, correct } => {
            validate_options(options)?;
            if !options.contains(correct) {
                return Err(ValidationError::new("correct_answer_not_in_options"));
            }
        }
        QuestionKind::MultiChoice { options, correct } => {
            validate_options(options)?;
            if correct.is_empty() {
                return Err(ValidationError::new("correct_answers_cannot_be_empty"));
            }
            if correct.iter().any(|label| !options.contains(label)) {
                return Err(ValidationError::new("correct_answer_not_in_options"));
            }
        }
        QuestionKind::ShortText { accepted } => {
            if accepted.iter().all(|a| a.trim().is_empty()) {
                return Err(ValidationError::new("accepted_answers_cannot_be_empty"));
            }
        }
    }
    Ok(())
}

fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    if options.is_empty() {
        return Err(ValidationError::new("options_cannot_be_empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(options: &[&str], correct: &str) -> Question {
        Question {
            id: "q1".to_string(),
            prompt: "Capital of France?".to_string(),
            kind: QuestionKind::SingleChoice {
                options: options.iter().map(|s| s.to_string()).collect(),
                correct: correct.to_string(),
            },
        }
    }

    #[test]
    fn test_deserialize_canonical_schema() {
        let raw = r#"[
            {"id":"q1","prompt":"Capital?","type":"single-choice","options":["Paris","London"],"correct":"Paris"},
            {"id":"q2","prompt":"Colours","type":"multi-choice","options":["Red","Blue"],"correct":["Red","Blue"]},
            {"id":"q3","prompt":"SQL?","type":"short-text","accepted":["SQL"]}
        ]"#;
        let questions: Vec<Question> = serde_json::from_str(raw).unwrap();
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].kind.type_name(), "single-choice");
        assert!(matches!(questions[1].kind, QuestionKind::MultiChoice { .. }));
        assert!(matches!(questions[2].kind, QuestionKind::ShortText { .. }));
    }

    #[test]
    fn test_valid_question_passes() {
        assert!(single(&["Paris", "London"], "Paris").validate().is_ok());
    }

    #[test]
    fn test_long_prompts_and_repeated_options_are_gradable() {
        let mut q = single(&["Paris", "Paris", "London"], "Paris");
        q.id = "q".repeat(300);
        q.prompt = "x".repeat(2001);
        assert!(q.validate().is_ok());

        let long_option = "o".repeat(600);
        let empty_prompt = Question {
            prompt: String::new(),
            ..single(&[long_option.as_str()], &long_option)
        };
        assert!(empty_prompt.validate().is_ok());
    }

    #[test]
    fn test_choice_question_needs_options() {
        assert!(single(&[], "Paris").validate().is_err());
    }

    #[test]
    fn test_correct_label_must_be_an_option() {
        assert!(single(&["Paris", "London"], "Rome").validate().is_err());
    }

    #[test]
    fn test_multi_choice_needs_correct_labels() {
        let q = Question {
            id: "q2".to_string(),
            prompt: "Colours".to_string(),
            kind: QuestionKind::MultiChoice {
                options: vec!["Red".to_string(), "Blue".to_string()],
                correct: vec![],
            },
        };
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_short_text_needs_an_accepted_answer() {
        let q = Question {
            id: "q3".to_string(),
            prompt: "SQL?".to_string(),
            kind: QuestionKind::ShortText { accepted: vec!["  ".to_string()] },
        };
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_public_question_hides_answer_and_cleans_prompt() {
        let mut q = single(&["Paris", "London"], "Paris");
        q.prompt = "<b>Capital</b><script>alert(1)</script>".to_string();
        let public = q.to_public();
        assert_eq!(public.prompt, "<b>Capital</b>");
        assert_eq!(public.question_type, "single-choice");
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("correct").is_none());
        assert_eq!(json["type"], "single-choice");
    }
}
