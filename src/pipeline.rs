//! Validation pipeline for untrusted model output.
//!
//! Every generation endpoint runs the same fixed sequence over the raw text
//! that comes back from the model: normalize (strip markdown fences), parse
//! as JSON, structural validation against the endpoint's shape, advisory
//! quality checks, then assembly into the typed response. Structural
//! validation fails fast on the first defect; quality checks accumulate
//! warnings and never fail.

use serde_json::Value;
use std::collections::HashSet;

use crate::errors::GenerationError;
use crate::models::{Flashcard, QuizItem, StudyPackResponse, TopicQuizItem};

/// Strip a single pair of markdown code-fence markers and surrounding
/// whitespace from a raw model response.
///
/// Idempotent, and the identity (modulo trimming) on fence-free input.
/// Never fails regardless of input shape.
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop any language tag up to and including the next newline. A
        // fence with no newline at all loses exactly the three backticks.
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim().to_string()
}

/// Per-shape configuration for quiz-array validation.
///
/// The legacy study pack deliberately does not enforce answer-in-options
/// while the topic quiz does; that difference is carried here as explicit
/// flags rather than duplicated validation code.
#[derive(Debug, Clone, Copy)]
pub struct QuizRules {
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub require_topic: bool,
    pub enforce_answer_in_options: bool,
}

impl QuizRules {
    pub fn study_pack() -> Self {
        Self {
            min_items: None,
            max_items: None,
            require_topic: false,
            enforce_answer_in_options: false,
        }
    }

    pub fn topic_quiz() -> Self {
        Self {
            min_items: Some(TOPIC_QUIZ_MIN_ITEMS),
            max_items: Some(TOPIC_QUIZ_MAX_ITEMS),
            require_topic: true,
            enforce_answer_in_options: true,
        }
    }
}

pub const TOPIC_QUIZ_MIN_ITEMS: usize = 5;
pub const TOPIC_QUIZ_MAX_ITEMS: usize = 10;
pub const FLASHCARD_SET_SIZE: usize = 10;

/// A quiz item that passed structural validation, prior to assembly into
/// one of the response shapes.
#[derive(Debug, Clone)]
struct CheckedQuizItem {
    question: String,
    options: Vec<String>,
    answer: String,
    topic: Option<String>,
}

fn item_string(item: &Value, field: &str, index: usize) -> Result<String, GenerationError> {
    item.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GenerationError::missing_at(field, index))
}

/// Validate a parsed quiz array against the given rules. Fail-fast: the
/// first structural defect in iteration order aborts validation.
fn check_quiz_items(
    items: &[Value],
    rules: &QuizRules,
) -> Result<Vec<CheckedQuizItem>, GenerationError> {
    if let Some(min) = rules.min_items {
        if items.len() < min {
            return Err(GenerationError::TooFew {
                got: items.len(),
                min,
            });
        }
    }
    if let Some(max) = rules.max_items {
        if items.len() > max {
            return Err(GenerationError::TooMany {
                got: items.len(),
                max,
            });
        }
    }

    let mut checked = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            return Err(GenerationError::ItemNotObject(index));
        }

        let question = item_string(item, "question", index)?;
        let options: Vec<String> = item
            .get("options")
            .and_then(Value::as_array)
            .ok_or_else(|| GenerationError::missing_at("options", index))?
            .iter()
            .map(|option| {
                option
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| GenerationError::missing_at("options", index))
            })
            .collect::<Result<_, _>>()?;
        let answer = item_string(item, "answer", index)?;

        let topic = if rules.require_topic {
            let topic = item_string(item, "topic", index)?;
            if topic.trim().is_empty() {
                return Err(GenerationError::empty_at("topic", index));
            }
            Some(topic)
        } else {
            None
        };

        if rules.enforce_answer_in_options && !options.iter().any(|option| option == &answer) {
            return Err(GenerationError::AnswerNotInOptions { index });
        }

        checked.push(CheckedQuizItem {
            question,
            options,
            answer,
            topic,
        });
    }

    Ok(checked)
}

/// Parse and validate a study pack document: `summary` array of strings
/// plus a `quiz` array. Answer-in-options is not enforced on this shape.
pub fn parse_study_pack(cleaned: &str) -> Result<StudyPackResponse, GenerationError> {
    let doc: Value = serde_json::from_str(cleaned)?;

    let summary_values = doc
        .get("summary")
        .and_then(Value::as_array)
        .ok_or_else(|| GenerationError::missing("summary"))?;
    let summary: Vec<String> = summary_values
        .iter()
        .enumerate()
        .map(|(index, point)| {
            point
                .as_str()
                .map(str::to_string)
                .ok_or(GenerationError::SummaryElementNotString(index))
        })
        .collect::<Result<_, _>>()?;

    let quiz_values = doc
        .get("quiz")
        .and_then(Value::as_array)
        .ok_or_else(|| GenerationError::missing("quiz"))?;
    let checked = check_quiz_items(quiz_values, &QuizRules::study_pack())?;

    // Assembly cannot fail once validation has passed; values are copied
    // verbatim, with no trimming or case changes.
    let quiz = checked
        .into_iter()
        .map(|item| QuizItem {
            question: item.question,
            options: item.options,
            answer: item.answer,
        })
        .collect();

    Ok(StudyPackResponse { summary, quiz })
}

/// Parse and validate a topic quiz document: a `quiz` array of 5-10 items,
/// each with a non-blank topic and an answer that appears in its options.
pub fn parse_topic_quiz(cleaned: &str) -> Result<Vec<TopicQuizItem>, GenerationError> {
    let doc: Value = serde_json::from_str(cleaned)?;

    let quiz_values = doc
        .get("quiz")
        .and_then(Value::as_array)
        .ok_or_else(|| GenerationError::missing("quiz"))?;
    let checked = check_quiz_items(quiz_values, &QuizRules::topic_quiz())?;

    let quiz = checked
        .into_iter()
        .map(|item| TopicQuizItem {
            question: item.question,
            options: item.options,
            answer: item.answer,
            // require_topic guarantees presence on this shape
            topic: item.topic.unwrap_or_default(),
        })
        .collect();

    Ok(quiz)
}

/// Parse and validate a flashcard document: a `flashcards` array of exactly
/// ten items, each with non-blank `question` and `answer` strings.
pub fn parse_flashcards(cleaned: &str) -> Result<Vec<Flashcard>, GenerationError> {
    let doc: Value = serde_json::from_str(cleaned)?;

    let card_values = doc
        .get("flashcards")
        .and_then(Value::as_array)
        .ok_or_else(|| GenerationError::missing("flashcards"))?;

    if card_values.len() != FLASHCARD_SET_SIZE {
        return Err(GenerationError::WrongCount {
            got: card_values.len(),
            expected: FLASHCARD_SET_SIZE,
        });
    }

    let mut cards = Vec::with_capacity(card_values.len());
    for (index, card) in card_values.iter().enumerate() {
        if !card.is_object() {
            return Err(GenerationError::ItemNotObject(index));
        }
        let question = item_string(card, "question", index)?;
        if question.trim().is_empty() {
            return Err(GenerationError::empty_at("question", index));
        }
        let answer = item_string(card, "answer", index)?;
        if answer.trim().is_empty() {
            return Err(GenerationError::empty_at("answer", index));
        }
        cards.push(Flashcard { question, answer });
    }

    Ok(cards)
}

/// Read-only view over the fields the quality checks inspect, so the same
/// checks run on plain and topic-tagged quiz items.
pub trait QuizFields {
    fn question(&self) -> &str;
    fn options(&self) -> &[String];
    fn answer(&self) -> &str;
}

impl QuizFields for QuizItem {
    fn question(&self) -> &str {
        &self.question
    }
    fn options(&self) -> &[String] {
        &self.options
    }
    fn answer(&self) -> &str {
        &self.answer
    }
}

impl QuizFields for TopicQuizItem {
    fn question(&self) -> &str {
        &self.question
    }
    fn options(&self) -> &[String] {
        &self.options
    }
    fn answer(&self) -> &str {
        &self.answer
    }
}

/// Advisory quality checks over already-validated quiz items.
///
/// Unlike structural validation this accumulates every finding and never
/// fails: a degraded generation is still delivered to the user, while
/// operators see the warnings in the logs.
pub fn check_quiz_quality<Q: QuizFields>(items: &[Q]) -> Vec<String> {
    let mut warnings = Vec::new();

    for (i, item) in items.iter().enumerate() {
        let label = i + 1;
        let options = item.options();

        if item.question().chars().count() < 10 {
            warnings.push(format!("Q{}: Question seems too short", label));
        }

        let distinct: HashSet<&String> = options.iter().collect();
        if distinct.len() != options.len() {
            warnings.push(format!("Q{}: Contains duplicate options", label));
        }

        if !options.iter().any(|option| option == item.answer()) {
            warnings.push(format!(
                "Q{}: Answer '{}' not found in options",
                label,
                item.answer()
            ));
        }

        for (j, first) in options.iter().enumerate() {
            for second in &options[j + 1..] {
                if first != second && first.to_lowercase() == second.to_lowercase() {
                    warnings.push(format!(
                        "Q{}: Options too similar: '{}' vs '{}'",
                        label, first, second
                    ));
                }
            }
        }
    }

    warnings
}
