use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single multiple-choice question as returned to clients.
///
/// `answer` is kept byte-for-byte as the model produced it; no trimming or
/// case normalization is applied to any of these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// A quiz question tagged with the topic it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicQuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// Response body for the study pack endpoints: bullet summary plus quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPackResponse {
    pub summary: Vec<String>,
    pub quiz: Vec<QuizItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicQuizResponse {
    pub quiz: Vec<TopicQuizItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardResponse {
    pub flashcards: Vec<Flashcard>,
}

/// Request body shared by the study pack and quiz endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
}

pub const NOTES_MIN_CHARS: usize = 10;
pub const NOTES_MAX_CHARS: usize = 10_000;

/// Check notes text against the input contract. Runs before any model call.
pub fn validate_notes_text(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("Notes text must not be empty or whitespace-only".to_string());
    }
    let chars = text.chars().count();
    if chars < NOTES_MIN_CHARS {
        return Err(format!(
            "Notes text must be at least {} characters",
            NOTES_MIN_CHARS
        ));
    }
    if chars > NOTES_MAX_CHARS {
        return Err(format!(
            "Notes text must be at most {} characters",
            NOTES_MAX_CHARS
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(label)
    }
}

/// Request body for flashcard generation. At least one of `text` or `topic`
/// must be present; both are trimmed before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// The source material a flashcard request resolved to after validation.
#[derive(Debug, Clone)]
pub struct FlashcardSource {
    pub text: Option<String>,
    pub topic: Option<String>,
}

impl FlashcardRequest {
    pub fn validate(&self) -> Result<FlashcardSource, String> {
        let text = self
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let topic = self
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        if text.is_none() && topic.is_none() {
            return Err("Either 'text' or 'topic' must be provided".to_string());
        }
        if let Some(text) = &text {
            let chars = text.chars().count();
            if chars < NOTES_MIN_CHARS {
                return Err(format!(
                    "Notes text must be at least {} characters",
                    NOTES_MIN_CHARS
                ));
            }
            if chars > NOTES_MAX_CHARS {
                return Err(format!(
                    "Notes text must be at most {} characters",
                    NOTES_MAX_CHARS
                ));
            }
        }
        Ok(FlashcardSource { text, topic })
    }
}

/// A generated flashcard set as handed to the storage collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardSetRecord {
    pub id: Uuid,
    pub owner_id: String,
    pub source_text: String,
    pub topic: Option<String>,
    pub difficulty: Difficulty,
    pub cards: Vec<Flashcard>,
    pub created_at: DateTime<Utc>,
}

impl FlashcardSetRecord {
    pub fn new(
        owner_id: String,
        source: &FlashcardSource,
        difficulty: Difficulty,
        cards: Vec<Flashcard>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            source_text: source.text.clone().unwrap_or_default(),
            topic: source.topic.clone(),
            difficulty,
            cards,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_text_boundaries() {
        assert!(validate_notes_text(&"a".repeat(10)).is_ok());
        assert!(validate_notes_text(&"a".repeat(10_000)).is_ok());

        let err = validate_notes_text("short").unwrap_err();
        assert!(err.contains("10 characters"));

        let err = validate_notes_text(&"a".repeat(10_001)).unwrap_err();
        assert!(err.contains("10000 characters"));
    }

    #[test]
    fn test_notes_text_rejects_whitespace_only() {
        let err = validate_notes_text("   \n\t  ").unwrap_err();
        assert!(err.to_lowercase().contains("empty"));
    }

    #[test]
    fn test_flashcard_request_requires_text_or_topic() {
        let request = FlashcardRequest {
            text: None,
            topic: None,
            difficulty: Difficulty::Medium,
        };
        assert!(request.validate().is_err());

        let request = FlashcardRequest {
            text: None,
            topic: Some("The water cycle".to_string()),
            difficulty: Difficulty::Medium,
        };
        let source = request.validate().unwrap();
        assert_eq!(source.topic.as_deref(), Some("The water cycle"));
    }

    #[test]
    fn test_flashcard_request_trims_whitespace() {
        let request = FlashcardRequest {
            text: Some("  some notes about photosynthesis  ".to_string()),
            topic: Some("  water cycle  ".to_string()),
            difficulty: Difficulty::Easy,
        };
        let source = request.validate().unwrap();
        assert_eq!(
            source.text.as_deref(),
            Some("some notes about photosynthesis")
        );
        assert_eq!(source.topic.as_deref(), Some("water cycle"));
    }

    #[test]
    fn test_difficulty_defaults_to_medium() {
        let request: FlashcardRequest =
            serde_json::from_str(r#"{"text": "Some study notes here"}"#).unwrap();
        assert_eq!(request.difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_difficulty_rejects_unknown_level() {
        let parsed: Result<FlashcardRequest, _> =
            serde_json::from_str(r#"{"text": "Some study notes here", "difficulty": "extreme"}"#);
        assert!(parsed.is_err());
    }
}
