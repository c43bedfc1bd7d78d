use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::GenerationError;
use crate::gemini::ModelClient;
use crate::models::{Flashcard, StudyPackResponse, TopicQuizItem};
use crate::pipeline::{
    check_quiz_quality, clean_response, parse_flashcards, parse_study_pack, parse_topic_quiz,
};
use crate::prompts;

/// Orchestrates one generation: build the prompt, call the model, then run
/// the response through the validation pipeline. Each endpoint shape shares
/// this structure and differs only in prompt and parser.
#[derive(Clone)]
pub struct StudyService {
    model: Arc<dyn ModelClient>,
}

impl StudyService {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    async fn call_model(&self, prompt: &str) -> Result<String, GenerationError> {
        let raw = self
            .model
            .call(prompt)
            .await
            .ok_or(GenerationError::ModelUnavailable)?;

        debug!(response_length = raw.len(), "Raw model response");
        Ok(clean_response(&raw))
    }

    pub async fn generate_study_pack(
        &self,
        notes: &str,
    ) -> Result<StudyPackResponse, GenerationError> {
        info!(notes_length = notes.len(), "Generating study pack");

        let prompt = prompts::build_study_pack_prompt(notes);
        let cleaned = self.call_model(&prompt).await?;
        let pack = parse_study_pack(&cleaned)?;

        let warnings = check_quiz_quality(&pack.quiz);
        if !warnings.is_empty() {
            warn!(
                warning_count = warnings.len(),
                warnings = ?warnings,
                "Quality issues in generated study pack quiz"
            );
        }

        info!(
            summary_points = pack.summary.len(),
            quiz_questions = pack.quiz.len(),
            "Study pack generated"
        );
        Ok(pack)
    }

    pub async fn generate_topic_quiz(
        &self,
        notes: &str,
    ) -> Result<Vec<TopicQuizItem>, GenerationError> {
        info!(notes_length = notes.len(), "Generating topic quiz");

        let prompt = prompts::build_topic_quiz_prompt(notes);
        let cleaned = self.call_model(&prompt).await?;
        let quiz = parse_topic_quiz(&cleaned)?;

        let warnings = check_quiz_quality(&quiz);
        if !warnings.is_empty() {
            warn!(
                warning_count = warnings.len(),
                warnings = ?warnings,
                "Quality issues in generated topic quiz"
            );
        }

        info!(quiz_questions = quiz.len(), "Topic quiz generated");
        Ok(quiz)
    }

    pub async fn generate_flashcards(
        &self,
        text: Option<&str>,
        topic: Option<&str>,
        difficulty: &str,
    ) -> Result<Vec<Flashcard>, GenerationError> {
        info!(
            has_text = text.is_some(),
            has_topic = topic.is_some(),
            difficulty = difficulty,
            "Generating flashcards"
        );

        let prompt = prompts::build_flashcard_prompt(text, topic, difficulty);
        let cleaned = self.call_model(&prompt).await?;
        let cards = parse_flashcards(&cleaned)?;

        info!(card_count = cards.len(), "Flashcards generated");
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Model stub that records prompts and replays canned responses.
    struct StubModel {
        response: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn returning(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Some(response.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn unavailable() -> Arc<Self> {
            Arc::new(Self {
                response: None,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelClient for StubModel {
        async fn call(&self, prompt: &str) -> Option<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.response.clone()
        }
    }

    fn study_pack_json() -> String {
        json!({
            "summary": ["Photosynthesis converts sunlight into glucose."],
            "quiz": [{
                "question": "Where does photosynthesis take place?",
                "options": ["Mitochondria", "Chloroplasts", "Nucleus", "Cell wall"],
                "answer": "Chloroplasts",
            }],
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_study_pack_happy_path_with_fenced_response() {
        let stub = StubModel::returning(&format!("```json\n{}\n```", study_pack_json()));
        let service = StudyService::new(stub.clone());

        let pack = service
            .generate_study_pack("Photosynthesis is how plants make food.")
            .await
            .unwrap();

        assert_eq!(pack.summary.len(), 1);
        assert_eq!(pack.quiz[0].answer, "Chloroplasts");

        let prompts = stub.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Photosynthesis is how plants make food."));
    }

    #[tokio::test]
    async fn test_unavailable_model_maps_to_model_unavailable() {
        let service = StudyService::new(StubModel::unavailable());
        let err = service
            .generate_study_pack("Some study notes here.")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::ModelUnavailable));
    }

    #[tokio::test]
    async fn test_non_json_response_maps_to_invalid_json() {
        let service = StudyService::new(StubModel::returning("I'm sorry, I cannot do that."));
        let err = service
            .generate_study_pack("Some study notes here.")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidJson(_)));
    }

    #[tokio::test]
    async fn test_topic_quiz_rejects_too_few_items() {
        let items: Vec<Value> = (0..4)
            .map(|i| {
                json!({
                    "question": format!("Question number {}?", i + 1),
                    "options": ["A", "B", "C", "D"],
                    "answer": "A",
                    "topic": "T",
                })
            })
            .collect();
        let body = json!({ "quiz": items }).to_string();

        let service = StudyService::new(StubModel::returning(&body));
        let err = service
            .generate_topic_quiz("Some study notes here.")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at least 5"));
    }

    #[tokio::test]
    async fn test_flashcard_prompt_carries_difficulty() {
        let cards: Vec<Value> = (0..10)
            .map(|i| json!({"question": format!("Q{}?", i), "answer": "A."}))
            .collect();
        let body = json!({ "flashcards": cards }).to_string();

        let stub = StubModel::returning(&body);
        let service = StudyService::new(stub.clone());

        let cards = service
            .generate_flashcards(None, Some("The water cycle"), "hard")
            .await
            .unwrap();
        assert_eq!(cards.len(), 10);

        let prompts = stub.prompts.lock().unwrap();
        assert!(prompts[0].contains("Difficulty: HARD"));
        assert!(prompts[0].contains("The water cycle"));
    }
}
