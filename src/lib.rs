pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod gemini;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod storage;
pub mod study_service;

pub use errors::{ApiError, GenerationError};
pub use models::{
    Flashcard, FlashcardRequest, FlashcardResponse, GenerateRequest, QuizItem, StudyPackResponse,
    TopicQuizItem, TopicQuizResponse,
};
