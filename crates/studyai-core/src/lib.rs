//! StudyAI Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout StudyAI:
//! - Quiz models returned by the quiz generator
//! - Common error types
//! - Collaborator traits for the LLM and web search services
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, LlmConfig, LlmProvider, LoggingConfig, SearchConfig, ServerConfig,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for StudyAI operations
#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Search error: {0}")]
    SearchError(String),

    #[error("Document parsing error: {0}")]
    ParseError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Invalid quiz: {0}")]
    InvalidQuiz(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StudyError>;

// ============================================================================
// Quiz Models
// ============================================================================

/// Minimum number of questions a generated quiz must carry
pub const MIN_QUIZ_QUESTIONS: usize = 3;

/// A multiple-choice quiz generated from a summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct Quiz {
    /// Title of the quiz
    #[schema(example = "Quantum Computing Basics")]
    pub quiz_title: String,

    /// Questions in presentation order
    pub questions: Vec<Question>,
}

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct Question {
    /// Question text
    #[schema(example = "What is the basic unit of quantum information?")]
    pub question: String,

    /// Answer options, each with a short label such as "A"
    pub options: Vec<QuizOption>,

    /// Label of the correct option
    #[schema(example = "B")]
    pub correct_answer: String,
}

/// One answer option of a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema)]
pub struct QuizOption {
    /// Option label (e.g. "A")
    #[schema(example = "B")]
    pub label: String,

    /// Option text
    #[schema(example = "Qubit")]
    pub text: String,
}

impl Quiz {
    /// Check the shape the quiz generator promises to callers.
    ///
    /// A valid quiz has at least [`MIN_QUIZ_QUESTIONS`] questions, every
    /// question has options, and every `correct_answer` names one of its
    /// option labels.
    pub fn validate(&self) -> Result<()> {
        if self.questions.len() < MIN_QUIZ_QUESTIONS {
            return Err(StudyError::InvalidQuiz(format!(
                "expected at least {MIN_QUIZ_QUESTIONS} questions, got {}",
                self.questions.len()
            )));
        }

        for (idx, question) in self.questions.iter().enumerate() {
            if question.options.is_empty() {
                return Err(StudyError::InvalidQuiz(format!(
                    "question {} has no options",
                    idx + 1
                )));
            }
            if question.option(&question.correct_answer).is_none() {
                return Err(StudyError::InvalidQuiz(format!(
                    "question {} answer '{}' does not match any option label",
                    idx + 1,
                    question.correct_answer
                )));
            }
        }

        Ok(())
    }
}

impl Question {
    /// Look up an option by label
    pub fn option(&self, label: &str) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.label == label)
    }
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Web search collaborator returning raw text for a topic
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Search for a topic and return the raw result text
    async fn search(&self, query: &str) -> Result<String>;
}

/// LLM collaborator
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a free-text response
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate a JSON value conforming to `schema`.
    ///
    /// Providers with native structured output override this. The default
    /// embeds the schema in the prompt and parses the first JSON object in
    /// the reply.
    async fn generate_structured(
        &self,
        prompt: &str,
        name: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let prompt = format!(
            "{prompt}\n\nRespond only with a JSON object named \"{name}\" \
             that conforms to this JSON schema:\n{schema}"
        );
        let reply = self.generate(&prompt).await?;
        parse_json_reply(&reply)
    }
}

/// Extract a JSON object from an LLM reply.
///
/// Tolerates markdown code fences and prose around the object.
pub fn parse_json_reply(reply: &str) -> Result<serde_json::Value> {
    let start = reply.find('{');
    let end = reply.rfind('}');

    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &reply[s..=e],
        _ => {
            return Err(StudyError::LlmError(
                "Response did not contain a JSON object".to_string(),
            ))
        }
    };

    serde_json::from_str(json)
        .map_err(|e| StudyError::LlmError(format!("Failed to parse structured response: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
