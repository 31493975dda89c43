//! StudyAI Pipeline - Summarization and quiz generation
//!
//! Wires the three external collaborators together:
//! - Web search (Wikipedia) for topic summaries
//! - PDF parsing for uploaded documents
//! - An LLM for summaries and structured quizzes
//!
//! Each operation is one linear call chain. Collaborator failures are
//! returned as-is; nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use studyai_core::{
    AppConfig, LlmClient, Quiz, Result, SearchBackend, StudyError, MIN_QUIZ_QUESTIONS,
};
use studyai_parser::{DocumentParser, ParsedDocument, PdfParser};

pub mod llm;
pub mod prompts;
pub mod scratch;
pub mod search;

pub use llm::{create_llm_client, OllamaClient, OpenAiClient};
pub use scratch::ScratchFile;
pub use search::WikipediaSearch;

/// Name given to the quiz schema in structured-output requests
const QUIZ_SCHEMA_NAME: &str = "quiz";

// ============================================================================
// Pipeline
// ============================================================================

/// Orchestrates search, PDF parsing and LLM calls for each operation
pub struct StudyPipeline {
    /// LLM client
    llm: Arc<dyn LlmClient>,

    /// Web search backend
    search: Arc<dyn SearchBackend>,

    /// Parser for uploaded PDFs
    parser: Arc<dyn DocumentParser>,

    /// Directory for per-request scratch files
    scratch_dir: PathBuf,

    /// JSON schema the quiz generator must follow
    quiz_schema: serde_json::Value,
}

impl StudyPipeline {
    /// Create a new pipeline
    pub fn new(
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn SearchBackend>,
        parser: Arc<dyn DocumentParser>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            llm,
            search,
            parser,
            scratch_dir: scratch_dir.into(),
            quiz_schema: quiz_schema(),
        }
    }

    /// Build the production pipeline from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let llm: Arc<dyn LlmClient> = Arc::from(create_llm_client(&config.llm)?);
        let search = Arc::new(WikipediaSearch::from_config(&config.search)?);

        tracing::info!(
            provider = ?config.llm.provider,
            model = %config.llm.model,
            wikipedia = %config.search.wikipedia_lang,
            "Pipeline configured"
        );

        Ok(Self::new(
            llm,
            search,
            Arc::new(PdfParser::new()),
            config.server.scratch_dir(),
        ))
    }

    /// Directory used for scratch files
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Summarize a topic from web search results
    pub async fn summarize_web(&self, topic: &str) -> Result<String> {
        let topic = require_text("topic", topic)?;
        let start = Instant::now();

        let results = self.search.search(topic).await?;
        let prompt = prompts::render(
            prompts::WEB_SUMMARY_PROMPT,
            &[("topic", topic), ("context", results.as_str())],
        );
        let summary = self.llm.generate(&prompt).await?;

        tracing::info!(
            topic = %topic,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Web summary generated"
        );
        Ok(summary)
    }

    /// Summarize an uploaded PDF
    pub async fn summarize_pdf<B>(&self, pdf: B) -> Result<String>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let start = Instant::now();

        let document = self.extract_pdf(pdf).await?;
        let context = document.content();
        let prompt = prompts::render(prompts::PDF_SUMMARY_PROMPT, &[("context", context.as_str())]);
        let summary = self.llm.generate(&prompt).await?;

        tracing::info!(
            pages = document.segment_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "PDF summary generated"
        );
        Ok(summary)
    }

    /// Summarize a topic and an uploaded PDF together.
    ///
    /// The web search and the PDF parse run concurrently. Both are awaited
    /// before any error is returned, so the scratch file is gone by then.
    pub async fn summarize_combined<B>(&self, topic: &str, pdf: B) -> Result<String>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let topic = require_text("topic", topic)?;
        let start = Instant::now();

        let (results, document) =
            tokio::join!(self.search.search(topic), self.extract_pdf(pdf));
        let (results, document) = (results?, document?);

        let context = prompts::combined_context(&results, &document.content());
        let prompt = prompts::render(
            prompts::COMBINED_SUMMARY_PROMPT,
            &[("topic", topic), ("context", context.as_str())],
        );
        let summary = self.llm.generate(&prompt).await?;

        tracing::info!(
            topic = %topic,
            pages = document.segment_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Combined summary generated"
        );
        Ok(summary)
    }

    /// Generate a multiple-choice quiz from a summary
    pub async fn generate_quiz(&self, summary: &str) -> Result<Quiz> {
        let summary = require_text("summary", summary)?;
        let min_questions = MIN_QUIZ_QUESTIONS.to_string();

        let prompt = prompts::render(
            prompts::QUIZ_PROMPT,
            &[("min_questions", min_questions.as_str()), ("context", summary)],
        );
        let value = self
            .llm
            .generate_structured(&prompt, QUIZ_SCHEMA_NAME, &self.quiz_schema)
            .await?;

        let quiz: Quiz = serde_json::from_value(value)
            .map_err(|e| StudyError::LlmError(format!("Quiz does not match schema: {e}")))?;
        quiz.validate()?;

        tracing::info!(
            title = %quiz.quiz_title,
            questions = quiz.questions.len(),
            "Quiz generated"
        );
        Ok(quiz)
    }

    /// Write the PDF to a scratch file, parse it, and remove the file.
    ///
    /// Runs on the blocking pool; the scratch file is removed on every
    /// exit path, including parser errors and panics.
    pub async fn extract_pdf<B>(&self, pdf: B) -> Result<ParsedDocument>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let parser = Arc::clone(&self.parser);
        let dir = self.scratch_dir.clone();

        tokio::task::spawn_blocking(move || {
            let scratch = ScratchFile::create(&dir, pdf.as_ref())?;
            let parsed = parser.parse(scratch.path());
            scratch.cleanup();
            parsed.map_err(|e| StudyError::ParseError(e.to_string()))
        })
        .await
        .map_err(|e| StudyError::ParseError(format!("PDF parsing task failed: {e}")))?
    }
}

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StudyError::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(trimmed)
}

/// JSON schema for [`Quiz`] with all sub-schemas inlined
pub fn quiz_schema() -> serde_json::Value {
    let generator = schemars::gen::SchemaSettings::draft07()
        .with(|s| s.inline_subschemas = true)
        .into_generator();
    let root = generator.into_root_schema_for::<Quiz>();

    let mut schema = serde_json::to_value(root).expect("quiz schema serializes to JSON");
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
    }
    schema
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use studyai_parser::{FileType, ParserError};

    struct FakeSearch;

    #[async_trait]
    impl SearchBackend for FakeSearch {
        async fn search(&self, query: &str) -> Result<String> {
            if query == "fail" {
                return Err(StudyError::SearchError("offline".to_string()));
            }
            Ok(format!("Page: {query}\nSummary: facts about {query}"))
        }
    }

    /// Records prompts and answers with a canned reply
    struct FakeLlm {
        prompts: Mutex<Vec<String>>,
        structured: serde_json::Value,
    }

    impl FakeLlm {
        fn new(structured: serde_json::Value) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                structured,
            }
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmClient for FakeLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("a summary".to_string())
        }

        async fn generate_structured(
            &self,
            prompt: &str,
            name: &str,
            schema: &serde_json::Value,
        ) -> Result<serde_json::Value> {
            assert_eq!(name, QUIZ_SCHEMA_NAME);
            assert_eq!(schema["type"], "object");
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.structured.clone())
        }
    }

    /// Treats the uploaded bytes as UTF-8 text; "bad" fails to parse
    struct TextParser {
        seen: Mutex<Vec<PathBuf>>,
    }

    impl DocumentParser for TextParser {
        fn parse(&self, path: &Path) -> studyai_parser::Result<ParsedDocument> {
            self.seen.lock().unwrap().push(path.to_path_buf());
            let text = std::fs::read_to_string(path).map_err(|e| ParserError::IoError {
                path: path.display().to_string(),
                source: e,
            })?;
            if text == "bad" {
                return Err(ParserError::PdfError("corrupt".to_string()));
            }
            Ok(ParsedDocument::new(path.display().to_string(), FileType::Pdf)
                .with_segments(text.split('|').map(str::to_string).collect()))
        }
    }

    fn quiz_json(questions: usize) -> serde_json::Value {
        let questions: Vec<_> = (0..questions)
            .map(|i| {
                serde_json::json!({
                    "question": format!("Question {i}?"),
                    "options": [
                        {"label": "A", "text": "yes"},
                        {"label": "B", "text": "no"}
                    ],
                    "correct_answer": "A"
                })
            })
            .collect();
        serde_json::json!({"quiz_title": "Test quiz", "questions": questions})
    }

    struct Harness {
        pipeline: StudyPipeline,
        llm: Arc<FakeLlm>,
        parser: Arc<TextParser>,
        dir: tempfile::TempDir,
    }

    fn harness(structured: serde_json::Value) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(FakeLlm::new(structured));
        let parser = Arc::new(TextParser {
            seen: Mutex::new(Vec::new()),
        });
        let pipeline = StudyPipeline::new(
            llm.clone(),
            Arc::new(FakeSearch),
            parser.clone(),
            dir.path(),
        );
        Harness {
            pipeline,
            llm,
            parser,
            dir,
        }
    }

    fn scratch_is_empty(dir: &tempfile::TempDir) -> bool {
        std::fs::read_dir(dir.path()).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_summarize_web() {
        let h = harness(quiz_json(3));
        let summary = h.pipeline.summarize_web("  quantum computing ").await.unwrap();

        assert_eq!(summary, "a summary");
        let prompt = h.llm.last_prompt();
        assert!(prompt.contains("\"quantum computing\""));
        assert!(prompt.contains("facts about quantum computing"));
    }

    #[tokio::test]
    async fn test_summarize_web_rejects_empty_topic() {
        let h = harness(quiz_json(3));
        let err = h.pipeline.summarize_web("   ").await.unwrap_err();
        assert!(matches!(err, StudyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_summarize_web_search_failure() {
        let h = harness(quiz_json(3));
        let err = h.pipeline.summarize_web("fail").await.unwrap_err();
        assert!(matches!(err, StudyError::SearchError(_)));
        assert!(h.llm.last_prompt().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_pdf_joins_segments_and_cleans_up() {
        let h = harness(quiz_json(3));
        let summary = h.pipeline.summarize_pdf(b"page one|page two".to_vec()).await.unwrap();

        assert_eq!(summary, "a summary");
        assert!(h.llm.last_prompt().contains("page one\n\npage two"));

        let seen = h.parser.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with(h.dir.path()));
        assert!(!seen[0].exists());
        assert!(scratch_is_empty(&h.dir));
    }

    #[tokio::test]
    async fn test_summarize_pdf_parse_failure_cleans_up() {
        let h = harness(quiz_json(3));
        let err = h.pipeline.summarize_pdf(b"bad".to_vec()).await.unwrap_err();

        assert!(matches!(err, StudyError::ParseError(ref msg) if msg.contains("corrupt")));
        assert!(scratch_is_empty(&h.dir));
    }

    #[tokio::test]
    async fn test_summarize_combined() {
        let h = harness(quiz_json(3));
        let summary = h
            .pipeline
            .summarize_combined("photosynthesis", b"chlorophyll notes".to_vec())
            .await
            .unwrap();

        assert_eq!(summary, "a summary");
        let prompt = h.llm.last_prompt();
        assert!(prompt.contains("facts about photosynthesis"));
        assert!(prompt.contains("chlorophyll notes"));
        assert!(scratch_is_empty(&h.dir));
    }

    #[tokio::test]
    async fn test_summarize_combined_search_failure() {
        let h = harness(quiz_json(3));
        let err = h
            .pipeline
            .summarize_combined("fail", b"notes".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, StudyError::SearchError(_)));
        assert!(h.llm.last_prompt().is_empty());
        assert!(scratch_is_empty(&h.dir));
    }

    /// Fails after a short delay, while the parse is still running
    struct SlowFailingSearch;

    #[async_trait]
    impl SearchBackend for SlowFailingSearch {
        async fn search(&self, _query: &str) -> Result<String> {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            Err(StudyError::SearchError("timeout".to_string()))
        }
    }

    /// Holds the scratch file open longer than the search takes to fail
    struct SlowParser;

    impl DocumentParser for SlowParser {
        fn parse(&self, path: &Path) -> studyai_parser::Result<ParsedDocument> {
            std::thread::sleep(std::time::Duration::from_millis(300));
            Ok(ParsedDocument::new(path.display().to_string(), FileType::Pdf)
                .with_segments(vec!["notes".to_string()]))
        }
    }

    #[tokio::test]
    async fn test_summarize_combined_search_failure_waits_for_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(FakeLlm::new(quiz_json(3)));
        let pipeline = StudyPipeline::new(
            llm.clone(),
            Arc::new(SlowFailingSearch),
            Arc::new(SlowParser),
            dir.path(),
        );

        let err = pipeline
            .summarize_combined("photosynthesis", b"notes".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, StudyError::SearchError(_)));
        assert!(scratch_is_empty(&dir));
        assert!(llm.last_prompt().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_combined_parse_failure_cleans_up() {
        let h = harness(quiz_json(3));
        let err = h
            .pipeline
            .summarize_combined("photosynthesis", b"bad".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, StudyError::ParseError(_)));
        assert!(scratch_is_empty(&h.dir));
    }

    #[tokio::test]
    async fn test_generate_quiz() {
        let h = harness(quiz_json(4));
        let quiz = h.pipeline.generate_quiz("Paris is the capital of France.").await.unwrap();

        assert_eq!(quiz.quiz_title, "Test quiz");
        assert_eq!(quiz.questions.len(), 4);
        let prompt = h.llm.last_prompt();
        assert!(prompt.contains("at least 3 questions"));
        assert!(prompt.contains("Paris is the capital of France."));
    }

    #[tokio::test]
    async fn test_generate_quiz_rejects_short_quiz() {
        let h = harness(quiz_json(2));
        let err = h.pipeline.generate_quiz("summary").await.unwrap_err();
        assert!(matches!(err, StudyError::InvalidQuiz(_)));
    }

    #[tokio::test]
    async fn test_generate_quiz_rejects_wrong_shape() {
        let h = harness(serde_json::json!({"question": "What?", "answer": "Paris"}));
        let err = h.pipeline.generate_quiz("summary").await.unwrap_err();
        assert!(matches!(err, StudyError::LlmError(_)));
    }

    #[test]
    fn test_quiz_schema_is_inlined() {
        let schema = quiz_schema();
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("definitions").is_none());
        assert_eq!(schema["type"], "object");

        let question = &schema["properties"]["questions"]["items"];
        assert_eq!(question["type"], "object");
        assert!(question["properties"]["correct_answer"].is_object());
        assert_eq!(question["properties"]["options"]["items"]["type"], "object");
    }
}
