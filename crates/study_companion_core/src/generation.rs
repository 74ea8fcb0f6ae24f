//! crates/study_companion_core/src/generation.rs
//!
//! The generation client. Turns one user request into exactly one provider call
//! and the provider's raw text into a typed, structurally checked result.

use crate::domain::{
    ContentKind, Difficulty, Flashcard, GeneratedContent, GenerationRequest, QuizQuestion,
    StudyPlan,
};
use crate::ports::{
    GenerationError, GenerationResult, StructuredGenerationService, StructuredRequest,
};
use crate::schema::schema_for;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Cards or questions requested when the caller does not say.
pub const DEFAULT_ITEM_COUNT: u32 = 5;

const STUDY_PLAN_SYSTEM_INSTRUCTION: &str =
    "You are an expert academic tutor. Create realistic, actionable study plans.";
const FLASHCARD_SYSTEM_INSTRUCTION: &str =
    "You are a helpful study assistant. Create high-quality flashcards.";
const QUIZ_SYSTEM_INSTRUCTION: &str =
    "You are a test-prep expert. Ensure distractors are plausible.";

const STUDY_PLAN_TEMPLATE: &str = "Create a study plan for the {exam_name} exam which is in {days} days.
My weak areas are: {weaknesses}.
Create a day-by-day plan (up to 7 days for this preview) that balances review and practice.";
const FLASHCARD_TEMPLATE: &str =
    "Generate {count} flashcards for the topic: \"{topic}\". keep definitions concise.";
const QUIZ_TEMPLATE: &str =
    "Generate a {count}-question multiple choice quiz on \"{topic}\" at {difficulty} level.";

//=========================================================================================
// The Generator
//=========================================================================================

/// Generates study plans, flashcard decks and quizzes through a structured-output provider.
///
/// Holds no mutable state, so one instance can serve any number of concurrent callers.
#[derive(Clone)]
pub struct StudyContentGenerator {
    provider: Arc<dyn StructuredGenerationService>,
    model: String,
}

impl StudyContentGenerator {
    /// Creates a new `StudyContentGenerator` that sends every request to `model`.
    pub fn new(provider: Arc<dyn StructuredGenerationService>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Builds a day-by-day plan.
    ///
    /// `Ok(None)` when the provider returned no text, or a plan without any days.
    pub async fn generate_study_plan(
        &self,
        exam_name: &str,
        days_until_exam: u32,
        weaknesses: &str,
    ) -> GenerationResult<Option<StudyPlan>> {
        require_text("exam name", exam_name)?;
        require_positive("days until exam", days_until_exam)?;
        require_text("weaknesses", weaknesses)?;

        let prompt = STUDY_PLAN_TEMPLATE
            .replace("{exam_name}", exam_name)
            .replace("{days}", &days_until_exam.to_string())
            .replace("{weaknesses}", weaknesses);

        let plan: Option<StudyPlan> = self
            .request_structured(ContentKind::StudyPlan, prompt, STUDY_PLAN_SYSTEM_INSTRUCTION)
            .await?;

        match plan {
            Some(plan) if plan.schedule.is_empty() => {
                warn!(exam = %plan.exam_name, "Provider returned a study plan with no days");
                Ok(None)
            }
            plan => Ok(plan),
        }
    }

    /// Builds a flashcard deck, in the order the provider returned it.
    pub async fn generate_flashcards(
        &self,
        topic: &str,
        count: Option<u32>,
    ) -> GenerationResult<Vec<Flashcard>> {
        let count = count.unwrap_or(DEFAULT_ITEM_COUNT);
        require_text("topic", topic)?;
        require_positive("count", count)?;

        let prompt = FLASHCARD_TEMPLATE
            .replace("{count}", &count.to_string())
            .replace("{topic}", topic);

        let cards = self
            .request_structured(ContentKind::FlashcardDeck, prompt, FLASHCARD_SYSTEM_INSTRUCTION)
            .await?;
        Ok(cards.unwrap_or_default())
    }

    /// Builds a multiple-choice quiz.
    ///
    /// Every returned question's `correct_answer_index` points into its own options.
    pub async fn generate_quiz(
        &self,
        topic: &str,
        difficulty: Difficulty,
        count: Option<u32>,
    ) -> GenerationResult<Vec<QuizQuestion>> {
        let count = count.unwrap_or(DEFAULT_ITEM_COUNT);
        require_text("topic", topic)?;
        require_positive("count", count)?;

        let prompt = QUIZ_TEMPLATE
            .replace("{count}", &count.to_string())
            .replace("{topic}", topic)
            .replace("{difficulty}", &difficulty.to_string());

        let questions: Vec<QuizQuestion> = self
            .request_structured(ContentKind::Quiz, prompt, QUIZ_SYSTEM_INSTRUCTION)
            .await?
            .unwrap_or_default();

        if let Some((position, question)) = questions
            .iter()
            .enumerate()
            .find(|(_, q)| q.correct_answer_index >= q.options.len())
        {
            error!(
                question_id = %question.id,
                "Quiz question {} marks option {} correct but has {} options",
                position,
                question.correct_answer_index,
                question.options.len()
            );
            return Err(GenerationError::shape_mismatch(
                ContentKind::Quiz,
                format!(
                    "correctAnswerIndex {} at $[{}] is outside its {} options",
                    question.correct_answer_index,
                    position,
                    question.options.len()
                ),
            ));
        }

        Ok(questions)
    }

    /// Dispatches a tagged request to the matching operation.
    pub async fn generate(&self, request: GenerationRequest) -> GenerationResult<GeneratedContent> {
        match request {
            GenerationRequest::StudyPlan {
                exam_name,
                days_until_exam,
                weaknesses,
            } => self
                .generate_study_plan(&exam_name, days_until_exam, &weaknesses)
                .await
                .map(GeneratedContent::StudyPlan),
            GenerationRequest::FlashcardDeck { topic, count } => self
                .generate_flashcards(&topic, count)
                .await
                .map(GeneratedContent::FlashcardDeck),
            GenerationRequest::Quiz {
                topic,
                difficulty,
                count,
            } => self
                .generate_quiz(&topic, difficulty, count)
                .await
                .map(GeneratedContent::Quiz),
        }
    }

    //=====================================================================================
    // Shared Request Path
    //=====================================================================================

    /// Calls the provider once and decodes its answer as `T`.
    ///
    /// Empty text is the soft-failure case and yields `Ok(None)`. Malformed JSON,
    /// a structural mismatch, or a transport failure yields an error.
    async fn request_structured<T: DeserializeOwned>(
        &self,
        kind: ContentKind,
        prompt: String,
        system_instruction: &'static str,
    ) -> GenerationResult<Option<T>> {
        let schema = schema_for(kind);
        info!(%kind, model = %self.model, "Requesting structured content from provider");
        debug!(%kind, "Prompt: {}", prompt);

        let request = StructuredRequest {
            kind,
            model: self.model.clone(),
            prompt,
            system_instruction,
            schema: schema.clone(),
        };

        let text = match self.provider.generate_structured(request).await {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => {
                warn!(%kind, "Provider returned an empty response");
                return Ok(None);
            }
            Err(e) => {
                error!(%kind, "Error generating {}: {}", kind, e);
                return Err(e);
            }
        };
        debug!(%kind, bytes = text.len(), "Received provider response");

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            error!(%kind, "Provider response is not valid JSON: {}", e);
            GenerationError::Malformed(e.to_string())
        })?;

        schema.validate(&value).map_err(|violation| {
            error!(%kind, "Provider response failed schema validation: {}", violation);
            GenerationError::from((kind, violation))
        })?;

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| GenerationError::shape_mismatch(kind, e))
    }
}

fn require_text(field: &str, value: &str) -> GenerationResult<()> {
    if value.trim().is_empty() {
        return Err(GenerationError::InvalidRequest(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

fn require_positive(field: &str, value: u32) -> GenerationResult<()> {
    if value == 0 {
        return Err(GenerationError::InvalidRequest(format!(
            "{} must be at least 1",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    enum Reply {
        Text(String),
        Nothing,
        Fail,
    }

    /// Stub provider that answers every call with the same reply and records the requests.
    struct StubProvider {
        reply: Reply,
        calls: Mutex<Vec<StructuredRequest>>,
    }

    impl StubProvider {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn returning(value: Value) -> Arc<Self> {
            Self::new(Reply::Text(value.to_string()))
        }

        fn calls(&self) -> Vec<StructuredRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StructuredGenerationService for StubProvider {
        async fn generate_structured(
            &self,
            request: StructuredRequest,
        ) -> GenerationResult<Option<String>> {
            self.calls.lock().unwrap().push(request);
            match &self.reply {
                Reply::Text(text) => Ok(Some(text.clone())),
                Reply::Nothing => Ok(None),
                Reply::Fail => Err(GenerationError::Provider("connection reset".to_string())),
            }
        }
    }

    fn generator(provider: Arc<StubProvider>) -> StudyContentGenerator {
        StudyContentGenerator::new(provider, "test-model")
    }

    fn plan_fixture(days: u32) -> Value {
        let schedule: Vec<Value> = (1..=days)
            .map(|day| {
                json!({
                    "day": day,
                    "topic": format!("Geometry part {}", day),
                    "focus": "Practice problems",
                    "activities": ["Review notes", "Timed drill"]
                })
            })
            .collect();
        json!({ "examName": "SAT", "targetDate": "Day 7", "schedule": schedule })
    }

    fn deck_fixture(count: usize) -> Value {
        let cards: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "id": format!("card-{}", i),
                    "front": format!("Term {}", i),
                    "back": format!("Definition {}", i),
                    "category": "Biology"
                })
            })
            .collect();
        Value::Array(cards)
    }

    fn quiz_fixture(count: usize) -> Value {
        let questions: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "id": format!("q{}", i),
                    "question": format!("Solve equation {}", i),
                    "options": ["x = 1", "x = 2", "x = 3", "x = 4"],
                    "correctAnswerIndex": i % 4,
                    "explanation": "Isolate x."
                })
            })
            .collect();
        Value::Array(questions)
    }

    #[tokio::test]
    async fn study_plan_round_trips_provider_payload() {
        let fixture = plan_fixture(7);
        let provider = StubProvider::returning(fixture.clone());

        let plan = generator(provider.clone())
            .generate_study_plan("SAT", 7, "geometry")
            .await
            .unwrap()
            .expect("plan should be present");

        let expected: StudyPlan = serde_json::from_value(fixture).unwrap();
        assert_eq!(plan, expected);
        assert_eq!(plan.schedule.len(), 7);
        assert!(plan.schedule.iter().all(|day| !day.topic.is_empty()));
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn study_plan_without_days_is_treated_as_empty() {
        let provider = StubProvider::returning(json!({
            "examName": "SAT",
            "targetDate": "x",
            "schedule": []
        }));

        let plan = generator(provider.clone())
            .generate_study_plan("SAT", 7, "geometry")
            .await
            .unwrap();

        assert_eq!(plan, None);
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn study_plan_request_embeds_parameters_and_schema() {
        let provider = StubProvider::returning(plan_fixture(1));

        generator(provider.clone())
            .generate_study_plan("AP Biology", 12, "cell respiration")
            .await
            .unwrap();

        let calls = provider.calls();
        let request = &calls[0];
        assert_eq!(request.kind, ContentKind::StudyPlan);
        assert_eq!(request.model, "test-model");
        assert!(request
            .prompt
            .contains("Create a study plan for the AP Biology exam which is in 12 days."));
        assert!(request.prompt.contains("My weak areas are: cell respiration."));
        assert_eq!(request.system_instruction, STUDY_PLAN_SYSTEM_INSTRUCTION);
        assert_eq!(request.schema, schema_for(ContentKind::StudyPlan));
    }

    #[tokio::test]
    async fn flashcards_preserve_provider_order() {
        let fixture = deck_fixture(5);
        let provider = StubProvider::returning(fixture.clone());

        let cards = generator(provider.clone())
            .generate_flashcards("Photosynthesis", Some(5))
            .await
            .unwrap();

        assert_eq!(cards, serde_json::from_value::<Vec<Flashcard>>(fixture).unwrap());
        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["card-0", "card-1", "card-2", "card-3", "card-4"]);
        assert_eq!(
            provider.calls()[0].prompt,
            "Generate 5 flashcards for the topic: \"Photosynthesis\". keep definitions concise."
        );
    }

    #[tokio::test]
    async fn flashcard_count_defaults_to_five() {
        let provider = StubProvider::returning(deck_fixture(5));

        generator(provider.clone())
            .generate_flashcards("Mitosis", None)
            .await
            .unwrap();

        assert!(provider.calls()[0].prompt.starts_with("Generate 5 flashcards"));
    }

    #[tokio::test]
    async fn quiz_questions_have_answer_within_options() {
        let fixture = quiz_fixture(3);
        let provider = StubProvider::returning(fixture.clone());

        let questions = generator(provider.clone())
            .generate_quiz("Algebra", Difficulty::Hard, Some(3))
            .await
            .unwrap();

        assert_eq!(
            questions,
            serde_json::from_value::<Vec<QuizQuestion>>(fixture).unwrap()
        );
        assert!(questions
            .iter()
            .all(|q| q.correct_answer_index < q.options.len()));
        let request = &provider.calls()[0];
        assert_eq!(
            request.prompt,
            "Generate a 3-question multiple choice quiz on \"Algebra\" at Hard level."
        );
        assert_eq!(request.system_instruction, QUIZ_SYSTEM_INSTRUCTION);
    }

    #[tokio::test]
    async fn quiz_rejects_answer_index_outside_options() {
        let provider = StubProvider::returning(json!([{
            "id": "q1",
            "question": "Pick one",
            "options": ["a", "b"],
            "correctAnswerIndex": 3,
            "explanation": "None fit."
        }]));

        let err = generator(provider)
            .generate_quiz("Logic", Difficulty::Easy, Some(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationError::ShapeMismatch {
                kind: ContentKind::Quiz,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn empty_responses_yield_empty_values() {
        for reply in [Reply::Nothing, Reply::Text(String::new())] {
            let client = generator(StubProvider::new(reply));
            let plan = client.generate_study_plan("SAT", 7, "geometry").await.unwrap();
            assert_eq!(plan, None);
        }
        for reply in [Reply::Nothing, Reply::Text(String::new())] {
            let client = generator(StubProvider::new(reply));
            let cards = client.generate_flashcards("Photosynthesis", None).await.unwrap();
            assert!(cards.is_empty());
        }
        for reply in [Reply::Nothing, Reply::Text(String::new())] {
            let client = generator(StubProvider::new(reply));
            let questions = client
                .generate_quiz("Algebra", Difficulty::Intermediate, None)
                .await
                .unwrap();
            assert!(questions.is_empty());
        }
    }

    #[tokio::test]
    async fn malformed_json_fails_every_operation() {
        let broken = || StubProvider::new(Reply::Text("[{\"id\": \"1\", \"front\":".to_string()));

        let plan = generator(broken()).generate_study_plan("SAT", 7, "geometry").await;
        assert!(matches!(plan, Err(GenerationError::Malformed(_))));

        let cards = generator(broken()).generate_flashcards("Photosynthesis", None).await;
        assert!(matches!(cards, Err(GenerationError::Malformed(_))));

        let quiz = generator(broken())
            .generate_quiz("Algebra", Difficulty::Hard, None)
            .await;
        assert!(matches!(quiz, Err(GenerationError::Malformed(_))));
    }

    #[tokio::test]
    async fn shape_mismatch_is_distinct_from_malformed_json() {
        let provider = StubProvider::returning(json!({ "examName": "SAT", "schedule": [] }));

        let err = generator(provider)
            .generate_study_plan("SAT", 7, "geometry")
            .await
            .unwrap_err();

        match err {
            GenerationError::ShapeMismatch { kind, violation } => {
                assert_eq!(kind, ContentKind::StudyPlan);
                assert!(violation.contains("$.targetDate"));
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn provider_failure_is_returned_once_without_retry() {
        let provider = StubProvider::new(Reply::Fail);

        let err = generator(provider.clone())
            .generate_flashcards("Photosynthesis", None)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Provider(_)));
        assert!(!err.is_caller_error());
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_provider() {
        let provider = StubProvider::returning(deck_fixture(1));
        let client = generator(provider.clone());

        let blank_topic = client.generate_flashcards("   ", None).await.unwrap_err();
        assert!(blank_topic.is_caller_error());
        let zero_days = client.generate_study_plan("SAT", 0, "geometry").await.unwrap_err();
        assert!(zero_days.is_caller_error());
        let zero_count = client
            .generate_quiz("Algebra", Difficulty::Easy, Some(0))
            .await
            .unwrap_err();
        assert!(zero_count.is_caller_error());

        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn generate_dispatches_on_request_kind() {
        let provider = StubProvider::returning(deck_fixture(2));

        let content = generator(provider.clone())
            .generate(GenerationRequest::FlashcardDeck {
                topic: "Cells".to_string(),
                count: Some(2),
            })
            .await
            .unwrap();

        assert_eq!(content.kind(), ContentKind::FlashcardDeck);
        assert!(!content.is_empty());
        assert_eq!(provider.calls()[0].kind, ContentKind::FlashcardDeck);
    }
}
