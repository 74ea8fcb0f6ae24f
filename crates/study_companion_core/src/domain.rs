//! crates/study_companion_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! Field names serialize in camelCase because the generation provider emits
//! (and the front-end consumes) that exact JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//=========================================================================================
// Generated Content
//=========================================================================================

/// A day-by-day plan leading up to an exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub exam_name: String,
    /// Free-form; the provider picks the format.
    pub target_date: String,
    pub schedule: Vec<StudyPlanDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanDay {
    pub day: u32,
    pub topic: String,
    pub focus: String,
    pub activities: Vec<String>,
}

/// A single card in a generated deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    /// Assigned by the provider. Not guaranteed unique within a deck.
    pub id: String,
    pub front: String,
    pub back: String,
    pub category: String,
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    pub explanation: String,
}

/// The outcome of a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub topic: String,
    pub date: DateTime<Utc>,
}

//=========================================================================================
// Requests
//=========================================================================================

/// How hard the generated quiz questions should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Difficulty {
    Easy,
    #[default]
    Intermediate,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

/// The three kinds of content the provider can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    StudyPlan,
    FlashcardDeck,
    Quiz,
}

impl ContentKind {
    /// Identifier used when naming the response schema sent to the provider.
    pub fn schema_name(self) -> &'static str {
        match self {
            ContentKind::StudyPlan => "study_plan",
            ContentKind::FlashcardDeck => "flashcard_deck",
            ContentKind::Quiz => "quiz",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentKind::StudyPlan => "study plan",
            ContentKind::FlashcardDeck => "flashcard deck",
            ContentKind::Quiz => "quiz",
        };
        f.write_str(label)
    }
}

/// One user-initiated generation, tagged by content kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationRequest {
    StudyPlan {
        #[serde(rename = "examName")]
        exam_name: String,
        #[serde(rename = "daysUntilExam")]
        days_until_exam: u32,
        weaknesses: String,
    },
    FlashcardDeck {
        topic: String,
        #[serde(default)]
        count: Option<u32>,
    },
    Quiz {
        topic: String,
        #[serde(default)]
        difficulty: Difficulty,
        #[serde(default)]
        count: Option<u32>,
    },
}

impl GenerationRequest {
    pub fn kind(&self) -> ContentKind {
        match self {
            GenerationRequest::StudyPlan { .. } => ContentKind::StudyPlan,
            GenerationRequest::FlashcardDeck { .. } => ContentKind::FlashcardDeck,
            GenerationRequest::Quiz { .. } => ContentKind::Quiz,
        }
    }
}

/// The populated result of a `GenerationRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum GeneratedContent {
    StudyPlan(Option<StudyPlan>),
    FlashcardDeck(Vec<Flashcard>),
    Quiz(Vec<QuizQuestion>),
}

impl GeneratedContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            GeneratedContent::StudyPlan(_) => ContentKind::StudyPlan,
            GeneratedContent::FlashcardDeck(_) => ContentKind::FlashcardDeck,
            GeneratedContent::Quiz(_) => ContentKind::Quiz,
        }
    }

    /// True when the provider answered with nothing usable.
    pub fn is_empty(&self) -> bool {
        match self {
            GeneratedContent::StudyPlan(plan) => plan.is_none(),
            GeneratedContent::FlashcardDeck(cards) => cards.is_empty(),
            GeneratedContent::Quiz(questions) => questions.is_empty(),
        }
    }
}
