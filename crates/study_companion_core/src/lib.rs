pub mod domain;
pub mod generation;
pub mod ports;
pub mod quiz;
pub mod schema;

pub use domain::{
    ContentKind, Difficulty, Flashcard, GeneratedContent, GenerationRequest, QuizQuestion,
    QuizResult, StudyPlan, StudyPlanDay,
};
pub use generation::{StudyContentGenerator, DEFAULT_ITEM_COUNT};
pub use ports::{GenerationError, GenerationResult, StructuredGenerationService, StructuredRequest};
pub use quiz::grade_quiz;
pub use schema::{schema_for, FieldDescriptor, SchemaDescriptor, ShapeViolation};
