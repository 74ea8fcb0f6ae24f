pub mod study_llm;

pub use study_llm::OpenAiStudyAdapter;
