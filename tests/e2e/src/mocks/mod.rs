//! Stub collaborators and fixture data

mod fixtures;

pub use collaborators::{FailingEmbedder, KeywordEmbedder, ScriptedGenerator};
pub use fixtures::{TestDataFactory, MESSY_ANALYSES, SAMPLE_DREAMS};
