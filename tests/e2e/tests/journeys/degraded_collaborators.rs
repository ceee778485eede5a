//! Journey: enrichment with unreliable collaborators and malformed output

use std::sync::Arc;

use somnia_core::pipeline::{ANALYSIS_ERROR_PREFIX, CREATIVE_ERROR_PREFIX};
use somnia_core::{DreamStore, Emotion, EmotionTag, LlmError, ValidationError};
use somnia_e2e_tests::harness::TestJournal;
use somnia_e2e_tests::mocks::{
    FailingEmbedder, KeywordEmbedder, ScriptedGenerator, MESSY_ANALYSES, SAMPLE_DREAMS,
};

#[tokio::test]
async fn test_embedding_outage_still_saves_dream() {
    let journal = TestJournal::new_temp();
    let pipeline = journal.pipeline(Arc::new(ScriptedGenerator::new()), Arc::new(FailingEmbedder));

    let (title, content, format) = SAMPLE_DREAMS[0];
    let submission = pipeline.submit(title, content, format).await.unwrap();

    assert!(submission.embedding.is_err());
    assert!(submission.creative.is_ok());
    assert!(submission.analysis.is_ok());
    assert_eq!(submission.emotion, EmotionTag::Category(Emotion::Calm));

    let record = journal
        .storage
        .fetch_by_id(submission.record_id().unwrap())
        .unwrap()
        .unwrap();
    assert!(!record.has_embedding());
    assert!(record.embedding_model.is_none());

    // Unembedded dreams are left out of ranking entirely
    let results = journal
        .retriever(Arc::new(KeywordEmbedder::new()))
        .search(content)
        .await
        .unwrap();
    assert!(results.is_empty());
    assert_eq!(results.skipped, 0);
}

#[tokio::test]
async fn test_search_ignores_only_the_unembedded_dreams() {
    let journal = TestJournal::new_temp();
    let generator = Arc::new(ScriptedGenerator::new());

    let offline = journal.pipeline(generator.clone(), Arc::new(FailingEmbedder));
    let (title, content, format) = SAMPLE_DREAMS[0];
    offline.submit(title, content, format).await.unwrap();

    let embedder = Arc::new(KeywordEmbedder::new());
    let online = journal.pipeline(generator, embedder.clone());
    for (title, content, format) in &SAMPLE_DREAMS[1..] {
        online.submit(title, content, format).await.unwrap();
    }

    let results = journal.retriever(embedder).search(SAMPLE_DREAMS[1].1).await.unwrap();
    assert_eq!(journal.dream_count(), 3);
    assert_eq!(results.scored, 2);
    assert_eq!(results.hits[0].title, SAMPLE_DREAMS[1].0);
}

#[tokio::test]
async fn test_generation_outage_stores_sentinels() {
    let journal = TestJournal::new_temp();
    let pipeline = journal.pipeline(
        Arc::new(ScriptedGenerator::unavailable(LlmError::Network(
            "connection refused".to_string(),
        ))),
        Arc::new(KeywordEmbedder::new()),
    );

    let (title, content, format) = SAMPLE_DREAMS[1];
    let submission = pipeline.submit(title, content, format).await.unwrap();
    assert_eq!(submission.emotion, EmotionTag::ServiceError);
    assert!(submission.embedding.is_ok());
    assert!(submission.saved.is_ok());

    let record = journal
        .storage
        .fetch_by_id(submission.record_id().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(record.emotion.label(), "Error_IA");
    assert!(record.creative_text.starts_with(CREATIVE_ERROR_PREFIX));
    assert!(record.analysis_text.starts_with(ANALYSIS_ERROR_PREFIX));
    assert!(record.analysis_text.contains("connection refused"));
    // Nothing structured to recover: the raw sentinel is shown as is
    assert_eq!(record.rendered_analysis(), record.analysis_text);
}

#[tokio::test]
async fn test_malformed_analyses_render_consistently() {
    for (raw, expected) in MESSY_ANALYSES {
        let journal = TestJournal::new_temp();
        let pipeline = journal.pipeline(
            Arc::new(ScriptedGenerator::new().with_analysis(raw)),
            Arc::new(KeywordEmbedder::new()),
        );

        let submission = pipeline.submit("Análisis", "Un sueño cualquiera", "poema").await.unwrap();
        assert_eq!(submission.rendered_analysis(), *expected, "raw analysis: {}", raw);

        let record = journal
            .storage
            .fetch_by_id(submission.record_id().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(record.analysis_text, *raw);
        assert_eq!(record.rendered_analysis(), *expected);
    }
}

#[tokio::test]
async fn test_label_recovery() {
    let journal = TestJournal::new_temp();
    let embedder = Arc::new(KeywordEmbedder::new());

    let chatty = journal.pipeline(
        Arc::new(ScriptedGenerator::new().with_default_emotion("Diría que hay mucho MIEDO aquí.")),
        embedder.clone(),
    );
    let submission = chatty.submit("Sombras", "Sombras en la pared", "poema").await.unwrap();
    assert_eq!(submission.emotion, EmotionTag::Category(Emotion::Fear));

    let confused = journal.pipeline(
        Arc::new(ScriptedGenerator::new().with_default_emotion("No estoy seguro")),
        embedder,
    );
    let submission = confused.submit("Niebla", "Todo era niebla", "poema").await.unwrap();
    assert_eq!(submission.emotion, EmotionTag::Unclassified);

    let record = journal
        .storage
        .fetch_by_id(submission.record_id().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(record.emotion.label(), "Indefinida");
}

#[tokio::test]
async fn test_invalid_submissions_touch_nothing() {
    let journal = TestJournal::new_temp();
    let generator = Arc::new(ScriptedGenerator::new());
    let embedder = Arc::new(KeywordEmbedder::new());
    let pipeline = journal.pipeline(generator.clone(), embedder.clone());

    assert_eq!(
        pipeline.submit("   ", "contenido", "poema").await.unwrap_err(),
        ValidationError::EmptyTitle
    );
    assert_eq!(
        pipeline.submit("Título", "", "poema").await.unwrap_err(),
        ValidationError::EmptyContent
    );
    assert!(matches!(
        pipeline.submit("Título", "contenido", "haiku").await.unwrap_err(),
        ValidationError::UnknownFormat(_)
    ));

    assert!(journal.is_empty());
    assert_eq!(generator.calls(), 0);
    assert_eq!(embedder.calls(), 0);
}
