//! Journey: record dreams, read them back, find them by meaning

use std::sync::Arc;

use somnia_core::{CreativeFormat, DreamStore, Emotion, EmotionTag, PREVIEW_CHARS};
use somnia_e2e_tests::harness::TestJournal;
use somnia_e2e_tests::mocks::{KeywordEmbedder, ScriptedGenerator, TestDataFactory, SAMPLE_DREAMS};
use tempfile::TempDir;

fn generator() -> Arc<ScriptedGenerator> {
    Arc::new(
        ScriptedGenerator::new()
            .with_emotion_rule("lobos", "Miedo")
            .with_emotion_rule("feliz", "Alegría")
            .with_default_emotion("Tristeza"),
    )
}

#[tokio::test]
async fn test_record_list_show() {
    let journal = TestJournal::new_temp();
    let pipeline = journal.pipeline(generator(), Arc::new(KeywordEmbedder::new()));

    let submissions = TestDataFactory::record_samples(&pipeline).await;
    assert!(submissions.iter().all(|s| s.fully_enriched()));
    assert_eq!(journal.dream_count(), 3);

    // Newest first
    let previews = journal.storage.fetch_all().unwrap();
    let titles: Vec<&str> = previews.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![SAMPLE_DREAMS[2].0, SAMPLE_DREAMS[1].0, SAMPLE_DREAMS[0].0]
    );

    let wolves = journal
        .storage
        .fetch_by_id(submissions[0].record_id().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(wolves.content, SAMPLE_DREAMS[0].1);
    assert_eq!(wolves.emotion, EmotionTag::Category(Emotion::Fear));
    assert_eq!(wolves.creative_format, CreativeFormat::Poem);
    assert_eq!(wolves.creative_text, "Versos nacidos del sueño");
    assert_eq!(
        wolves.rendered_analysis(),
        "Interpretación:\nUn tránsito interior\n\nConsejo:\nEscribe lo que recuerdes"
    );
    assert_eq!(wolves.insight().unwrap().symbols, vec!["camino".to_string()]);
    assert_eq!(wolves.embedding_model.as_deref(), Some(KeywordEmbedder::DEFAULT_MODEL));

    let flight = &submissions[1];
    assert_eq!(flight.emotion, EmotionTag::Category(Emotion::Joy));
    assert_eq!(submissions[2].emotion, EmotionTag::Category(Emotion::Sadness));
}

#[tokio::test]
async fn test_previews_truncate_long_content() {
    let journal = TestJournal::new_temp();
    let pipeline = journal.pipeline(generator(), Arc::new(KeywordEmbedder::new()));

    let content = "Soñé que caminaba por un pasillo sin fin. ".repeat(20);
    let submission = pipeline.submit("Pasillo", &content, "poema").await.unwrap();

    let previews = journal.storage.fetch_all().unwrap();
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].preview.chars().count(), PREVIEW_CHARS);
    assert!(content.starts_with(&previews[0].preview));

    let full = journal
        .storage
        .fetch_by_id(submission.record_id().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(full.content, content.trim());
}

#[tokio::test]
async fn test_search_ranks_identical_dream_first() {
    let journal = TestJournal::new_temp();
    let embedder = Arc::new(KeywordEmbedder::new());
    let pipeline = journal.pipeline(generator(), embedder.clone());
    let submissions = TestDataFactory::record_samples(&pipeline).await;

    let retriever = journal.retriever(embedder);
    let results = retriever.search(SAMPLE_DREAMS[2].1).await.unwrap();

    assert_eq!(results.scored, 3);
    assert_eq!(results.skipped, 0);
    assert_eq!(results.hits[0].id, submissions[2].record_id().unwrap());
    assert_eq!(results.hits[0].title, SAMPLE_DREAMS[2].0);
    assert!((results.hits[0].score - 1.0).abs() < 1e-5);
    for pair in results.hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_search_empty_journal() {
    let journal = TestJournal::new_temp();
    let embedder = Arc::new(KeywordEmbedder::new());

    let results = journal.retriever(embedder.clone()).search("lobos").await.unwrap();
    assert!(results.is_empty());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn test_dreams_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("journal.db");

    {
        let journal = TestJournal::new_at_path(path.clone());
        let pipeline = journal.pipeline(generator(), Arc::new(KeywordEmbedder::new()));
        TestDataFactory::record_samples(&pipeline).await;
    }

    let journal = TestJournal::new_at_path(path);
    assert_eq!(journal.dream_count(), 3);

    let results = journal
        .retriever(Arc::new(KeywordEmbedder::new()))
        .search(SAMPLE_DREAMS[0].1)
        .await
        .unwrap();
    assert_eq!(results.hits[0].title, SAMPLE_DREAMS[0].0);
}

#[tokio::test]
async fn test_embedding_model_change_skips_old_vectors() {
    let journal = TestJournal::new_temp();
    let pipeline = journal.pipeline(generator(), Arc::new(KeywordEmbedder::new()));
    TestDataFactory::record_samples(&pipeline).await;

    let upgraded = Arc::new(KeywordEmbedder::with_model("keyword-hash-v2", 64));
    let results = journal
        .retriever(upgraded.clone())
        .search(SAMPLE_DREAMS[0].1)
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(results.skipped, 3);
    // Nothing comparable, so the query is never embedded
    assert_eq!(upgraded.calls(), 0);
}
