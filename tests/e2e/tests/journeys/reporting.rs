//! Journey: emotion reporting over the stored journal

use std::sync::Arc;

use somnia_core::{Emotion, EmotionTag};
use somnia_e2e_tests::harness::TestJournal;
use somnia_e2e_tests::mocks::{KeywordEmbedder, ScriptedGenerator, TestDataFactory};

#[test]
fn test_metrics_over_seeded_journal() {
    let journal = TestJournal::new_temp();
    let seeded = [
        (EmotionTag::Category(Emotion::Fear), "lobos"),
        (EmotionTag::ServiceError, "servicio caído"),
        (EmotionTag::Category(Emotion::Joy), "vuelo"),
        (EmotionTag::Category(Emotion::Fear), "sombras"),
        (EmotionTag::Unclassified, "niebla"),
    ];
    for (emotion, content) in seeded {
        TestDataFactory::seed(&journal.storage, emotion, content);
    }

    let report = journal.metrics().report().unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.excluded, 2);
    assert_eq!(report.counts.get(Emotion::Fear), 2);
    assert_eq!(report.counts.get(Emotion::Joy), 1);
    assert_eq!(report.counts.get(Emotion::Sadness), 0);
    assert_eq!(report.counts.get(Emotion::Anger), 0);
    assert_eq!(report.counts.get(Emotion::Calm), 0);
    assert_eq!(report.counts.total() + report.excluded, report.total);

    // Insertion order is chronological order
    let timeline: Vec<EmotionTag> = report.timeline.iter().map(|(_, tag)| *tag).collect();
    let expected: Vec<EmotionTag> = seeded.iter().map(|(tag, _)| *tag).collect();
    assert_eq!(timeline, expected);
    for pair in report.timeline.windows(2) {
        assert!(pair[0].0 <= pair[1].0);
    }

    assert_eq!(report.corpus_text, "lobos servicio caído vuelo sombras niebla");

    let days = report.daily_breakdown();
    let per_day: usize = days.iter().map(|d| d.counts.total() + d.excluded).sum();
    assert_eq!(per_day, report.total);
}

#[test]
fn test_metrics_on_empty_journal() {
    let journal = TestJournal::new_temp();
    let report = journal.metrics().report().unwrap();

    assert!(report.is_empty());
    assert_eq!(report.counts.iter().count(), 5);
    assert!(report.counts.iter().all(|(_, count)| count == 0));
    assert!(report.daily_breakdown().is_empty());
}

#[tokio::test]
async fn test_metrics_after_recording() {
    let journal = TestJournal::new_temp();
    let generator = ScriptedGenerator::new()
        .with_emotion_rule("lobos", "Miedo")
        .with_emotion_rule("feliz", "Alegría")
        .with_default_emotion("Tristeza");
    let pipeline = journal.pipeline(Arc::new(generator), Arc::new(KeywordEmbedder::new()));
    TestDataFactory::record_samples(&pipeline).await;

    let report = journal.metrics().report().unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.excluded, 0);
    for emotion in [Emotion::Fear, Emotion::Joy, Emotion::Sadness] {
        assert_eq!(report.counts.get(emotion), 1);
    }

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["counts"]["Miedo"], 1);
    assert_eq!(json["total"], 3);
    let timeline_labels: Vec<&str> = json["timeline"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry[1].as_str().unwrap())
        .collect();
    assert_eq!(timeline_labels, vec!["Miedo", "Alegría", "Tristeza"]);
}
