use std::sync::Arc;
use std::thread;

use env_logger::{Builder, Env};
use tagsift::{Classifier, CountStore, FileStore, MemoryStore, ScorerKind, TrainOutcome, UntrainOutcome};

// Initialize test logger
fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}

const CORPUS: &[(&str, &[&str], &[&str])] = &[
    ("Buy cheap watches now, limited offer!!!", &["spam"], &[]),
    ("Cheap pills and cheap watches, 90% off", &["spam"], &["finance"]),
    ("Win a free cruise, click now", &["spam"], &[]),
    ("Schedule the quarterly meeting for tomorrow", &[], &["spam"]),
    ("Quarterly earnings beat expectations, stock up 5%", &["finance"], &["spam"]),
    ("Meeting notes: budget review and hiring plan", &["finance"], &["spam"]),
];

fn train_corpus<S: CountStore>(classifier: &Classifier, store: &mut S) -> Result<(), Box<dyn std::error::Error>> {
    let trainer = classifier.trainer();
    for (text, yes, no) in CORPUS {
        trainer.train(store, text, yes, no)?;
    }
    Ok(())
}

#[test]
fn test_end_to_end_spam() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().build()?;
    let trainer = classifier.trainer();
    let mut store = MemoryStore::new();

    trainer.train(&mut store, "buy cheap watches now", &["spam"], &[])?;
    trainer.train(&mut store, "schedule meeting tomorrow", &[], &["spam"])?;

    let decisions = classifier.classify(&store, "buy cheap watches")?;
    assert_eq!(decisions, vec![("spam".to_string(), true)]);
    Ok(())
}

#[test]
fn test_training_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().build()?;
    let trainer = classifier.trainer();
    let mut store = MemoryStore::new();
    train_corpus(&classifier, &mut store)?;
    let once = store.state().clone();

    for (text, yes, no) in CORPUS {
        assert_eq!(trainer.train(&mut store, text, yes, no)?, TrainOutcome::AlreadyTrained);
    }
    assert_eq!(store.state(), &once);
    Ok(())
}

#[test]
fn test_untrain_is_inverse_of_train() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().build()?;
    let trainer = classifier.trainer();
    let mut store = MemoryStore::new();
    train_corpus(&classifier, &mut store)?;
    let before = store.state().clone();

    let text = "Cheap watches and a free meeting, 90% off tomorrow";
    trainer.train(&mut store, text, &["spam", "finance"], &[])?;
    assert_ne!(store.state(), &before);
    assert_eq!(trainer.untrain(&mut store, text)?, UntrainOutcome::Untrained);
    assert_eq!(store.state(), &before);

    // A second untrain finds nothing and changes nothing.
    assert_eq!(trainer.untrain(&mut store, text)?, UntrainOutcome::NotFound);
    assert_eq!(store.state(), &before);
    Ok(())
}

#[test]
fn test_untrain_everything_empties_counts() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().build()?;
    let trainer = classifier.trainer();
    let mut store = MemoryStore::new();
    train_corpus(&classifier, &mut store)?;

    for (text, _, _) in CORPUS {
        trainer.untrain(&mut store, text)?;
    }
    assert_eq!(store.total_document_count()?, 0);
    assert_eq!(store.feature_count(), 0);
    assert!(store.category_document_counts()?.is_empty());

    // Categories survive untraining, so every tag still gets a decision.
    let decisions = classifier.classify(&store, "cheap watches")?;
    assert_eq!(
        decisions,
        vec![("finance".to_string(), false), ("spam".to_string(), false)]
    );
    Ok(())
}

#[test]
fn test_classify_multiple_tags() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().build()?;
    let mut store = MemoryStore::new();
    train_corpus(&classifier, &mut store)?;

    let decisions = classifier.classify(&store, "cheap watches, click now")?;
    assert_eq!(
        decisions,
        vec![("finance".to_string(), false), ("spam".to_string(), true)]
    );

    let decisions = classifier.classify(&store, "quarterly budget meeting")?;
    assert_eq!(
        decisions,
        vec![("finance".to_string(), true), ("spam".to_string(), false)]
    );
    Ok(())
}

#[test]
fn test_fisher_scores_are_bounded() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().with_scorer(ScorerKind::Fisher).build()?;
    let mut store = MemoryStore::new();
    train_corpus(&classifier, &mut store)?;

    let inputs = [
        "",
        "the a an",
        "cheap cheap cheap",
        "quarterly earnings meeting tomorrow",
        "Buy cheap watches now, limited offer!!!",
        "completely unrelated words about gardening and tomatoes",
    ];
    for text in inputs {
        for score in classifier.classify_with_scores(&store, text)? {
            assert!((0.0..=1.0).contains(&score.yes_score), "{:?} on {:?}", score, text);
            assert!((0.0..=1.0).contains(&score.no_score), "{:?} on {:?}", score, text);
        }
    }
    Ok(())
}

#[test]
fn test_empty_document_still_classifies() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().build()?;
    let mut store = MemoryStore::new();
    train_corpus(&classifier, &mut store)?;

    assert!(classifier.features("a an the").is_empty());
    let scores = classifier.classify_with_scores(&store, "a an the")?;
    assert_eq!(scores.len(), 2);
    Ok(())
}

#[test]
fn test_file_store_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("store.json");
    let classifier = Classifier::builder().build()?;

    {
        let mut store = FileStore::open(&path)?;
        train_corpus(&classifier, &mut store)?;
    }

    let store = FileStore::open(&path)?;
    let mut memory = MemoryStore::new();
    train_corpus(&classifier, &mut memory)?;

    for text in ["cheap watches, click now", "quarterly budget meeting"] {
        assert_eq!(classifier.classify_with_scores(&store, text)?, classifier.classify_with_scores(&memory, text)?);
    }
    Ok(())
}

#[test]
fn test_shared_classifier_across_threads() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Arc::new(Classifier::builder().build()?);
    let mut store = MemoryStore::new();
    train_corpus(&classifier, &mut store)?;
    let store = Arc::new(store);

    let mut handles = vec![];
    for _ in 0..3 {
        let classifier = Arc::clone(&classifier);
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || classifier.classify(&*store, "cheap watches, click now")));
    }

    for handle in handles {
        let decisions = handle.join().map_err(|_| "thread panicked")??;
        assert_eq!(decisions[1], ("spam".to_string(), true));
    }
    Ok(())
}
