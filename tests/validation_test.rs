use std::fs;

use tagsift::{
    Classifier, ClassifierConfig, ClassifierError, CountStore, FileStore, MemoryStore, ScorerKind, StoreError,
    Thresholds,
};

#[test]
fn test_builder_validation() {
    assert!(matches!(
        Classifier::builder().with_thresholds("spam", Thresholds::new(0.5, 1.1)),
        Err(ClassifierError::ValidationError(_))
    ));
    assert!(matches!(
        Classifier::builder().with_thresholds("", Thresholds::default()),
        Err(ClassifierError::ValidationError(_))
    ));
    assert!(matches!(
        Classifier::builder().with_smoothing(-2.0, 0.5),
        Err(ClassifierError::ValidationError(_))
    ));
}

#[test]
fn test_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tagsift.json");
    fs::write(
        &path,
        r#"{
            "scorer": "fisher",
            "max_features": 2,
            "thresholds": { "spam": { "yes_min": 0.9, "no_min": 0.4 } }
        }"#,
    )?;

    let config = ClassifierConfig::from_file(&path)?;
    let classifier = Classifier::builder().with_config(config).build()?;
    let info = classifier.info();
    assert_eq!(info.scorer, ScorerKind::Fisher);
    assert_eq!(info.max_features, 2);
    assert_eq!(classifier.config().thresholds_for("spam"), Thresholds::new(0.9, 0.4));
    assert_eq!(classifier.features("buy cheap watches now"), vec!["bui", "cheap"]);
    Ok(())
}

#[test]
fn test_malformed_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tagsift.json");
    fs::write(&path, r#"{ "scorer": "perceptron" }"#)?;
    assert!(matches!(ClassifierConfig::from_file(&path), Err(ClassifierError::ConfigError(_))));

    fs::write(&path, r#"{ "assumed_probability": 3.0 }"#)?;
    assert!(matches!(ClassifierConfig::from_file(&path), Err(ClassifierError::ValidationError(_))));
    Ok(())
}

#[test]
fn test_corrupt_store_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("store.json");
    fs::write(&path, "not json at all")?;
    assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
    Ok(())
}

#[test]
fn test_train_with_no_tags() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = Classifier::builder().build()?;
    let mut store = MemoryStore::new();
    classifier.trainer().train(&mut store, "buy cheap watches", &[], &[])?;

    // The document is recorded but carries no counts.
    assert_eq!(store.total_document_count()?, 1);
    assert_eq!(store.feature_count(), 0);
    assert!(classifier.classify(&store, "buy cheap watches")?.is_empty());
    Ok(())
}
