use std::collections::HashMap;

use env_logger::{Builder, Env};
use tagsift::store::CategoryId;
use tagsift::{
    Category, Classifier, ClassifierError, CountMap, CountStore, Document, MemoryStore, Polarity, StoreError,
    TrainOutcome,
};

fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}

/// Operations of [`FaultyStore`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    AllCategories,
    FeatureCounts,
    SaveFeatureCounts,
    SaveCategoryDocumentCounts,
    SaveDocument,
    DeleteDocument,
    SaveDocumentCategories,
}

/// A memory store that fails one chosen operation.
#[derive(Debug, Default)]
struct FaultyStore {
    inner: MemoryStore,
    failing: Option<Op>,
}

impl FaultyStore {
    fn fail(&mut self, op: Op) {
        self.failing = Some(op);
    }

    fn heal(&mut self) {
        self.failing = None;
    }

    fn check(&self, op: Op) -> Result<(), StoreError> {
        if self.failing == Some(op) {
            Err(StoreError::backend(format!("injected failure in {:?}", op)))
        } else {
            Ok(())
        }
    }
}

impl CountStore for FaultyStore {
    fn get_or_create_category(&mut self, name: &str, polarity: Polarity) -> Result<Category, StoreError> {
        self.inner.get_or_create_category(name, polarity)
    }

    fn all_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.check(Op::AllCategories)?;
        self.inner.all_categories()
    }

    fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, StoreError> {
        self.inner.categories_by_ids(ids)
    }

    fn document_by_hash(&self, hash: &str) -> Result<Option<Document>, StoreError> {
        self.inner.document_by_hash(hash)
    }

    fn save_document(&mut self, document: &Document) -> Result<(), StoreError> {
        self.check(Op::SaveDocument)?;
        self.inner.save_document(document)
    }

    fn delete_document(&mut self, document: &Document) -> Result<(), StoreError> {
        self.check(Op::DeleteDocument)?;
        self.inner.delete_document(document)
    }

    fn feature_counts(&self, features: &[String]) -> Result<HashMap<String, CountMap>, StoreError> {
        self.check(Op::FeatureCounts)?;
        self.inner.feature_counts(features)
    }

    fn save_feature_counts(&mut self, feature: &str, counts: &CountMap) -> Result<(), StoreError> {
        self.check(Op::SaveFeatureCounts)?;
        self.inner.save_feature_counts(feature, counts)
    }

    fn category_document_counts(&self) -> Result<CountMap, StoreError> {
        self.inner.category_document_counts()
    }

    fn save_category_document_counts(&mut self, counts: &CountMap) -> Result<(), StoreError> {
        self.check(Op::SaveCategoryDocumentCounts)?;
        self.inner.save_category_document_counts(counts)
    }

    fn total_document_count(&self) -> Result<u64, StoreError> {
        self.inner.total_document_count()
    }

    fn document_categories(&self, document: &Document) -> Result<Vec<Category>, StoreError> {
        self.inner.document_categories(document)
    }

    fn save_document_categories(&mut self, document: &Document, categories: &[Category]) -> Result<(), StoreError> {
        self.check(Op::SaveDocumentCategories)?;
        self.inner.save_document_categories(document, categories)
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        self.inner.begin()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.inner.rollback()
    }
}

fn trained_store(classifier: &Classifier) -> Result<FaultyStore, Box<dyn std::error::Error>> {
    let trainer = classifier.trainer();
    let mut store = FaultyStore::default();
    trainer.train(&mut store, "buy cheap watches now", &["spam"], &[])?;
    trainer.train(&mut store, "schedule meeting tomorrow", &[], &["spam"])?;
    Ok(store)
}

#[test]
fn test_failed_train_leaves_no_partial_writes() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().build()?;
    let trainer = classifier.trainer();
    let mut store = trained_store(&classifier)?;
    let before = store.inner.state().clone();

    for op in [
        Op::SaveFeatureCounts,
        Op::SaveCategoryDocumentCounts,
        Op::SaveDocument,
        Op::SaveDocumentCategories,
    ] {
        store.fail(op);
        let result = trainer.train(&mut store, "cheap watches for the quarterly meeting", &["spam", "news"], &[]);
        assert!(matches!(result, Err(ClassifierError::TrainFailure(_))), "{:?}", op);
        assert_eq!(store.inner.state(), &before, "partial write after failing {:?}", op);
        assert!(!store.inner.in_transaction());
    }

    store.heal();
    let outcome = trainer.train(&mut store, "cheap watches for the quarterly meeting", &["spam", "news"], &[])?;
    assert_eq!(outcome, TrainOutcome::Trained);
    Ok(())
}

#[test]
fn test_failed_untrain_leaves_no_partial_writes() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().build()?;
    let trainer = classifier.trainer();
    let mut store = trained_store(&classifier)?;
    let before = store.inner.state().clone();

    for op in [Op::SaveFeatureCounts, Op::SaveCategoryDocumentCounts, Op::DeleteDocument] {
        store.fail(op);
        let result = trainer.untrain(&mut store, "buy cheap watches now");
        assert!(matches!(result, Err(ClassifierError::UntrainFailure(_))), "{:?}", op);
        assert_eq!(store.inner.state(), &before, "partial write after failing {:?}", op);
    }
    Ok(())
}

#[test]
fn test_index_load_failure_aborts_classification() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().build()?;
    let mut store = trained_store(&classifier)?;

    for op in [Op::FeatureCounts, Op::AllCategories] {
        store.fail(op);
        let result = classifier.classify(&store, "buy cheap watches");
        match result {
            Err(ClassifierError::IndexLoadFailure(StoreError::Backend(message))) => {
                assert!(message.contains("injected failure"));
            }
            other => panic!("expected an index load failure, got {:?}", other),
        }
    }

    store.heal();
    assert_eq!(classifier.classify(&store, "buy cheap watches")?, vec![("spam".to_string(), true)]);
    Ok(())
}

#[test]
fn test_incomplete_tag_is_skipped() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let classifier = Classifier::builder().build()?;
    let mut store = trained_store(&classifier)?;

    // A tag with only one polarity cannot be scored; the others still are.
    store.inner.get_or_create_category("aardvark", Polarity::No)?;
    let decisions = classifier.classify(&store, "buy cheap watches")?;
    assert_eq!(decisions, vec![("spam".to_string(), true)]);
    Ok(())
}

#[test]
fn test_store_error_messages() {
    let err = ClassifierError::IndexLoadFailure(StoreError::backend("disk on fire"));
    assert_eq!(err.to_string(), "Failed to load classifier index: Backend error: disk on fire");
}
