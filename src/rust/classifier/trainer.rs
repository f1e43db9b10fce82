use sha2::{Digest, Sha256};

use super::error::ClassifierError;
use super::features::FeatureExtractor;
use crate::store::{with_transaction, Category, CountStore, Document, Polarity, StoreError};

/// Result of a successful [`Trainer::train`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainOutcome {
    Trained,
    /// A document with the same content was trained before; nothing changed.
    AlreadyTrained,
}

/// Result of a successful [`Trainer::untrain`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UntrainOutcome {
    Untrained,
    /// No document with this content was trained; nothing changed.
    NotFound,
}

/// Hash identifying a document: hex SHA-256 of the trimmed text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Maintains the counts a classifier reads.
///
/// Every call runs inside one store transaction: either all of its counter
/// updates become visible or none do.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    extractor: FeatureExtractor,
}

impl Trainer {
    pub fn new(extractor: FeatureExtractor) -> Self {
        Self { extractor }
    }

    /// Trains `text` as a yes for every tag in `yes_tags` and a no for every
    /// tag in `no_tags`. Blank tag names are ignored.
    ///
    /// Both polarities of every tag are created even if the document was
    /// already trained.
    ///
    /// # Errors
    /// [`ClassifierError::TrainFailure`] after rolling back every write of the call.
    pub fn train<S: CountStore + ?Sized>(
        &self,
        store: &mut S,
        text: &str,
        yes_tags: &[&str],
        no_tags: &[&str],
    ) -> Result<TrainOutcome, ClassifierError> {
        let hash = content_hash(text);
        let features = self.extractor.extract(text);

        let result = with_transaction(store, |store| -> Result<TrainOutcome, StoreError> {
            let assigned = resolve_categories(store, yes_tags, no_tags)?;

            if store.document_by_hash(&hash)?.is_some() {
                log::info!("Document {} already trained", hash);
                return Ok(TrainOutcome::AlreadyTrained);
            }

            let mut feature_counts = store.feature_counts(&features)?;
            for feature in &features {
                let counts = feature_counts.entry(feature.clone()).or_default();
                for category in &assigned {
                    counts.increment(category.id);
                }
                store.save_feature_counts(feature, counts)?;
            }

            let mut document_counts = store.category_document_counts()?;
            for category in &assigned {
                document_counts.increment(category.id);
            }
            store.save_category_document_counts(&document_counts)?;

            let document = Document {
                hash: hash.clone(),
                corpus: text.trim().to_string(),
            };
            store.save_document(&document)?;
            store.save_document_categories(&document, &assigned)?;

            log::info!(
                "Trained document {} with {} features and {} categories",
                hash,
                features.len(),
                assigned.len()
            );
            Ok(TrainOutcome::Trained)
        });

        result.map_err(|e| {
            log::error!("Failed to train document {}: {}", hash, e);
            ClassifierError::TrainFailure(e.to_string())
        })
    }

    /// Reverses the training of `text`. Untraining a document that was never
    /// trained succeeds without changes.
    ///
    /// Counts are decremented for the categories recorded when the document
    /// was trained and never go below zero.
    ///
    /// # Errors
    /// [`ClassifierError::UntrainFailure`] after rolling back every write of the call.
    pub fn untrain<S: CountStore + ?Sized>(&self, store: &mut S, text: &str) -> Result<UntrainOutcome, ClassifierError> {
        let hash = content_hash(text);
        let features = self.extractor.extract(text);

        let result = with_transaction(store, |store| -> Result<UntrainOutcome, StoreError> {
            let document = match store.document_by_hash(&hash)? {
                Some(document) => document,
                None => {
                    log::info!("Document {} not trained, nothing to untrain", hash);
                    return Ok(UntrainOutcome::NotFound);
                }
            };
            let assigned = store.document_categories(&document)?;

            let mut feature_counts = store.feature_counts(&features)?;
            for feature in &features {
                if let Some(counts) = feature_counts.get_mut(feature) {
                    for category in &assigned {
                        counts.decrement(category.id);
                    }
                    store.save_feature_counts(feature, counts)?;
                }
            }

            let mut document_counts = store.category_document_counts()?;
            for category in &assigned {
                document_counts.decrement(category.id);
            }
            store.save_category_document_counts(&document_counts)?;
            store.delete_document(&document)?;

            log::info!("Untrained document {} from {} categories", hash, assigned.len());
            Ok(UntrainOutcome::Untrained)
        });

        result.map_err(|e| {
            log::error!("Failed to untrain document {}: {}", hash, e);
            ClassifierError::UntrainFailure(e.to_string())
        })
    }
}

/// Creates both polarities of every named tag and returns the categories
/// assigned to the document, without duplicates.
fn resolve_categories<S: CountStore + ?Sized>(
    store: &mut S,
    yes_tags: &[&str],
    no_tags: &[&str],
) -> Result<Vec<Category>, StoreError> {
    let mut assigned: Vec<Category> = Vec::new();
    let tags = yes_tags
        .iter()
        .map(|name| (name, Polarity::Yes))
        .chain(no_tags.iter().map(|name| (name, Polarity::No)));

    for (name, polarity) in tags {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let yes = store.get_or_create_category(name, Polarity::Yes)?;
        let no = store.get_or_create_category(name, Polarity::No)?;
        let category = match polarity {
            Polarity::Yes => yes,
            Polarity::No => no,
        };
        if !assigned.iter().any(|c| c.id == category.id) {
            assigned.push(category);
        }
    }
    Ok(assigned)
}
