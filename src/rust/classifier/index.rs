use std::collections::HashMap;

use super::error::ClassifierError;
use crate::store::{Category, CountMap, CountStore};

/// A snapshot of the counts needed to classify one feature set.
///
/// The index is loaded once at the start of a classification and dropped at
/// the end, so every classification sees the store as it is at that moment.
/// Lookups never fail: unseen features and categories count as zero.
#[derive(Debug, Clone, Default)]
pub struct ClassifierIndex {
    feature_counts: HashMap<String, CountMap>,
    document_counts: CountMap,
    total_documents: u64,
}

impl ClassifierIndex {
    /// Loads the counts for `features` from `store`.
    ///
    /// # Errors
    /// Returns [`ClassifierError::IndexLoadFailure`] if any read fails; a
    /// partially loaded index is never returned.
    pub fn build<S: CountStore + ?Sized>(store: &S, features: &[String]) -> Result<Self, ClassifierError> {
        let feature_counts = store.feature_counts(features).map_err(|e| {
            log::error!("Failed to load feature counts: {}", e);
            ClassifierError::IndexLoadFailure(e)
        })?;
        let document_counts = store.category_document_counts().map_err(|e| {
            log::error!("Failed to load category document counts: {}", e);
            ClassifierError::IndexLoadFailure(e)
        })?;
        let total_documents = store.total_document_count().map_err(|e| {
            log::error!("Failed to load number of documents: {}", e);
            ClassifierError::IndexLoadFailure(e)
        })?;

        log::debug!(
            "Loaded index: {} of {} features seen, {} documents",
            feature_counts.len(),
            features.len(),
            total_documents
        );

        Ok(Self {
            feature_counts,
            document_counts,
            total_documents,
        })
    }

    /// Creates an index from counts already in hand.
    pub fn from_counts(feature_counts: HashMap<String, CountMap>, document_counts: CountMap, total_documents: u64) -> Self {
        Self {
            feature_counts,
            document_counts,
            total_documents,
        }
    }

    /// Number of documents trained with `category`.
    pub fn document_count(&self, category: &Category) -> u64 {
        self.document_counts.get(category.id)
    }

    pub fn total_documents(&self) -> u64 {
        self.total_documents
    }

    /// Number of documents trained with `category` that contain `feature`.
    pub fn feature_category_count(&self, feature: &str, category: &Category) -> u64 {
        self.feature_counts
            .get(feature)
            .map_or(0, |counts| counts.get(category.id))
    }

    /// Combined yes and no count of `feature` for one tag.
    pub fn total_feature_count(&self, feature: &str, yes: &Category, no: &Category) -> u64 {
        self.feature_counts
            .get(feature)
            .map_or(0, |counts| counts.get(yes.id) + counts.get(no.id))
    }
}
