//! Persistence contract used by the classifier core, plus in-memory and
//! file-backed implementations.
//!
//! The classifier never talks to a storage engine directly. Everything it
//! needs (categories, documents, per-feature counts, per-category document
//! counts) goes through [`CountStore`], and every counter is exchanged as a
//! [`CountMap`].

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

mod counts;
mod error;
mod file;
mod memory;

pub use counts::CountMap;
pub use error::StoreError;
pub use file::FileStore;
pub use memory::{MemoryStore, StoreState};

/// Identifier assigned to a category by the store.
pub type CategoryId = u64;

/// Which side of a tag a category represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Yes,
    No,
}

impl Polarity {
    pub fn opposite(self) -> Self {
        match self {
            Polarity::Yes => Polarity::No,
            Polarity::No => Polarity::Yes,
        }
    }
}

impl From<bool> for Polarity {
    fn from(yes: bool) -> Self {
        if yes {
            Polarity::Yes
        } else {
            Polarity::No
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Yes => write!(f, "yes"),
            Polarity::No => write!(f, "no"),
        }
    }
}

/// One polarity of a named tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub polarity: Polarity,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.polarity)
    }
}

/// A trained text sample, identified by the hash of its normalized content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub hash: String,
    pub corpus: String,
}

/// Storage operations the classifier core depends on.
///
/// Reads never fail because a record is missing: unknown features and
/// categories simply have no counts. Errors are reserved for the backend
/// itself failing.
///
/// Writes made between [`CountStore::begin`] and [`CountStore::commit`] must
/// become visible together; [`CountStore::rollback`] discards all of them.
pub trait CountStore: fmt::Debug {
    /// Returns the category with this name and polarity, creating it if needed.
    fn get_or_create_category(&mut self, name: &str, polarity: Polarity) -> Result<Category, StoreError>;

    fn all_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Returns the categories with the given ids; unknown ids are ignored.
    fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, StoreError>;

    fn document_by_hash(&self, hash: &str) -> Result<Option<Document>, StoreError>;

    fn save_document(&mut self, document: &Document) -> Result<(), StoreError>;

    /// Deletes the document together with its category assignment.
    fn delete_document(&mut self, document: &Document) -> Result<(), StoreError>;

    /// Loads the counts of every requested feature that has been seen.
    fn feature_counts(&self, features: &[String]) -> Result<HashMap<String, CountMap>, StoreError>;

    /// Replaces the counts of one feature. An empty map removes the record.
    fn save_feature_counts(&mut self, feature: &str, counts: &CountMap) -> Result<(), StoreError>;

    fn category_document_counts(&self) -> Result<CountMap, StoreError>;

    fn save_category_document_counts(&mut self, counts: &CountMap) -> Result<(), StoreError>;

    fn total_document_count(&self) -> Result<u64, StoreError>;

    /// Returns the categories a document was trained with; empty if unknown.
    fn document_categories(&self, document: &Document) -> Result<Vec<Category>, StoreError>;

    fn save_document_categories(&mut self, document: &Document, categories: &[Category]) -> Result<(), StoreError>;

    fn begin(&mut self) -> Result<(), StoreError>;

    fn commit(&mut self) -> Result<(), StoreError>;

    fn rollback(&mut self) -> Result<(), StoreError>;
}

/// Runs `work` inside a transaction: commits on success, rolls back on error.
///
/// A failed rollback is logged and the error from `work` is returned.
pub fn with_transaction<S, T, E, F>(store: &mut S, work: F) -> Result<T, E>
where
    S: CountStore + ?Sized,
    E: From<StoreError>,
    F: FnOnce(&mut S) -> Result<T, E>,
{
    store.begin()?;
    match work(&mut *store) {
        Ok(value) => match store.commit() {
            Ok(()) => Ok(value),
            Err(e) => {
                log::error!("Commit failed, rolling back: {}", e);
                if let Err(rollback_err) = store.rollback() {
                    log::error!("Rollback after failed commit also failed: {}", rollback_err);
                }
                Err(e.into())
            }
        },
        Err(e) => {
            if let Err(rollback_err) = store.rollback() {
                log::error!("Rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}
