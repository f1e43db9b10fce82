use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Category, CategoryId, CountMap, CountStore, Document, MemoryStore, Polarity, StoreError, StoreState};

/// A [`CountStore`] persisted as a single JSON file.
///
/// The state lives in memory and is written back on every commit (or after
/// each write when no transaction is active). Writes go to a temporary file
/// that is then renamed over the store file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let bytes = fs::read(&path)?;
            log::info!("Loaded store from {:?} ({} bytes)", path, bytes.len());
            serde_json::from_slice::<StoreState>(&bytes)?
        } else {
            log::info!("No store at {:?}, starting empty", path);
            StoreState::default()
        };

        Ok(Self {
            path,
            inner: MemoryStore::from_state(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = serde_json::to_vec(self.inner.state())?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("Persisted store to {:?} ({} bytes)", self.path, bytes.len());
        Ok(())
    }

    fn persist_unless_in_transaction(&self) -> Result<(), StoreError> {
        if self.inner.in_transaction() {
            Ok(())
        } else {
            self.persist()
        }
    }
}

impl CountStore for FileStore {
    fn get_or_create_category(&mut self, name: &str, polarity: Polarity) -> Result<Category, StoreError> {
        let known = self.inner.category_count();
        let category = self.inner.get_or_create_category(name, polarity)?;
        if self.inner.category_count() != known {
            self.persist_unless_in_transaction()?;
        }
        Ok(category)
    }

    fn all_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.inner.all_categories()
    }

    fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, StoreError> {
        self.inner.categories_by_ids(ids)
    }

    fn document_by_hash(&self, hash: &str) -> Result<Option<Document>, StoreError> {
        self.inner.document_by_hash(hash)
    }

    fn save_document(&mut self, document: &Document) -> Result<(), StoreError> {
        self.inner.save_document(document)?;
        self.persist_unless_in_transaction()
    }

    fn delete_document(&mut self, document: &Document) -> Result<(), StoreError> {
        self.inner.delete_document(document)?;
        self.persist_unless_in_transaction()
    }

    fn feature_counts(&self, features: &[String]) -> Result<HashMap<String, CountMap>, StoreError> {
        self.inner.feature_counts(features)
    }

    fn save_feature_counts(&mut self, feature: &str, counts: &CountMap) -> Result<(), StoreError> {
        self.inner.save_feature_counts(feature, counts)?;
        self.persist_unless_in_transaction()
    }

    fn category_document_counts(&self) -> Result<CountMap, StoreError> {
        self.inner.category_document_counts()
    }

    fn save_category_document_counts(&mut self, counts: &CountMap) -> Result<(), StoreError> {
        self.inner.save_category_document_counts(counts)?;
        self.persist_unless_in_transaction()
    }

    fn total_document_count(&self) -> Result<u64, StoreError> {
        self.inner.total_document_count()
    }

    fn document_categories(&self, document: &Document) -> Result<Vec<Category>, StoreError> {
        self.inner.document_categories(document)
    }

    fn save_document_categories(&mut self, document: &Document, categories: &[Category]) -> Result<(), StoreError> {
        self.inner.save_document_categories(document, categories)?;
        self.persist_unless_in_transaction()
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        self.inner.begin()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        // The snapshot is kept until the file write succeeds.
        if !self.inner.in_transaction() {
            return Err(StoreError::transaction("commit without an active transaction"));
        }
        self.persist()?;
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.inner.rollback()
    }
}
