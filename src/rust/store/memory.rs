use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{Category, CategoryId, CountMap, CountStore, Document, Polarity, StoreError};

/// Everything a store holds, in a serializable form.
///
/// Counters are kept in their encoded form, the same way a relational
/// backend would keep them in a text column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreState {
    next_category_id: CategoryId,
    categories: BTreeMap<CategoryId, Category>,
    documents: BTreeMap<String, Document>,
    document_categories: BTreeMap<String, String>,
    feature_counts: BTreeMap<String, String>,
    category_document_counts: String,
}

/// A [`CountStore`] that keeps all state in memory.
///
/// Transactions are implemented by snapshotting the state on `begin` and
/// restoring it on `rollback`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: StoreState,
    snapshot: Option<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: StoreState) -> Self {
        Self { state, snapshot: None }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn category_count(&self) -> usize {
        self.state.categories.len()
    }

    /// Number of distinct features with at least one count.
    pub fn feature_count(&self) -> usize {
        self.state.feature_counts.len()
    }
}

impl CountStore for MemoryStore {
    fn get_or_create_category(&mut self, name: &str, polarity: Polarity) -> Result<Category, StoreError> {
        if let Some(existing) = self
            .state
            .categories
            .values()
            .find(|c| c.name == name && c.polarity == polarity)
        {
            return Ok(existing.clone());
        }

        self.state.next_category_id += 1;
        let category = Category {
            id: self.state.next_category_id,
            name: name.to_string(),
            polarity,
        };
        self.state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    fn all_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.state.categories.values().cloned().collect())
    }

    fn categories_by_ids(&self, ids: &[CategoryId]) -> Result<Vec<Category>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.state.categories.get(id).cloned())
            .collect())
    }

    fn document_by_hash(&self, hash: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.state.documents.get(hash).cloned())
    }

    fn save_document(&mut self, document: &Document) -> Result<(), StoreError> {
        self.state.documents.insert(document.hash.clone(), document.clone());
        Ok(())
    }

    fn delete_document(&mut self, document: &Document) -> Result<(), StoreError> {
        self.state.documents.remove(&document.hash);
        self.state.document_categories.remove(&document.hash);
        Ok(())
    }

    fn feature_counts(&self, features: &[String]) -> Result<HashMap<String, CountMap>, StoreError> {
        let mut loaded = HashMap::new();
        for feature in features {
            if let Some(data) = self.state.feature_counts.get(feature) {
                loaded.insert(feature.clone(), CountMap::decode(data)?);
            }
        }
        Ok(loaded)
    }

    fn save_feature_counts(&mut self, feature: &str, counts: &CountMap) -> Result<(), StoreError> {
        if counts.is_empty() {
            self.state.feature_counts.remove(feature);
        } else {
            self.state.feature_counts.insert(feature.to_string(), counts.encode());
        }
        Ok(())
    }

    fn category_document_counts(&self) -> Result<CountMap, StoreError> {
        CountMap::decode(&self.state.category_document_counts)
    }

    fn save_category_document_counts(&mut self, counts: &CountMap) -> Result<(), StoreError> {
        self.state.category_document_counts = counts.encode();
        Ok(())
    }

    fn total_document_count(&self) -> Result<u64, StoreError> {
        Ok(self.state.documents.len() as u64)
    }

    fn document_categories(&self, document: &Document) -> Result<Vec<Category>, StoreError> {
        match self.state.document_categories.get(&document.hash) {
            Some(data) => {
                let assigned = CountMap::decode(data)?;
                let ids: Vec<CategoryId> = assigned.ids().collect();
                self.categories_by_ids(&ids)
            }
            None => Ok(Vec::new()),
        }
    }

    fn save_document_categories(&mut self, document: &Document, categories: &[Category]) -> Result<(), StoreError> {
        let mut assigned = CountMap::new();
        for category in categories {
            assigned.increment(category.id);
        }
        self.state
            .document_categories
            .insert(document.hash.clone(), assigned.encode());
        Ok(())
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        if self.snapshot.is_some() {
            return Err(StoreError::transaction("a transaction is already active"));
        }
        log::debug!("Beginning transaction");
        self.snapshot = Some(self.state.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.snapshot.take().is_none() {
            return Err(StoreError::transaction("commit without an active transaction"));
        }
        log::debug!("Transaction committed");
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        match self.snapshot.take() {
            Some(snapshot) => {
                self.state = snapshot;
                log::debug!("Transaction rolled back");
                Ok(())
            }
            None => Err(StoreError::transaction("rollback without an active transaction")),
        }
    }
}
