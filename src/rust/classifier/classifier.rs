use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::ClassifierError;
use super::features::FeatureExtractor;
use super::index::ClassifierIndex;
use super::scorer::{CategoryPair, Scorer};
use super::trainer::Trainer;
use crate::config::ClassifierConfig;
use crate::store::{Category, CountStore, Polarity};

/// A thread-safe tag classifier.
///
/// The classifier itself holds no counts: every call reads a fresh
/// [`ClassifierIndex`] from the store it is given, so results always reflect
/// the latest training.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use tagsift::{Classifier, MemoryStore};
///
/// let classifier = Classifier::builder().build()?;
/// let trainer = classifier.trainer();
/// let mut store = MemoryStore::new();
///
/// trainer.train(&mut store, "buy cheap watches now", &["spam"], &[])?;
/// trainer.train(&mut store, "schedule meeting tomorrow", &[], &["spam"])?;
///
/// let decisions = classifier.classify(&store, "buy cheap watches")?;
/// assert_eq!(decisions, vec![("spam".to_string(), true)]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    pub(crate) config: Arc<ClassifierConfig>,
    pub(crate) extractor: FeatureExtractor,
    pub(crate) scorer: Arc<dyn Scorer>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

/// Scores and decision for one tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TagScore {
    pub name: String,
    pub yes_score: f64,
    pub no_score: f64,
    pub decision: bool,
}

/// The categories known for one tag name. Either polarity may be missing if
/// the store was populated by something other than the trainer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCategories {
    pub yes: Option<Category>,
    pub no: Option<Category>,
}

impl TagCategories {
    fn into_pair(self, name: &str) -> Result<CategoryPair, ClassifierError> {
        match (self.yes, self.no) {
            (Some(yes), Some(no)) => Ok(CategoryPair {
                name: name.to_string(),
                yes,
                no,
            }),
            (None, _) => Err(ClassifierError::scoring(name, "no 'yes' category")),
            (_, None) => Err(ClassifierError::scoring(name, "no 'no' category")),
        }
    }
}

/// Groups categories by tag name, in ascending name order.
pub fn group_categories(categories: Vec<Category>) -> BTreeMap<String, TagCategories> {
    let mut grouped: BTreeMap<String, TagCategories> = BTreeMap::new();
    for category in categories {
        let entry = grouped.entry(category.name.clone()).or_default();
        match category.polarity {
            Polarity::Yes => entry.yes = Some(category),
            Polarity::No => entry.no = Some(category),
        }
    }
    grouped
}

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current configuration
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            scorer: self.scorer.kind(),
            max_features: self.extractor.max_features(),
            stop_word_count: self.extractor.stop_word_count(),
            default_thresholds: self.config.default_thresholds,
            thresholds: self.config.thresholds.clone(),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Returns a trainer that extracts features the same way this classifier does.
    pub fn trainer(&self) -> Trainer {
        Trainer::new(self.extractor.clone())
    }

    /// Extracts the features of `text`.
    pub fn features(&self, text: &str) -> Vec<String> {
        self.extractor.extract(text)
    }

    /// Decides every known tag for `text`.
    ///
    /// # Returns
    /// `(tag name, decision)` pairs in ascending tag name order. Tags that
    /// cannot be scored are logged and left out.
    ///
    /// # Errors
    /// [`ClassifierError::IndexLoadFailure`] if the counts cannot be read.
    pub fn classify<S: CountStore + ?Sized>(&self, store: &S, text: &str) -> Result<Vec<(String, bool)>, ClassifierError> {
        Ok(self
            .classify_with_scores(store, text)?
            .into_iter()
            .map(|score| (score.name, score.decision))
            .collect())
    }

    /// Like [`classify`](Self::classify), but keeps the scores behind each decision.
    pub fn classify_with_scores<S: CountStore + ?Sized>(&self, store: &S, text: &str) -> Result<Vec<TagScore>, ClassifierError> {
        let features = self.features(text);
        if features.is_empty() {
            log::warn!("No features extracted from document; classifying without informative features");
        } else {
            log::debug!("Extracted {} features", features.len());
        }

        let index = ClassifierIndex::build(store, &features)?;
        let categories = store.all_categories().map_err(|e| {
            log::error!("Failed to load categories: {}", e);
            ClassifierError::IndexLoadFailure(e)
        })?;

        let mut scores = Vec::new();
        for (name, categories) in group_categories(categories) {
            match self.score_tag(&name, categories, &features, &index) {
                Ok(score) => scores.push(score),
                Err(e) => log::error!("Skipping tag: {}", e),
            }
        }
        Ok(scores)
    }

    /// Scores one tag against `features`.
    ///
    /// # Errors
    /// [`ClassifierError::ScoringFailure`] if a polarity is missing or a
    /// score is not a finite number.
    pub fn score_tag(
        &self,
        name: &str,
        categories: TagCategories,
        features: &[String],
        index: &ClassifierIndex,
    ) -> Result<TagScore, ClassifierError> {
        let pair = categories.into_pair(name)?;
        let (yes_score, no_score) = self.scorer.score(&pair, features, index);
        if !yes_score.is_finite() || !no_score.is_finite() {
            return Err(ClassifierError::scoring(
                name,
                format!("non-finite scores yes={} no={}", yes_score, no_score),
            ));
        }

        let decision = self
            .scorer
            .decide(yes_score, no_score, self.config.thresholds_for(name));
        log::info!(
            "{}: yes={:.6} no={:.6} decision={} documents={}",
            name,
            yes_score,
            no_score,
            decision,
            index.document_count(&pair.yes)
        );

        Ok(TagScore {
            name: name.to_string(),
            yes_score,
            no_score,
            decision,
        })
    }
}
