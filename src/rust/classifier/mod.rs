use std::collections::BTreeMap;

mod error;
pub mod builder;
pub mod classifier;
pub mod features;
pub mod index;
pub mod scorer;
pub mod trainer;

pub use builder::ClassifierBuilder;
pub use classifier::{group_categories, Classifier, TagCategories, TagScore};
pub use error::ClassifierError;
pub use features::{tokenize, FeatureExtractor, PorterStemmer, Stemmer};
pub use index::ClassifierIndex;
pub use scorer::{inverse_chi_squared, BayesianScorer, CategoryPair, FisherScorer, Scorer, Smoothing};
pub use trainer::{content_hash, TrainOutcome, Trainer, UntrainOutcome};

use crate::config::{ScorerKind, Thresholds};

/// Information about the current configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Scoring strategy in use
    pub scorer: ScorerKind,
    /// Maximum distinct features per document; 0 means unbounded
    pub max_features: usize,
    /// Number of stop words removed during extraction
    pub stop_word_count: usize,
    /// Fisher thresholds for tags without an override
    pub default_thresholds: Thresholds,
    /// Per tag threshold overrides
    pub thresholds: BTreeMap<String, Thresholds>,
}
