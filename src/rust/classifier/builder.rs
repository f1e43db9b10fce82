use std::sync::Arc;

use log::info;

use super::classifier::Classifier;
use super::error::ClassifierError;
use super::features::{FeatureExtractor, Stemmer};
use super::scorer::scorer_for;
use crate::config::{ClassifierConfig, ScorerKind, Thresholds};

/// A builder for constructing a Classifier with a fluent interface.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    config: ClassifierConfig,
    extractor: FeatureExtractor,
}

impl ClassifierBuilder {
    /// Creates a new ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use tagsift::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
            extractor: FeatureExtractor::new(),
        }
    }

    /// Replaces the whole configuration
    ///
    /// # Example
    /// ```
    /// use tagsift::{ClassifierBuilder, ClassifierConfig, ScorerKind};
    ///
    /// let config = ClassifierConfig {
    ///     scorer: ScorerKind::Fisher,
    ///     ..ClassifierConfig::default()
    /// };
    /// let builder = ClassifierBuilder::new().with_config(config);
    /// ```
    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_scorer(mut self, scorer: ScorerKind) -> Self {
        self.config.scorer = scorer;
        self
    }

    /// Sets the maximum number of distinct features per document; 0 means unbounded.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.config.max_features = max_features;
        self
    }

    /// Sets the Fisher thresholds for one tag
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The tag name is empty
    ///   - A threshold is outside `[0, 1]`
    ///
    /// # Example
    /// ```
    /// # fn main() -> Result<(), tagsift::ClassifierError> {
    /// use tagsift::{ClassifierBuilder, Thresholds};
    ///
    /// let builder = ClassifierBuilder::new()
    ///     .with_thresholds("spam", Thresholds::new(0.8, 0.5))?;
    /// assert!(ClassifierBuilder::new().with_thresholds("", Thresholds::default()).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_thresholds(mut self, tag: impl Into<String>, thresholds: Thresholds) -> Result<Self, ClassifierError> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(ClassifierError::ValidationError("Tag name cannot be empty".into()));
        }
        Self::validate_threshold_range(&thresholds)?;
        self.config.thresholds.insert(tag, thresholds);
        Ok(self)
    }

    /// Sets the Fisher thresholds used by tags without their own
    pub fn with_default_thresholds(mut self, thresholds: Thresholds) -> Result<Self, ClassifierError> {
        Self::validate_threshold_range(&thresholds)?;
        self.config.default_thresholds = thresholds;
        Ok(self)
    }

    /// Sets the weight and assumed probability used to smooth per-feature probabilities
    pub fn with_smoothing(mut self, weight: f64, assumed_probability: f64) -> Result<Self, ClassifierError> {
        if !(weight.is_finite() && weight > 0.0) {
            return Err(ClassifierError::ValidationError(format!(
                "Smoothing weight must be positive, got {}",
                weight
            )));
        }
        if !(0.0..=1.0).contains(&assumed_probability) {
            return Err(ClassifierError::ValidationError(format!(
                "Assumed probability must be within [0, 1], got {}",
                assumed_probability
            )));
        }
        self.config.smoothing_weight = weight;
        self.config.assumed_probability = assumed_probability;
        Ok(self)
    }

    /// Replaces the stop-word list
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extractor = self.extractor.with_stop_words(words);
        self
    }

    pub fn with_stemmer<T: Stemmer + 'static>(mut self, stemmer: T) -> Self {
        self.extractor = self.extractor.with_stemmer(stemmer);
        self
    }

    fn validate_threshold_range(thresholds: &Thresholds) -> Result<(), ClassifierError> {
        for value in [thresholds.yes_min, thresholds.no_min] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ClassifierError::ValidationError(format!(
                    "Threshold must be within [0, 1], got {}",
                    value
                )));
            }
        }
        Ok(())
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The constructed Classifier, or a
    ///   `ValidationError` if the configuration is invalid
    ///
    /// # Example
    /// ```
    /// # fn main() -> Result<(), tagsift::ClassifierError> {
    /// use tagsift::{ClassifierBuilder, ScorerKind};
    ///
    /// let classifier = ClassifierBuilder::new()
    ///     .with_scorer(ScorerKind::Fisher)
    ///     .with_max_features(100)
    ///     .build()?;
    /// assert_eq!(classifier.info().max_features, 100);
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        self.config.validate()?;

        let extractor = self.extractor.with_max_features(self.config.max_features);
        let scorer = scorer_for(&self.config);
        info!(
            "Built {:?} classifier with max_features={} and {} threshold overrides",
            self.config.scorer,
            self.config.max_features,
            self.config.thresholds.len()
        );

        Ok(Classifier {
            config: Arc::new(self.config),
            extractor,
            scorer: Arc::from(scorer),
        })
    }
}
