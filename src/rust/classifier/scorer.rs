//! Scoring strategies that turn per-feature counts into a yes/no decision.
//!
//! Both strategies share the same smoothing of per-feature probabilities:
//! a raw ratio observed `totals` times is blended with an assumed prior,
//!
//! ```text
//! smoothed = (weight * assumed + totals * raw) / (weight + totals)
//! ```
//!
//! so a feature seen only once or twice cannot swing the result on its own.

use std::fmt;

use super::index::ClassifierIndex;
use crate::config::{ClassifierConfig, ScorerKind, Thresholds};
use crate::store::{Category, Polarity};

/// The yes and no categories of one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPair {
    pub name: String,
    pub yes: Category,
    pub no: Category,
}

impl CategoryPair {
    pub fn get(&self, polarity: Polarity) -> &Category {
        match polarity {
            Polarity::Yes => &self.yes,
            Polarity::No => &self.no,
        }
    }
}

/// Blends an observed ratio with an assumed prior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothing {
    pub weight: f64,
    pub assumed_probability: f64,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self {
            weight: 1.0,
            assumed_probability: 0.5,
        }
    }
}

impl Smoothing {
    pub fn apply(&self, raw_probability: f64, totals: u64) -> f64 {
        let totals = totals as f64;
        (self.weight * self.assumed_probability + totals * raw_probability) / (self.weight + totals)
    }
}

/// A strategy for scoring a feature set against one tag.
pub trait Scorer: Send + Sync + fmt::Debug {
    /// Returns the `(yes, no)` scores of `features` for `pair`.
    fn score(&self, pair: &CategoryPair, features: &[String], index: &ClassifierIndex) -> (f64, f64);

    /// Turns a pair of scores into a decision.
    fn decide(&self, yes_score: f64, no_score: f64, thresholds: Thresholds) -> bool;

    fn kind(&self) -> ScorerKind;
}

/// Creates the scorer selected by `config`.
pub fn scorer_for(config: &ClassifierConfig) -> Box<dyn Scorer> {
    let smoothing = Smoothing {
        weight: config.smoothing_weight,
        assumed_probability: config.assumed_probability,
    };
    match config.scorer {
        ScorerKind::Bayesian => Box::new(BayesianScorer::new(smoothing)),
        ScorerKind::Fisher => Box::new(FisherScorer::new(smoothing)),
    }
}

fn ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Naive Bayes scoring weighted by the number of training documents.
///
/// The score of a category is the product of the smoothed feature
/// probabilities multiplied by the category's raw document count. It is not
/// normalized, which favours categories with more training mass.
#[derive(Debug, Clone, Default)]
pub struct BayesianScorer {
    smoothing: Smoothing,
}

impl BayesianScorer {
    pub fn new(smoothing: Smoothing) -> Self {
        Self { smoothing }
    }

    /// Probability that a document with `features` belongs to `category`;
    /// 0 if the category has never been trained.
    pub fn document_probability(
        &self,
        pair: &CategoryPair,
        category: &Category,
        features: &[String],
        index: &ClassifierIndex,
    ) -> f64 {
        let num_documents = index.document_count(category);
        if num_documents == 0 {
            return 0.0;
        }

        features.iter().fold(1.0, |prob, feature| {
            let raw = ratio(index.feature_category_count(feature, category), num_documents);
            let totals = index.total_feature_count(feature, &pair.yes, &pair.no);
            prob * self.smoothing.apply(raw, totals)
        })
    }

    fn category_score(&self, pair: &CategoryPair, category: &Category, features: &[String], index: &ClassifierIndex) -> f64 {
        self.document_probability(pair, category, features, index) * index.document_count(category) as f64
    }
}

impl Scorer for BayesianScorer {
    fn score(&self, pair: &CategoryPair, features: &[String], index: &ClassifierIndex) -> (f64, f64) {
        (
            self.category_score(pair, &pair.yes, features, index),
            self.category_score(pair, &pair.no, features, index),
        )
    }

    /// True iff the yes score is strictly greater. A zero no score with a
    /// positive yes score is a yes; two zero scores are a no.
    fn decide(&self, yes_score: f64, no_score: f64, _thresholds: Thresholds) -> bool {
        yes_score > 0.0 && (no_score == 0.0 || yes_score > no_score)
    }

    fn kind(&self) -> ScorerKind {
        ScorerKind::Bayesian
    }
}

/// Fisher's method: combines per-feature probabilities into a confidence
/// level in `[0, 1]`.
///
/// Each feature contributes how distinctive it is between the two polarities
/// rather than its raw frequency.
#[derive(Debug, Clone, Default)]
pub struct FisherScorer {
    smoothing: Smoothing,
}

impl FisherScorer {
    pub fn new(smoothing: Smoothing) -> Self {
        Self { smoothing }
    }

    /// Product of the smoothed, normalized feature probabilities; 0 if the
    /// category has never been trained.
    pub fn combined_probability(
        &self,
        pair: &CategoryPair,
        polarity: Polarity,
        features: &[String],
        index: &ClassifierIndex,
    ) -> f64 {
        let category = pair.get(polarity);
        let opposite = pair.get(polarity.opposite());
        let num_documents = index.document_count(category);
        if num_documents == 0 {
            return 0.0;
        }
        let num_opposite = index.document_count(opposite);

        features.iter().fold(1.0, |prob, feature| {
            let raw = ratio(index.feature_category_count(feature, category), num_documents);
            let raw_opposite = ratio(index.feature_category_count(feature, opposite), num_opposite);
            let normalized = if raw + raw_opposite > 0.0 {
                raw / (raw + raw_opposite)
            } else {
                0.0
            };
            let totals = index.total_feature_count(feature, &pair.yes, &pair.no);
            prob * self.smoothing.apply(normalized, totals)
        })
    }

    fn category_score(&self, pair: &CategoryPair, polarity: Polarity, features: &[String], index: &ClassifierIndex) -> f64 {
        let prob = self.combined_probability(pair, polarity, features, index);
        if prob > 0.0 {
            inverse_chi_squared(-2.0 * prob.ln(), 2 * features.len())
        } else {
            0.0
        }
    }
}

impl Scorer for FisherScorer {
    fn score(&self, pair: &CategoryPair, features: &[String], index: &ClassifierIndex) -> (f64, f64) {
        (
            self.category_score(pair, Polarity::Yes, features, index),
            self.category_score(pair, Polarity::No, features, index),
        )
    }

    /// Yes when the yes score clears its threshold, unless the no score
    /// clears its own threshold and beats the yes score.
    fn decide(&self, yes_score: f64, no_score: f64, thresholds: Thresholds) -> bool {
        if no_score > thresholds.no_min && no_score > yes_score {
            return false;
        }
        yes_score > thresholds.yes_min
    }

    fn kind(&self) -> ScorerKind {
        ScorerKind::Fisher
    }
}

/// Upper tail of the chi-squared distribution for an even number of degrees
/// of freedom, capped at 1.
///
/// Returns 0 when `degrees_of_freedom < 2`.
pub fn inverse_chi_squared(chi: f64, degrees_of_freedom: usize) -> f64 {
    let half = chi / 2.0;
    let mut term = (-half).exp();
    let mut sum = 0.0;
    for i in 0..degrees_of_freedom / 2 {
        if i > 0 {
            term *= half / i as f64;
        }
        sum += term;
    }
    sum.min(1.0)
}
