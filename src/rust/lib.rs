//! A tag classifier trained incrementally from labeled text.
//!
//! Every tag is a binary category with a `yes` and a `no` polarity. Training
//! counts which stemmed features appear in documents of each polarity;
//! classification scores a new document against those counts with either a
//! Naive Bayes or a Fisher's method scorer.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tagsift::{Classifier, MemoryStore};
//!
//! let classifier = Classifier::builder().build()?;
//! let trainer = classifier.trainer();
//! let mut store = MemoryStore::new();
//!
//! trainer.train(&mut store, "buy cheap watches now", &["spam"], &[])?;
//! trainer.train(&mut store, "schedule meeting tomorrow", &[], &["spam"])?;
//!
//! for (tag, decision) in classifier.classify(&store, "buy cheap watches")? {
//!     println!("{}: {}", tag, decision);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Persistence
//!
//! Counts live behind the [`CountStore`] trait. [`MemoryStore`] keeps them in
//! process; [`FileStore`] persists them to a JSON file on every commit.
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tagsift::{default_store_path, Classifier, FileStore};
//!
//! let classifier = Classifier::builder().build()?;
//! let mut store = FileStore::open(default_store_path())?;
//! classifier.trainer().train(&mut store, "quarterly results beat expectations", &["finance"], &[])?;
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod store;

pub use classifier::{
    Classifier, ClassifierBuilder, ClassifierError, ClassifierIndex, ClassifierInfo, FeatureExtractor, TagScore,
    TrainOutcome, Trainer, UntrainOutcome,
};
pub use config::{default_data_dir, default_store_path, ClassifierConfig, ScorerKind, Thresholds};
pub use store::{Category, CountMap, CountStore, Document, FileStore, MemoryStore, Polarity, StoreError};

pub fn init_logger() {
    env_logger::init();
}
