use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use env_logger::{Builder, Env};
use log::{info, LevelFilter};

use tagsift::{
    default_store_path, Classifier, ClassifierConfig, CountStore, FileStore, ScorerKind, TrainOutcome, UntrainOutcome,
};

/// Trains and applies binary tag classifiers
#[derive(Parser)]
#[command(name = "tagsift", author, version, about, long_about = None)]
struct Cli {
    /// Store file holding the trained counts
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// JSON classifier configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Scoring strategy, overriding the configuration file
    #[arg(long, global = true, value_enum)]
    scorer: Option<ScorerKind>,

    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Train documents under yes and no tags
    Train {
        #[command(flatten)]
        input: Input,

        /// Comma separated tags the documents belong to
        #[arg(long, value_delimiter = ',')]
        yes: Vec<String>,

        /// Comma separated tags the documents do not belong to
        #[arg(long, value_delimiter = ',')]
        no: Vec<String>,
    },
    /// Remove previously trained documents
    Untrain {
        #[command(flatten)]
        input: Input,
    },
    /// Decide every known tag for documents
    Classify {
        #[command(flatten)]
        input: Input,

        /// Print the yes and no scores behind each decision
        #[arg(long)]
        scores: bool,
    },
    /// Show the classifier configuration and store contents
    Info,
}

/// Where documents are read from; exactly one source is required.
#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["text", "file", "directory"])))]
struct Input {
    /// Document text
    text: Option<String>,

    /// Read one document from a file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Read every file in a directory as one document each
    #[arg(long)]
    directory: Option<PathBuf>,
}

impl Input {
    fn documents(&self) -> Result<Vec<String>> {
        if let Some(text) = &self.text {
            return Ok(vec![text.clone()]);
        }
        if let Some(path) = &self.file {
            return Ok(vec![read_document(path)?]);
        }
        match &self.directory {
            Some(dir) => read_directory(dir),
            None => bail!("No document given"),
        }
    }
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn read_directory(dir: &Path) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    info!("Found {} documents in {:?}", paths.len(), dir);
    paths.iter().map(|path| read_document(path)).collect()
}

/// First 50 characters of a document, on one line.
fn preview(text: &str) -> String {
    text.trim()
        .chars()
        .take(50)
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

fn yes_no(decision: bool) -> &'static str {
    if decision {
        "yes"
    } else {
        "no"
    }
}

fn build_classifier(cli: &Cli) -> Result<Classifier> {
    let config = match &cli.config {
        Some(path) => ClassifierConfig::from_file(path)?,
        None => ClassifierConfig::default(),
    };
    let mut builder = Classifier::builder().with_config(config);
    if let Some(scorer) = cli.scorer {
        builder = builder.with_scorer(scorer);
    }
    Ok(builder.build()?)
}

fn train(classifier: &Classifier, store: &mut FileStore, documents: &[String], yes: &[String], no: &[String]) -> usize {
    let trainer = classifier.trainer();
    let yes: Vec<&str> = yes.iter().map(String::as_str).collect();
    let no: Vec<&str> = no.iter().map(String::as_str).collect();

    let mut failures = 0;
    for document in documents {
        match trainer.train(store, document, &yes, &no) {
            Ok(TrainOutcome::Trained) => println!("Trained document: {}", preview(document)),
            Ok(TrainOutcome::AlreadyTrained) => println!("Already trained document: {}", preview(document)),
            Err(e) => {
                failures += 1;
                eprintln!("Failed to train document: {} ({})", preview(document), e);
            }
        }
    }
    failures
}

fn untrain(classifier: &Classifier, store: &mut FileStore, documents: &[String]) -> usize {
    let trainer = classifier.trainer();
    let mut failures = 0;
    for document in documents {
        match trainer.untrain(store, document) {
            Ok(UntrainOutcome::Untrained) => println!("Untrained document: {}", preview(document)),
            Ok(UntrainOutcome::NotFound) => println!("Document not trained: {}", preview(document)),
            Err(e) => {
                failures += 1;
                eprintln!("Failed to untrain document: {} ({})", preview(document), e);
            }
        }
    }
    failures
}

fn classify(classifier: &Classifier, store: &FileStore, documents: &[String], show_scores: bool) -> usize {
    let mut failures = 0;
    for document in documents {
        match classifier.classify_with_scores(store, document) {
            Ok(scores) => {
                println!("Document: {}", preview(document));
                for score in scores {
                    if show_scores {
                        println!(
                            "  {}: {} (yes={:.6}, no={:.6})",
                            score.name,
                            yes_no(score.decision),
                            score.yes_score,
                            score.no_score
                        );
                    } else {
                        println!("  {}: {}", score.name, yes_no(score.decision));
                    }
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("Failed to classify document: {} ({})", preview(document), e);
            }
        }
    }
    failures
}

fn show_info(classifier: &Classifier, store: &FileStore) -> Result<()> {
    let info = classifier.info();
    println!("Store: {:?}", store.path());
    println!("Scorer: {:?}", info.scorer);
    println!("Max features: {}", info.max_features);
    println!("Stop words: {}", info.stop_word_count);
    println!(
        "Default thresholds: yes={} no={}",
        info.default_thresholds.yes_min, info.default_thresholds.no_min
    );
    for (tag, thresholds) in &info.thresholds {
        println!("  {}: yes={} no={}", tag, thresholds.yes_min, thresholds.no_min);
    }
    println!("Documents: {}", store.total_document_count()?);
    println!("Categories: {}", store.all_categories()?.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = Builder::from_env(Env::default());
    if env::var_os("RUST_LOG").is_none() {
        logger.filter_level(cli.log_level());
    }
    logger.init();

    let classifier = build_classifier(&cli)?;
    let store_path = cli.store.clone().unwrap_or_else(default_store_path);
    let mut store = FileStore::open(&store_path).with_context(|| format!("Failed to open store {:?}", store_path))?;

    let failures = match &cli.command {
        Command::Train { input, yes, no } => train(&classifier, &mut store, &input.documents()?, yes, no),
        Command::Untrain { input } => untrain(&classifier, &mut store, &input.documents()?),
        Command::Classify { input, scores } => classify(&classifier, &store, &input.documents()?, *scores),
        Command::Info => {
            show_info(&classifier, &store)?;
            0
        }
    };

    if failures > 0 {
        bail!("{} document(s) failed", failures);
    }
    Ok(())
}
