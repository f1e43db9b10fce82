//! Feature extraction: normalization, tokenization, stop-word removal and
//! stemming.
//!
//! ```
//! use tagsift::FeatureExtractor;
//!
//! let extractor = FeatureExtractor::new();
//! assert_eq!(extractor.extract("Buy cheap watches now!"), vec!["bui", "cheap", "watch"]);
//! assert!(extractor.extract("a an the").is_empty());
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::config::DEFAULT_MAX_FEATURES;

/// English stop words removed before stemming.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now",
];

lazy_static! {
    static ref DEFAULT_STOP_WORDS: Arc<HashSet<String>> =
        Arc::new(ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect());
}

/// Reduces a word to its stem.
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

/// Turns raw text into an ordered set of distinct stemmed features.
#[derive(Clone)]
pub struct FeatureExtractor {
    max_features: usize,
    stop_words: Arc<HashSet<String>>,
    stemmer: Arc<dyn Stemmer>,
}

impl fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureExtractor")
            .field("max_features", &self.max_features)
            .field("stop_words", &self.stop_words.len())
            .field("stemmer", &"<stemmer>")
            .finish()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    /// Creates an extractor with the English stop words, the Porter stemmer
    /// and the default feature cap.
    pub fn new() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            stop_words: Arc::clone(&DEFAULT_STOP_WORDS),
            stemmer: Arc::new(PorterStemmer),
        }
    }

    /// Sets the maximum number of distinct features; 0 means unbounded.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Replaces the stop-word list.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = Arc::new(words.into_iter().map(|w| w.into().to_lowercase()).collect());
        self
    }

    pub fn with_stemmer<T: Stemmer + 'static>(mut self, stemmer: T) -> Self {
        self.stemmer = Arc::new(stemmer);
        self
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Extracts features using the configured cap.
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.extract_with_limit(text, self.max_features)
    }

    /// Extracts at most `max_features` distinct stems (0 means unbounded), in
    /// the order they first appear.
    pub fn extract_with_limit(&self, text: &str, max_features: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut features = Vec::new();

        for token in tokenize(text) {
            if max_features > 0 && features.len() >= max_features {
                break;
            }
            if token.len() <= 1 || self.is_stop_word(&token) {
                continue;
            }

            let stem = if token.bytes().all(|b| b.is_ascii_lowercase()) {
                self.stemmer.stem(&token)
            } else {
                token
            };
            if seen.insert(stem.clone()) {
                features.push(stem);
            }
        }

        features
    }
}

/// Lower-cases `text`, blanks every character outside `[a-z0-9%!]` and
/// splits the rest into words. Letters and digits form one token;
/// runs of `%` or `!` form another.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '%' | '!' => c,
            _ => ' ',
        })
        .collect();

    let mut tokens = Vec::new();
    for word in normalized.split_whitespace() {
        let mut current = String::new();
        let mut current_is_word = true;
        for c in word.chars() {
            let is_word = c.is_ascii_alphanumeric();
            if !current.is_empty() && is_word != current_is_word {
                tokens.push(std::mem::take(&mut current));
            }
            current_is_word = is_word;
            current.push(c);
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }
    tokens
}

/// The Porter (1980) suffix-stripping stemmer for lower-case ASCII words.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        if word.len() <= 2 || !word.is_ascii() {
            return word.to_string();
        }

        let mut w = PorterWord::new(word);
        w.step1ab();
        if w.k > 0 {
            w.step1c();
            w.step2();
            w.step3();
            w.step4();
            w.step5();
        }
        w.into_string()
    }
}

const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("logi", "log"),
];

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Working buffer: `b[..=k]` is the current word, `j` marks the end of the
/// stem after the last successful `ends` test.
struct PorterWord {
    b: Vec<u8>,
    k: isize,
    j: isize,
}

impl PorterWord {
    fn new(word: &str) -> Self {
        let b = word.as_bytes().to_vec();
        let k = b.len() as isize - 1;
        Self { b, k, j: 0 }
    }

    fn into_string(mut self) -> String {
        self.b.truncate((self.k + 1) as usize);
        String::from_utf8_lossy(&self.b).into_owned()
    }

    fn at(&self, i: isize) -> u8 {
        self.b[i as usize]
    }

    fn cons(&self, i: isize) -> bool {
        match self.at(i) {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => i == 0 || !self.cons(i - 1),
            _ => true,
        }
    }

    /// Number of consonant-vowel sequences in `b[..=j]`.
    fn m(&self) -> usize {
        let mut n = 0;
        let mut i = 0;
        loop {
            if i > self.j {
                return n;
            }
            if !self.cons(i) {
                break;
            }
            i += 1;
        }
        i += 1;
        loop {
            loop {
                if i > self.j {
                    return n;
                }
                if self.cons(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
            n += 1;
            loop {
                if i > self.j {
                    return n;
                }
                if !self.cons(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..=self.j).any(|i| !self.cons(i))
    }

    fn double_consonant(&self, i: isize) -> bool {
        i >= 1 && self.at(i) == self.at(i - 1) && self.cons(i)
    }

    fn cvc(&self, i: isize) -> bool {
        if i < 2 || !self.cons(i) || self.cons(i - 1) || !self.cons(i - 2) {
            return false;
        }
        !matches!(self.at(i), b'w' | b'x' | b'y')
    }

    fn ends(&mut self, suffix: &str) -> bool {
        let len = suffix.len() as isize;
        if len > self.k + 1 {
            return false;
        }
        let start = (self.k - len + 1) as usize;
        if &self.b[start..=self.k as usize] != suffix.as_bytes() {
            return false;
        }
        self.j = self.k - len;
        true
    }

    fn set_to(&mut self, replacement: &str) {
        let start = (self.j + 1) as usize;
        self.b.truncate(start);
        self.b.extend_from_slice(replacement.as_bytes());
        self.k = self.j + replacement.len() as isize;
    }

    fn replace_if_measured(&mut self, replacement: &str) {
        if self.m() > 0 {
            self.set_to(replacement);
        }
    }

    /// Plurals, -ed and -ing.
    fn step1ab(&mut self) {
        if self.at(self.k) == b's' {
            if self.ends("sses") {
                self.k -= 2;
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.at(self.k - 1) != b's' {
                self.k -= 1;
            }
        }

        if self.ends("eed") {
            if self.m() > 0 {
                self.k -= 1;
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.k = self.j;
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_consonant(self.k) {
                if !matches!(self.at(self.k), b'l' | b's' | b'z') {
                    self.k -= 1;
                }
            } else {
                self.j = self.k;
                if self.m() == 1 && self.cvc(self.k) {
                    self.set_to("e");
                }
            }
        }
    }

    /// Terminal y to i when there is another vowel in the stem.
    fn step1c(&mut self) {
        if self.ends("y") && self.vowel_in_stem() {
            let k = self.k as usize;
            self.b[k] = b'i';
        }
    }

    fn step2(&mut self) {
        for (suffix, replacement) in STEP2_RULES {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }

    fn step3(&mut self) {
        for (suffix, replacement) in STEP3_RULES {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }

    fn step4(&mut self) {
        for suffix in STEP4_SUFFIXES {
            if !self.ends(suffix) {
                continue;
            }
            if *suffix == "ion" && !(self.j >= 0 && matches!(self.at(self.j), b's' | b't')) {
                continue;
            }
            if self.m() > 1 {
                self.k = self.j;
            }
            return;
        }
    }

    /// Final -e and -ll.
    fn step5(&mut self) {
        self.j = self.k;
        if self.at(self.k) == b'e' {
            let m = self.m();
            if m > 1 || (m == 1 && !self.cvc(self.k - 1)) {
                self.k -= 1;
            }
        }
        if self.at(self.k) == b'l' && self.double_consonant(self.k) && self.m() > 1 {
            self.k -= 1;
        }
    }
}
