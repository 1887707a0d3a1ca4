use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Word list shipped with the binary (English → Urdu).
const BUNDLED_WORDS: &str = include_str!("../data/urdu-dictionary.json");

#[derive(Debug, Deserialize)]
struct WordList {
    words: Vec<WordEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordEntry {
    english_word: String,
    target_word: String,
}

/// Read-only word-to-word lookup table, keyed by the lowercased source word.
///
/// Built once at startup and shared behind an `Arc` by every request.
#[derive(Debug, Clone, Default)]
pub struct TranslationDictionary {
    words: HashMap<String, String>,
}

impl TranslationDictionary {
    /// Parse a JSON word list of the form
    /// `{"words": [{"englishWord": "...", "targetWord": "..."}]}`.
    /// A word listed twice keeps its last translation. Every target must be a
    /// single token, since translation replaces one word with exactly one word.
    pub fn from_json(data: &str) -> Result<Self> {
        let list: WordList = serde_json::from_str(data).context("failed to parse dictionary word list")?;
        let mut words = HashMap::with_capacity(list.words.len());
        for entry in list.words {
            let target = entry.target_word.trim();
            if target.is_empty() || target.contains(char::is_whitespace) {
                bail!(
                    "dictionary entry '{}' must translate to exactly one word, got '{}'",
                    entry.english_word,
                    entry.target_word
                );
            }
            words.insert(entry.english_word.to_lowercase(), target.to_string());
        }
        Ok(Self { words })
    }

    /// Load the dictionary from `path`, or the bundled list when no path is configured.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let dictionary = match path {
            Some(path) => {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read dictionary file: {}", path.display()))?;
                Self::from_json(&data)?
            }
            None => Self::bundled()?,
        };
        info!(words = dictionary.len(), source = ?path, "translation dictionary loaded");
        Ok(dictionary)
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_WORDS)
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        match self.words.get(word) {
            Some(t) => Some(t.as_str()),
            None => self.words.get(&word.to_lowercase()).map(String::as_str),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl FromIterator<(String, String)> for TranslationDictionary {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let words = iter
            .into_iter()
            .map(|(source, target)| (source.to_lowercase(), target))
            .collect();
        Self { words }
    }
}
