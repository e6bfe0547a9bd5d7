//! Spoken number words to digits.
//!
//! Replacement is token based: a word only matches a whole space-delimited
//! token, so `zwei` becomes `2` while `zweihundert` is left alone.

use std::collections::{BTreeMap, HashMap};

const GERMAN: &[(&str, &str)] = &[
    ("null", "0"),
    ("eins", "1"),
    ("zwei", "2"),
    ("drei", "3"),
    ("vier", "4"),
    ("fünf", "5"),
    ("sechs", "6"),
    ("sieben", "7"),
    ("acht", "8"),
    ("neun", "9"),
    ("zehn", "10"),
    ("elf", "11"),
    ("zwölf", "12"),
    ("dreizehn", "13"),
    ("vierzehn", "14"),
    ("fünfzehn", "15"),
    ("sechzehn", "16"),
    ("siebzehn", "17"),
    ("achtzehn", "18"),
    ("neunzehn", "19"),
    ("zwanzig", "20"),
];

const ENGLISH: &[(&str, &str)] = &[
    ("zero", "0"),
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
    ("six", "6"),
    ("seven", "7"),
    ("eight", "8"),
    ("nine", "9"),
    ("ten", "10"),
    ("eleven", "11"),
    ("twelve", "12"),
    ("thirteen", "13"),
    ("fourteen", "14"),
    ("fifteen", "15"),
    ("sixteen", "16"),
    ("seventeen", "17"),
    ("eighteen", "18"),
    ("nineteen", "19"),
    ("twenty", "20"),
];

/// Built-in word tables keyed by language code.
pub const DEFAULT_NUMBER_WORDS: &[(&str, &[(&str, &str)])] = &[("de", GERMAN), ("en", ENGLISH)];

/// Word-to-digit table merged across languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberWords {
    words: HashMap<String, String>,
}

impl NumberWords {
    /// Build from per-language tables, `{language: {word: digit}}`.
    pub fn from_languages(languages: &BTreeMap<String, BTreeMap<String, String>>) -> Self {
        let words = languages
            .values()
            .flat_map(|table| table.iter())
            .map(|(word, digit)| (word.clone(), digit.clone()))
            .collect();
        Self { words }
    }

    /// The built-in tables as owned per-language maps, ready to be
    /// overridden from configuration.
    pub fn default_languages() -> BTreeMap<String, BTreeMap<String, String>> {
        DEFAULT_NUMBER_WORDS
            .iter()
            .map(|(language, table)| {
                let words = table
                    .iter()
                    .map(|(word, digit)| (word.to_string(), digit.to_string()))
                    .collect();
                (language.to_string(), words)
            })
            .collect()
    }

    /// Digit for `word`, if it is a known number word.
    pub fn get(&self, word: &str) -> Option<&str> {
        self.words.get(word).map(String::as_str)
    }

    /// Number of known words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether no words are known.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for NumberWords {
    fn default() -> Self {
        Self::from_languages(&Self::default_languages())
    }
}

/// Replace whole-word number words in `text` with digits.
///
/// Case-sensitive. Tokens are split on single spaces and rejoined the same
/// way, so spacing is preserved exactly.
pub fn normalize(text: &str, words: &NumberWords) -> String {
    text.split(' ')
        .map(|token| words.get(token).unwrap_or(token))
        .collect::<Vec<_>>()
        .join(" ")
}
