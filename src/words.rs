use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::from_str;

use include_dir::{include_dir, Dir};
use std::error::Error;
use std::fs;
use std::path::Path;

static WORDS_DIR: Dir = include_dir!("src/words");

/// A prompt: the text shown to the player plus the romanized form keystrokes
/// are validated against, with optional accepted alternate spellings.
///
/// Completion is judged against `roman`'s length; an alternate shorter than
/// `roman` can carry the prefix for its own length and then falls back into
/// the expected-roman pathway.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Word {
    pub display: String,
    pub roman: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl Word {
    pub fn new(display: &str, roman: &str) -> Self {
        Self {
            display: display.to_string(),
            roman: roman.to_string(),
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternatives(display: &str, roman: &str, alternatives: &[&str]) -> Self {
        Self {
            display: display.to_string(),
            roman: roman.to_string(),
            alternatives: alternatives.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Served when the word source is empty; the game must start regardless.
    pub fn fallback() -> Self {
        Word::new("ねこ", "neko")
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct WordSet {
    pub name: String,
    pub size: u32,
    pub words: Vec<Word>,
}

impl WordSet {
    /// Load one of the word lists compiled into the binary.
    pub fn load(name: &str) -> Self {
        let file = WORDS_DIR
            .get_file(format!("{}.json", name))
            .expect("Word list not found");

        let file_as_str = file
            .contents_utf8()
            .expect("Unable to interpret word list as a string");

        Self::parse(file_as_str).expect("Unable to deserialize embedded word list")
    }

    /// Load a user-supplied list with the same JSON shape as the embedded ones.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self, Box<dyn Error>> {
        let WordSet { name, words, .. } = from_str::<WordSet>(contents)?;
        // Duplicate romanizations would skew the draw distribution.
        let words: Vec<Word> = words.into_iter().unique_by(|w| w.roman.clone()).collect();
        Ok(WordSet {
            name,
            size: words.len() as u32,
            words,
        })
    }

    pub fn from_words(name: &str, words: Vec<Word>) -> Self {
        Self {
            name: name.to_string(),
            size: words.len() as u32,
            words,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Uniform random draw; an empty list degrades to the fallback word.
    pub fn draw(&self) -> Word {
        self.words
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(Word::fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_japanese() {
        let set = WordSet::load("japanese");

        assert_eq!(set.name, "japanese");
        assert!(set.words.len() > 0);
        assert_eq!(set.size as usize, set.words.len());
    }

    #[test]
    fn test_load_japanese_long() {
        let set = WordSet::load("japanese_long");

        assert_eq!(set.name, "japanese_long");
        assert!(set.words.len() > 0);
    }

    #[test]
    #[should_panic(expected = "Word list not found")]
    fn test_load_nonexistent_list() {
        let _set = WordSet::load("nonexistent");
    }

    #[test]
    fn test_draw_comes_from_list() {
        let set = WordSet::load("japanese");

        for _ in 0..10 {
            let word = set.draw();
            assert!(set.words.contains(&word));
        }
    }

    #[test]
    fn test_draw_from_empty_list_falls_back() {
        let set = WordSet::from_words("empty", vec![]);

        let word = set.draw();
        assert_eq!(word, Word::fallback());
        assert!(!word.roman.is_empty());
    }

    #[test]
    fn test_alternatives_present_where_expected() {
        let set = WordSet::load("japanese");
        let sushi = set.words.iter().find(|w| w.roman == "sushi").unwrap();

        assert!(sushi.alternatives.contains(&"susi".to_string()));
    }

    #[test]
    fn test_parse_dedups_by_roman() {
        let json = r#"
        {
            "name": "dupes",
            "size": 3,
            "words": [
                { "display": "ねこ", "roman": "neko" },
                { "display": "ネコ", "roman": "neko" },
                { "display": "いぬ", "roman": "inu" }
            ]
        }
        "#;

        let set = WordSet::parse(json).unwrap();

        assert_eq!(set.words.len(), 2);
        assert_eq!(set.size, 2);
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(
            &path,
            r#"{ "name": "custom", "size": 1, "words": [ { "display": "やま", "roman": "yama" } ] }"#,
        )
        .unwrap();

        let set = WordSet::from_file(&path).unwrap();

        assert_eq!(set.name, "custom");
        assert_eq!(set.words.len(), 1);
        assert_eq!(set.words[0].roman, "yama");
    }

    #[test]
    fn test_from_file_missing_path_errors() {
        let result = WordSet::from_file("/definitely/not/here.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_word_deserialization_without_alternatives() {
        let word: Word = from_str(r#"{ "display": "やま", "roman": "yama" }"#).unwrap();

        assert_eq!(word.roman, "yama");
        assert!(word.alternatives.is_empty());
    }
}
