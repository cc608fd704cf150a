use crate::error::HostError;
use crate::host::{OracleResult, SpellOracle};
use crate::ErrorKind;
use anyhow::{Context, Result};
use fst::{Set, SetBuilder};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub struct Dictionary {
    set: Set<Vec<u8>>,
}

impl Dictionary {
    /// Load the installed dictionary for `language`, or the embedded bootstrap list.
    pub fn load(language: &str) -> Result<Self> {
        let dict_path = Self::get_dictionary_path(language)?;

        if !dict_path.exists() {
            tracing::warn!(
                language,
                path = %dict_path.display(),
                "dictionary not installed, using the embedded word list"
            );
            return Self::from_words(&Self::get_basic_wordlist(language));
        }

        Self::load_from_path(&dict_path)
    }

    /// Load a dictionary built by [`Dictionary::build_from_words`].
    ///
    /// The whole set is read into memory, so rebuilding the file afterwards
    /// does not affect a loaded dictionary.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;

        let mut bytes = Vec::new();
        BufReader::new(file)
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read dictionary: {}", path.display()))?;
        let set = Set::new(bytes).context("Failed to parse dictionary")?;

        Ok(Self { set })
    }

    /// Build an in-memory dictionary.
    pub fn from_words(words: &[String]) -> Result<Self> {
        let mut sorted: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        sorted.sort();
        sorted.dedup();

        let set = Set::from_iter(sorted).context("Failed to build dictionary")?;
        Ok(Self { set })
    }

    /// Check if the lowercase form of `word` is known.
    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.to_lowercase().as_bytes())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Build dictionary from word list.
    ///
    /// The set is written next to `output_path` and renamed into place, so
    /// readers never see a partially written file.
    pub fn build_from_words(words: &[String], output_path: &Path) -> Result<()> {
        let mut sorted_words: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        sorted_words.sort();
        sorted_words.dedup();

        let mut staging = output_path.as_os_str().to_owned();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        let file = File::create(&staging)
            .with_context(|| format!("Failed to create dictionary: {}", staging.display()))?;

        let writer = BufWriter::new(file);
        let mut builder = SetBuilder::new(writer).context("Failed to create FST builder")?;

        for word in sorted_words {
            builder
                .insert(word.as_bytes())
                .context("Failed to insert word into dictionary")?;
        }

        builder.finish().context("Failed to finalize dictionary")?;
        fs::rename(&staging, output_path)
            .with_context(|| format!("Failed to install dictionary: {}", output_path.display()))?;

        Ok(())
    }

    pub fn get_dictionary_path(language: &str) -> Result<PathBuf> {
        let data_dir = crate::config::Config::data_dir().context("Failed to get data directory")?;

        Ok(data_dir.join(format!("{}.dict", language)))
    }

    fn get_basic_wordlist(language: &str) -> Vec<String> {
        let words: &[&str] = match language {
            "en_US" | "en_GB" => &[
                "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for",
                "not", "on", "with", "he", "as", "you", "do", "at", "this", "but", "his", "by",
                "from", "they", "we", "say", "her", "she", "or", "an", "will", "my", "one",
                "all", "would", "there", "their", "what", "so", "up", "out", "if", "about",
                "who", "get", "which", "go", "me", "when", "make", "can", "like", "time", "no",
                "just", "him", "know", "take", "people", "into", "year", "your", "good", "some",
                "could", "them", "see", "other", "than", "then", "now", "look", "only", "come",
                "its", "over", "think", "also", "back", "after", "use", "two", "how", "our",
                "work", "first", "well", "way", "even", "new", "want", "because", "any",
                "these", "give", "day", "most", "us", "is", "are", "was", "were",
                // Common document vocabulary
                "abstract", "appendix", "author", "chapter", "conclusion", "definition",
                "document", "equation", "figure", "introduction", "lemma", "paper", "proof",
                "section", "table", "theorem", "title",
            ],
            _ => &["the", "be", "to", "of", "and", "a", "in", "that", "have", "i"],
        };
        words.iter().map(|s| s.to_string()).collect()
    }
}

/// Read a personal word list: one word per line, `#` starts a comment line.
pub fn read_personal_words(path: &Path) -> Result<HashSet<String>> {
    let mut words = HashSet::new();
    if !path.exists() {
        return Ok(words);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read personal dictionary: {}", path.display()))?;
    for line in content.lines() {
        let word = line.trim();
        if !word.is_empty() && !word.starts_with('#') {
            words.insert(word.to_lowercase());
        }
    }
    Ok(words)
}

/// Append words to a personal word list, creating it if needed.
pub fn append_personal_words(path: &Path, words: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create personal dictionary directory")?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open personal dictionary: {}", path.display()))?;
    for word in words {
        writeln!(file, "{}", word.trim())
            .with_context(|| format!("Failed to write personal dictionary: {}", path.display()))?;
    }
    Ok(())
}

/// Spell oracle backed by an FST word list and a personal dictionary.
pub struct DictionaryOracle {
    dictionary: Dictionary,
    personal_words: HashSet<String>,
}

impl DictionaryOracle {
    pub fn new(dictionary: Dictionary, personal_words: HashSet<String>) -> Self {
        Self {
            dictionary,
            personal_words,
        }
    }

    pub fn load(language: &str, personal_dictionary: Option<&Path>) -> Result<Self> {
        let dictionary = Dictionary::load(language)?;
        let personal_words = match personal_dictionary {
            Some(path) => read_personal_words(path)?,
            None => HashSet::new(),
        };
        Ok(Self::new(dictionary, personal_words))
    }

    fn is_known(&self, lower: &str) -> bool {
        if self.personal_words.contains(lower) || self.dictionary.contains(lower) {
            return true;
        }
        // Possessives of known words.
        lower
            .strip_suffix("'s")
            .is_some_and(|base| self.personal_words.contains(base) || self.dictionary.contains(base))
    }
}

/// Lowercase, UPPERCASE or Capitalized.
fn has_regular_case(word: &str) -> bool {
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    let Some((first, rest)) = letters.split_first() else {
        return true;
    };
    let rest_lower = rest.iter().all(|c| !c.is_uppercase());
    let rest_upper = rest.iter().all(|c| !c.is_lowercase());
    (first.is_lowercase() && rest_lower) || (first.is_uppercase() && (rest_lower || rest_upper))
}

impl SpellOracle for DictionaryOracle {
    fn check(&self, word: &str) -> Result<OracleResult, HostError> {
        let lower = word.to_lowercase();

        if !self.is_known(&lower) {
            return Ok(OracleResult::Misspelled {
                word: word.to_string(),
                kind: ErrorKind::Bad,
            });
        }

        if self.personal_words.contains(&lower) || has_regular_case(word) {
            Ok(OracleResult::Correct)
        } else {
            Ok(OracleResult::Misspelled {
                word: word.to_string(),
                kind: ErrorKind::Caps,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_build_and_load_dictionary() {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("test.dict");

        Dictionary::build_from_words(&words(&["hello", "World", "test"]), &dict_path).unwrap();

        let dict = Dictionary::load_from_path(&dict_path).unwrap();
        assert!(dict.contains("hello"));
        assert!(dict.contains("world"));
        assert!(dict.contains("Test"));
        assert!(!dict.contains("notfound"));
        assert_eq!(dict.len(), 3);
        assert!(!dir.path().join("test.dict.tmp").exists());
    }

    #[test]
    fn test_rebuild_does_not_affect_loaded_dictionary() {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("en_US.dict");
        let many: Vec<String> = (0..20_000).map(|i| format!("word{:06}", i)).collect();
        Dictionary::build_from_words(&many, &dict_path).unwrap();

        let oracle = DictionaryOracle::new(Dictionary::load_from_path(&dict_path).unwrap(), HashSet::new());
        Dictionary::build_from_words(&words(&["the"]), &dict_path).unwrap();

        assert_eq!(oracle.check("word019999").unwrap(), OracleResult::Correct);
        assert_eq!(oracle.check("word000000").unwrap(), OracleResult::Correct);
        assert_eq!(Dictionary::load_from_path(&dict_path).unwrap().len(), 1);
    }

    #[test]
    fn test_oracle_kinds() {
        let dict = Dictionary::from_words(&words(&["answer", "the", "dog"])).unwrap();
        let oracle = DictionaryOracle::new(dict, HashSet::new());

        assert_eq!(oracle.check("answer").unwrap(), OracleResult::Correct);
        assert_eq!(oracle.check("Answer").unwrap(), OracleResult::Correct);
        assert_eq!(oracle.check("THE").unwrap(), OracleResult::Correct);
        assert_eq!(oracle.check("dog's").unwrap(), OracleResult::Correct);
        assert_eq!(
            oracle.check("Hte").unwrap(),
            OracleResult::misspelled("Hte", "bad")
        );
        assert_eq!(
            oracle.check("aNSwer").unwrap(),
            OracleResult::misspelled("aNSwer", "caps")
        );
    }

    #[test]
    fn test_personal_words() {
        let dir = tempdir().unwrap();
        let personal = dir.path().join("nested").join("personal.txt");

        append_personal_words(&personal, &words(&["LaTeX", "vimtex"])).unwrap();
        fs::write(
            &personal,
            format!("# comment\n{}", fs::read_to_string(&personal).unwrap()),
        )
        .unwrap();

        let personal_words = read_personal_words(&personal).unwrap();
        assert_eq!(personal_words.len(), 2);
        assert!(personal_words.contains("latex"));

        let oracle = DictionaryOracle::new(
            Dictionary::from_words(&words(&["the"])).unwrap(),
            personal_words,
        );
        assert_eq!(oracle.check("LaTeX").unwrap(), OracleResult::Correct);
        assert_eq!(oracle.check("vimtex").unwrap(), OracleResult::Correct);
        assert!(oracle.check("comment").unwrap().is_misspelled());
    }

    #[test]
    fn test_regular_case() {
        assert!(has_regular_case("word"));
        assert!(has_regular_case("Word"));
        assert!(has_regular_case("WORD"));
        assert!(has_regular_case("Don't"));
        assert!(!has_regular_case("wOrd"));
        assert!(!has_regular_case("WOrd"));
    }
}
