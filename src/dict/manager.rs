use crate::checker::dictionary::{append_personal_words, Dictionary};
use crate::config::Config;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

// Pinned to a commit so a download always yields the same word list.
const WORDLIST_BASE_URL: &str =
    "https://raw.githubusercontent.com/dwyl/english-words/6e4bc58ad764c3e6df8b5be4048671962c9d6a23";
const WORDLIST_VERSION: &str = "2023.12";

pub struct DictionaryInfo {
    pub language: String,
    pub path: PathBuf,
    pub word_count: usize,
    pub size_bytes: u64,
}

fn data_dir() -> Result<PathBuf> {
    Config::data_dir().context("Failed to get data directory")
}

/// Installed dictionaries in `dir`, sorted by language.
pub fn installed(dir: &Path) -> Result<Vec<DictionaryInfo>> {
    let mut found = Vec::new();
    if !dir.exists() {
        return Ok(found);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("dict") {
            continue;
        }
        let Some(language) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let size_bytes = fs::metadata(&path)?.len();
        let word_count = match Dictionary::load_from_path(&path) {
            Ok(dict) => dict.len(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable dictionary");
                0
            }
        };

        found.push(DictionaryInfo {
            language: language.to_string(),
            path: path.clone(),
            word_count,
            size_bytes,
        });
    }

    found.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(found)
}

pub fn list_dictionaries() -> Result<()> {
    let data_dir = data_dir()?;
    let dictionaries = installed(&data_dir)?;

    if dictionaries.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to download a dictionary.",
            "texspell dict download en_US".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();

    for dict in &dictionaries {
        println!(
            "  {} {} ({}, {})",
            "✓".green(),
            dict.language.cyan().bold(),
            format!("{} words", dict.word_count).dimmed(),
            format!("{}KB", dict.size_bytes / 1024).dimmed()
        );
    }

    println!();
    println!(
        "Data directory: {}",
        data_dir.display().to_string().dimmed()
    );

    Ok(())
}

fn wordlist_url(language: &str) -> Result<String> {
    match language {
        "en_US" | "en_GB" => Ok(format!("{}/words_alpha.txt", WORDLIST_BASE_URL)),
        other => anyhow::bail!(
            "Language '{}' is not supported. Only 'en_US' and 'en_GB' are currently available.",
            other
        ),
    }
}

/// Normalize a raw word list: one lowercase word per line, single letters dropped.
pub fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| line.chars().count() > 1)
        .collect()
}

pub fn download_dictionary(language: &str) -> Result<()> {
    let wordlist_url = wordlist_url(language)?;

    println!(
        "{} dictionary for {} (version: {})...",
        "Downloading".cyan().bold(),
        language.yellow(),
        WORDLIST_VERSION.dimmed()
    );
    println!("Source: {}", wordlist_url.dimmed());

    let data_dir = data_dir()?;
    fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid progress template")?,
    );
    pb.set_message("Downloading...");

    let response =
        reqwest::blocking::get(&wordlist_url).context("Failed to download dictionary")?;

    if !response.status().is_success() {
        pb.finish_and_clear();
        anyhow::bail!("Failed to download dictionary: HTTP {}", response.status());
    }

    let content = response.text().context("Failed to read dictionary download")?;
    pb.finish_with_message("Download complete");

    println!("{}", "Building dictionary...".cyan());
    let words = parse_wordlist(&content);
    println!("Found {} words", words.len().to_string().yellow());

    let dict_path = Dictionary::get_dictionary_path(language)?;
    Dictionary::build_from_words(&words, &dict_path)?;
    tracing::debug!(language, path = %dict_path.display(), words = words.len(), "dictionary installed");

    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dict_path.display().to_string().cyan()
    );

    Ok(())
}

pub fn update_dictionaries() -> Result<()> {
    let languages: Vec<String> = installed(&data_dir()?)?
        .into_iter()
        .map(|dict| dict.language)
        .collect();

    if languages.is_empty() {
        println!("{}", "No dictionaries to update.".yellow());
        return Ok(());
    }

    println!(
        "{} {} {}...",
        "Updating".cyan().bold(),
        languages.len(),
        if languages.len() == 1 {
            "dictionary"
        } else {
            "dictionaries"
        }
    );
    println!();

    for language in languages {
        download_dictionary(&language)?;
        println!();
    }

    println!("{} All dictionaries updated!", "✓".green().bold());

    Ok(())
}

pub fn show_info(language: &str) -> Result<()> {
    let dict_path = Dictionary::get_dictionary_path(language)?;

    if !dict_path.exists() {
        println!(
            "{} Dictionary for {} not found.",
            "✗".red().bold(),
            language.yellow()
        );
        println!(
            "Run {} to download it.",
            format!("texspell dict download {}", language).cyan()
        );
        return Ok(());
    }

    let metadata = fs::metadata(&dict_path)?;

    println!("{}", format!("Dictionary: {}", language).bold());
    println!("  Path: {}", dict_path.display());
    println!("  Size: {} KB", metadata.len() / 1024);
    println!("  Version: {}", WORDLIST_VERSION);
    println!("  Format: FST (Finite State Transducer)");

    match Dictionary::load_from_path(&dict_path) {
        Ok(dict) => println!("  Words: {}", dict.len()),
        Err(e) => println!("  {}: {}", "Error loading dictionary".red(), e),
    }

    Ok(())
}

/// Add words to the personal dictionary configured in `config`.
pub fn add_personal_words(config: &Config, words: &[String]) -> Result<()> {
    let path = config
        .personal_dictionary
        .as_deref()
        .context("No personal dictionary location available")?;
    append_personal_words(path, words)?;
    println!(
        "{} Added {} {} to {}",
        "✓".green().bold(),
        words.len(),
        if words.len() == 1 { "word" } else { "words" },
        path.display().to_string().cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_installed_dictionaries() {
        let dir = tempdir().unwrap();
        let words = vec!["alpha".to_string(), "beta".to_string()];
        Dictionary::build_from_words(&words, &dir.path().join("en_GB.dict")).unwrap();
        Dictionary::build_from_words(&words[..1], &dir.path().join("de_DE.dict")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let found = installed(dir.path()).unwrap();
        let summary: Vec<_> = found
            .iter()
            .map(|d| (d.language.as_str(), d.word_count))
            .collect();
        assert_eq!(summary, vec![("de_DE", 1), ("en_GB", 2)]);

        assert!(installed(&dir.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_wordlist() {
        let words = parse_wordlist("Apple\n a \n\nbanana\r\nx\n");
        assert_eq!(words, vec!["apple", "banana"]);
    }

    #[test]
    fn test_unsupported_language() {
        assert!(wordlist_url("fr_FR").is_err());
        assert!(wordlist_url("en_GB").unwrap().ends_with("words_alpha.txt"));
    }
}
