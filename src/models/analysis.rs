use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Collapses internal whitespace, trims and lower-cases a candidate phrase.
pub fn normalize_phrase(candidate: &str) -> String {
    candidate
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Post-filter shared by every extraction strategy: strictly between 3 and 30
/// characters, starting with a letter.
pub fn is_valid_phrase(phrase: &str) -> bool {
    let length = phrase.chars().count();
    length > 3
        && length < 30
        && phrase.chars().next().is_some_and(char::is_alphabetic)
}

/// Deduplicated set of normalized skill phrases.
///
/// Entries can only enter through [`PhraseSet::insert`], so every member is
/// normalized and passes [`is_valid_phrase`]. Iteration is lexicographic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PhraseSet(BTreeSet<String>);

impl PhraseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and inserts a candidate. Returns false when the candidate was
    /// rejected by the filter or already present.
    pub fn insert(&mut self, candidate: &str) -> bool {
        let phrase = normalize_phrase(candidate);
        if !is_valid_phrase(&phrase) {
            return false;
        }
        self.0.insert(phrase)
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.0.contains(phrase)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }

    pub fn intersection(&self, other: &PhraseSet) -> PhraseSet {
        PhraseSet(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &PhraseSet) -> PhraseSet {
        PhraseSet(self.0.difference(&other.0).cloned().collect())
    }

    pub fn union(&self, other: &PhraseSet) -> PhraseSet {
        PhraseSet(self.0.union(&other.0).cloned().collect())
    }
}

impl<S: AsRef<str>> FromIterator<S> for PhraseSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PhraseSet::new();
        for candidate in iter {
            set.insert(candidate.as_ref());
        }
        set
    }
}

impl<'a> IntoIterator for &'a PhraseSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub matched: PhraseSet,
    pub missing: PhraseSet,
    pub extra: PhraseSet,
    /// `extra` ordered by descending length then lexicographically, at most ten.
    pub ranked_extra: Vec<String>,
}

/// Bounded synopsis produced by the summarization model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary(String);

impl Summary {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported cover letter tone '{0}' (expected friendly, professional or informal)")]
pub struct UnsupportedTone(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Friendly,
    Professional,
    Informal,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
            Tone::Informal => "informal",
        }
    }
}

impl FromStr for Tone {
    type Err = UnsupportedTone;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "friendly" => Ok(Tone::Friendly),
            "professional" => Ok(Tone::Professional),
            "informal" => Ok(Tone::Informal),
            other => Err(UnsupportedTone(other.to_string())),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverLetterDraft {
    pub tone: Tone,
    pub generated_body: String,
    pub formatted_letter: String,
}

/// Paginated PDF produced from résumé text.
#[derive(Debug, Clone)]
pub struct RenderedResume {
    pub bytes: Bytes,
    pub pages: usize,
    pub paragraphs: usize,
}

/// Everything one analysis request produces.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub job_summary: Summary,
    pub resume_summary: Summary,
    pub comparison: ComparisonResult,
    pub resume_text: String,
}
