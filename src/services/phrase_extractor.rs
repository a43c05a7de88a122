use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::PhraseSet;

/// Runs of alphabetic words of at least three letters separated by whitespace only.
static WORD_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\p{L}{3,}(?:\s+\p{L}{3,})*\b").expect("word run pattern"));

/// Word-like tokens; keeps `c++`, `c#`, `node.js` and `front-end` in one piece.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}](?:[\p{L}\p{N}+#'\-]|\.[\p{L}\p{N}])*").expect("token pattern")
});

const MAX_PATTERN_WORDS: usize = 3;

/// Function words that end a chunk.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "against", "all", "along", "also", "am", "among",
    "an", "and", "any", "are", "around", "as", "at", "be", "because", "been", "before", "being",
    "below", "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing",
    "during", "each", "either", "etc", "every", "few", "for", "from", "had", "has", "have",
    "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in", "including",
    "into", "is", "it", "its", "just", "may", "me", "might", "more", "most", "must", "my",
    "neither", "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other", "our",
    "ours", "out", "over", "own", "per", "same", "shall", "she", "should", "so", "some", "such",
    "than", "that", "the", "their", "theirs", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "upon", "us", "very", "via", "was",
    "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "within", "without", "would", "you", "your", "yours",
];

/// Turns raw text into a normalized, filtered phrase set.
pub trait PhraseExtractor: Send + Sync {
    fn extract(&self, text: &str) -> PhraseSet;

    fn strategy(&self) -> ExtractionStrategy;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Noun-phrase-like chunks delimited by punctuation and function words.
    Chunk,
    /// Every 1 to 3 word window over runs of alphabetic words.
    Pattern,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::Chunk => "chunk",
            ExtractionStrategy::Pattern => "pattern",
        }
    }

    pub fn extractor(self) -> Arc<dyn PhraseExtractor> {
        match self {
            ExtractionStrategy::Chunk => Arc::new(ChunkExtractor),
            ExtractionStrategy::Pattern => Arc::new(PatternExtractor),
        }
    }
}

impl FromStr for ExtractionStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "chunk" => Ok(ExtractionStrategy::Chunk),
            "pattern" => Ok(ExtractionStrategy::Pattern),
            other => Err(format!(
                "unknown extraction strategy '{}' (expected chunk or pattern)",
                other
            )),
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl PhraseExtractor for PatternExtractor {
    fn extract(&self, text: &str) -> PhraseSet {
        let mut phrases = PhraseSet::new();

        for run in WORD_RUN.find_iter(text) {
            let words: Vec<&str> = run.as_str().split_whitespace().collect();
            for size in 1..=MAX_PATTERN_WORDS.min(words.len()) {
                for window in words.windows(size) {
                    phrases.insert(&window.join(" "));
                }
            }
        }

        tracing::debug!(
            strategy = "pattern",
            input_chars = text.chars().count(),
            phrases = phrases.len(),
            "Phrase extraction completed"
        );
        phrases
    }

    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::Pattern
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ChunkExtractor;

impl ChunkExtractor {
    fn is_stopword(token: &str) -> bool {
        STOPWORDS.contains(&token.to_lowercase().as_str())
    }

    /// Anything other than spaces and tabs between two tokens closes the chunk.
    fn is_boundary(gap: &str) -> bool {
        gap.chars().any(|c| c == '\n' || !c.is_whitespace())
    }

    fn chunks(text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut previous_end = 0;

        for token in TOKEN.find_iter(text) {
            if Self::is_boundary(&text[previous_end..token.start()]) && !current.is_empty() {
                chunks.push(current.join(" "));
                current.clear();
            }
            previous_end = token.end();

            if Self::is_stopword(token.as_str()) {
                if !current.is_empty() {
                    chunks.push(current.join(" "));
                    current.clear();
                }
                continue;
            }
            current.push(token.as_str());
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }
        chunks
    }
}

impl PhraseExtractor for ChunkExtractor {
    fn extract(&self, text: &str) -> PhraseSet {
        let phrases: PhraseSet = Self::chunks(text).into_iter().collect();

        tracing::debug!(
            strategy = "chunk",
            input_chars = text.chars().count(),
            phrases = phrases.len(),
            "Phrase extraction completed"
        );
        phrases
    }

    fn strategy(&self) -> ExtractionStrategy {
        ExtractionStrategy::Chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{is_valid_phrase, normalize_phrase};
    use std::io::Write;
    use std::sync::Mutex;

    const RESUME: &str = "Senior Software Engineer\n\
        Built distributed systems in Rust and Go. Led migration to Kubernetes; \
        mentored 4 engineers.\n\
        Skills: PostgreSQL, Docker, C++, node.js, machine learning pipelines";

    fn strategies() -> Vec<Arc<dyn PhraseExtractor>> {
        vec![
            ExtractionStrategy::Pattern.extractor(),
            ExtractionStrategy::Chunk.extractor(),
        ]
    }

    #[test]
    fn test_every_phrase_passes_the_filter() {
        for extractor in strategies() {
            let phrases = extractor.extract(RESUME);
            assert!(!phrases.is_empty(), "{} found nothing", extractor.strategy());
            for phrase in &phrases {
                assert!(is_valid_phrase(phrase), "{:?} from {}", phrase, extractor.strategy());
                assert_eq!(&normalize_phrase(phrase), phrase);
                assert_eq!(phrase.trim(), phrase.as_str());
            }
        }
    }

    #[test]
    fn test_extraction_is_deterministic_and_case_insensitive() {
        for extractor in strategies() {
            let upper = extractor.extract(&RESUME.to_uppercase());
            let lower = extractor.extract(&RESUME.to_lowercase());
            assert_eq!(upper, lower);
            assert_eq!(extractor.extract(RESUME), extractor.extract(RESUME));
        }
    }

    #[test]
    fn test_empty_and_blank_text() {
        for extractor in strategies() {
            assert!(extractor.extract("").is_empty());
            assert!(extractor.extract("  \n\t ").is_empty());
            assert!(extractor.extract("a an to of 42 %%").is_empty());
        }
    }

    #[test]
    fn test_pattern_emits_word_windows() {
        let phrases =
            PatternExtractor.extract("Looking for a Python developer with cloud experience");

        assert!(phrases.contains("python"));
        assert!(phrases.contains("python developer"));
        assert!(phrases.contains("python developer with"));
        assert!(phrases.contains("cloud experience"));
        assert!(phrases.contains("developer with cloud"));
        // "for" is too short after filtering and "a" breaks the run
        assert!(!phrases.contains("for"));
        assert!(!phrases.contains("looking for python"));
        // windows never exceed three words
        assert!(!phrases.contains("python developer with cloud"));
    }

    #[test]
    fn test_pattern_ignores_short_and_mixed_words() {
        let phrases = PatternExtractor.extract("Go, AWS and k8s. Python3 tooling.");
        assert!(phrases.contains("tooling"));
        assert!(!phrases.contains("python"));
        assert!(!phrases.iter().any(|p| p.contains("k8s")));
    }

    #[test]
    fn test_pattern_does_not_cross_punctuation() {
        let phrases =
            PatternExtractor.extract("Experienced Python developer. Skilled in cloud computing.");
        assert!(phrases.contains("experienced python developer"));
        assert!(!phrases.contains("developer skilled"));
        assert!(phrases.contains("cloud computing"));
    }

    #[test]
    fn test_chunks_split_on_function_words_and_punctuation() {
        let chunks = ChunkExtractor::chunks("Looking for a Python developer with cloud experience");
        assert_eq!(chunks, vec!["Looking", "Python developer", "cloud experience"]);

        let chunks = ChunkExtractor::chunks("Skills: PostgreSQL, node.js\nC++ and REST APIs");
        assert_eq!(chunks, vec!["Skills", "PostgreSQL", "node.js", "C++", "REST APIs"]);
    }

    #[test]
    fn test_chunk_extraction_drops_filtered_chunks() {
        let phrases = ChunkExtractor.extract("Skills: Go, C++, Rust programming, 5 years");
        assert!(phrases.contains("skills"));
        assert!(phrases.contains("rust programming"));
        assert!(!phrases.contains("c++"));
        assert!(!phrases.contains("5 years"));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("pattern".parse::<ExtractionStrategy>(), Ok(ExtractionStrategy::Pattern));
        assert_eq!("CHUNK".parse::<ExtractionStrategy>(), Ok(ExtractionStrategy::Chunk));
        assert!("spacy".parse::<ExtractionStrategy>().is_err());
        assert_eq!(ExtractionStrategy::Chunk.extractor().strategy(), ExtractionStrategy::Chunk);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_extraction_log_counts_characters() {
        // 11 characters, 14 bytes
        let text = "Café résumé";

        for extractor in strategies() {
            let buffer = LogBuffer::default();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_ansi(false)
                .with_writer({
                    let buffer = buffer.clone();
                    move || buffer.clone()
                })
                .finish();

            let phrases = tracing::subscriber::with_default(subscriber, || extractor.extract(text));
            assert!(phrases.contains("café résumé"));

            let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
            assert!(logs.contains("input_chars=11"), "{}: {}", extractor.strategy(), logs);
        }
    }
}
