//! Target sentence selection.
//!
//! Sentences are built from a fixed word list: common short English words
//! joined by single spaces. The server picks one sentence per lobby at
//! creation; solo races pick locally.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Default number of words in a generated sentence.
pub const DEFAULT_WORD_COUNT: usize = 10;

/// Word pool for generated sentences. Lowercase, no punctuation, so every
/// target character is a plain printable key.
const WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "pack",
    "my", "box", "with", "five", "dozen", "liquor", "jugs", "how", "vexed",
    "zebras", "daft", "time", "flies", "like", "an", "arrow", "fruit",
    "banana", "keyboard", "lane", "race", "typing", "speed", "words", "per",
    "minute", "finish", "line", "first", "place", "steady", "hands", "focus",
    "rhythm", "stream", "signal", "server", "client", "lobby", "start",
];

/// Generate a random sentence of `word_count` words.
///
/// A zero `word_count` yields an empty sentence; callers that want a real
/// race should pass at least one word.
#[must_use]
pub fn random_sentence(word_count: usize) -> String {
    sentence_from_rng(&mut rand::rng(), word_count)
}

/// Generate a sentence using the provided RNG. Split out so tests can pass
/// a seeded generator.
pub fn sentence_from_rng<R: Rng + ?Sized>(rng: &mut R, word_count: usize) -> String {
    let mut words = Vec::with_capacity(word_count);
    for _ in 0..word_count {
        if let Some(word) = WORDS.choose(rng) {
            words.push(*word);
        }
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn word_count_matches() {
        let mut rng = StdRng::seed_from_u64(7);
        let sentence = sentence_from_rng(&mut rng, 10);
        assert_eq!(sentence.split(' ').count(), 10);
    }

    #[test]
    fn zero_words_is_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(sentence_from_rng(&mut rng, 0).is_empty());
    }

    #[test]
    fn only_printable_ascii() {
        let sentence = random_sentence(DEFAULT_WORD_COUNT);
        assert!(sentence.chars().all(|c| c == ' ' || c.is_ascii_lowercase()));
        assert!(!sentence.starts_with(' '));
        assert!(!sentence.ends_with(' '));
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let a = sentence_from_rng(&mut StdRng::seed_from_u64(42), 8);
        let b = sentence_from_rng(&mut StdRng::seed_from_u64(42), 8);
        assert_eq!(a, b);
    }
}
