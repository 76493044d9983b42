// SecretCLI — Password Suggester
//
// Generates passwords from an alphabet spanning uppercase, lowercase, digit,
// and symbol classes. Every suggestion contains at least one character of
// each class; the remaining positions are drawn uniformly from the full
// alphabet and the result is shuffled. Randomness comes from `rand::rng()`,
// a CSPRNG seeded from the operating system.

use rand::seq::SliceRandom;
use rand::Rng;

/// Shortest password the suggester will produce.
pub const MIN_LENGTH: usize = 12;

/// Longest password the suggester will produce.
pub const MAX_LENGTH: usize = 128;

/// Length used when none is configured.
pub const DEFAULT_LENGTH: usize = 16;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.<>?";

const CLASSES: [&[u8]; 4] = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggester {
    length: usize,
}

impl Suggester {
    /// A suggester producing `length` characters, clamped to
    /// `MIN_LENGTH..=MAX_LENGTH`.
    pub fn new(length: usize) -> Self {
        let clamped = length.clamp(MIN_LENGTH, MAX_LENGTH);
        if clamped != length {
            tracing::debug!(
                requested = length,
                length = clamped,
                "Suggested password length clamped"
            );
        }
        Self { length: clamped }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Every character a suggestion may contain.
    pub fn alphabet() -> Vec<u8> {
        CLASSES.concat()
    }

    pub fn suggest(&self) -> String {
        let mut rng = rand::rng();
        let alphabet = Self::alphabet();

        let mut chars: Vec<u8> = Vec::with_capacity(self.length);
        for class in CLASSES {
            chars.push(class[rng.random_range(0..class.len())]);
        }
        while chars.len() < self.length {
            chars.push(alphabet[rng.random_range(0..alphabet.len())]);
        }
        chars.shuffle(&mut rng);

        chars.into_iter().map(char::from).collect()
    }
}

impl Default for Suggester {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_length() {
        let suggester = Suggester::default();
        assert_eq!(suggester.length(), DEFAULT_LENGTH);
        assert_eq!(suggester.suggest().len(), DEFAULT_LENGTH);
    }

    #[test]
    fn test_length_is_clamped_to_minimum() {
        for requested in [0, 1, 4, MIN_LENGTH - 1] {
            let suggester = Suggester::new(requested);
            assert_eq!(suggester.length(), MIN_LENGTH);
            assert_eq!(suggester.suggest().len(), MIN_LENGTH);
        }
        assert_eq!(Suggester::new(40).suggest().len(), 40);
    }

    #[test]
    fn test_length_is_clamped_to_maximum() {
        for requested in [MAX_LENGTH + 1, 1_000_000, usize::MAX] {
            let suggester = Suggester::new(requested);
            assert_eq!(suggester.length(), MAX_LENGTH);
            assert_eq!(suggester.suggest().len(), MAX_LENGTH);
        }
        assert_eq!(Suggester::new(MAX_LENGTH).suggest().len(), MAX_LENGTH);
    }

    #[test]
    fn test_characters_come_from_alphabet() {
        let alphabet: HashSet<u8> = Suggester::alphabet().into_iter().collect();
        let suggester = Suggester::default();
        for _ in 0..200 {
            let password = suggester.suggest();
            assert!(
                password.bytes().all(|b| alphabet.contains(&b)),
                "{:?} contains a character outside the alphabet",
                password
            );
        }
    }

    #[test]
    fn test_every_class_is_present() {
        let suggester = Suggester::new(MIN_LENGTH);
        for _ in 0..200 {
            let password = suggester.suggest();
            for class in CLASSES {
                assert!(
                    password.bytes().any(|b| class.contains(&b)),
                    "{:?} is missing a character class",
                    password
                );
            }
        }
    }

    #[test]
    fn test_consecutive_suggestions_differ() {
        let suggester = Suggester::default();
        let mut seen = HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(suggester.suggest()), "Suggestion repeated");
        }
    }

    #[test]
    fn test_alphabet_is_free_of_whitespace_and_quotes() {
        let alphabet = Suggester::alphabet();
        assert!(alphabet
            .iter()
            .all(|b| b.is_ascii_graphic() && !matches!(*b, b'"' | b'\'' | b'\\' | b'`')));
    }
}
