//! Approximate String Scoring
//!
//! Bitap (shift-or with error levels) search in the style of Fuse: the
//! pattern is looked up inside the text allowing insertions, deletions and
//! substitutions, and each candidate is scored by error ratio plus distance
//! from the expected location. The best Fuse score (0 = perfect) is reported
//! as a similarity `1 - score`, so higher means closer.

use std::collections::HashMap;

/// Longest pattern the bit-parallel search handles; longer patterns are cut
pub const MAX_PATTERN_LEN: usize = 64;

/// Similarity between a search pattern and a text, in `[0, 1]`
pub trait SimilarityScorer: Send + Sync {
    /// `None` when the pattern cannot be found within the scorer's tolerance
    fn similarity(&self, pattern: &str, text: &str) -> Option<f64>;
}

/// Fuse-style Bitap scorer
#[derive(Debug, Clone)]
pub struct Bitap {
    /// Expected match position in the text
    pub location: usize,
    /// How far from `location` a match may drift before scoring 1.0
    pub distance: usize,
    /// Worst Fuse score still reported (0 = exact, 1 = anything)
    pub threshold: f64,
}

impl Default for Bitap {
    fn default() -> Self {
        Self {
            location: 0,
            distance: 100,
            threshold: 0.6,
        }
    }
}

impl Bitap {
    /// Best Fuse score of `pattern` inside `text` (lower is better)
    pub fn search(&self, pattern: &str, text: &str) -> Option<f64> {
        let pattern: Vec<char> = pattern.chars().take(MAX_PATTERN_LEN).collect();
        let text: Vec<char> = text.chars().collect();
        if pattern.is_empty() || text.is_empty() {
            return None;
        }

        let m = pattern.len();
        let n = text.len();
        let location = self.location.min(n);
        let alphabet = alphabet(&pattern);
        let mut threshold = self.threshold;
        let mut best_location: Option<usize> = None;

        // An exact occurrence bounds how bad a fuzzy hit may be
        if let Some(exact) = find(&text, &pattern, location) {
            threshold = threshold.min(self.score(0, m, location, exact));
        }

        let mask = 1u64 << (m - 1);
        let mut bin_max = m + n;
        let mut last_bits: Vec<u64> = Vec::new();

        for errors in 0..m {
            // Widest window still able to beat the threshold at this error level
            let mut bin_min = 0;
            let mut bin_mid = bin_max;
            while bin_min < bin_mid {
                if self.score(errors, m, location, location + bin_mid) <= threshold {
                    bin_min = bin_mid;
                } else {
                    bin_max = bin_mid;
                }
                bin_mid = (bin_max - bin_min) / 2 + bin_min;
            }
            bin_max = bin_mid;

            let mut start = (location + 1).saturating_sub(bin_mid).max(1);
            let finish = (location + bin_mid).min(n) + m;
            let mut bits = vec![0u64; finish + 2];
            bits[finish + 1] = (1u64 << errors) - 1;

            let mut j = finish;
            while j >= start {
                let current = j - 1;
                let char_match = text
                    .get(current)
                    .and_then(|c| alphabet.get(c))
                    .copied()
                    .unwrap_or(0);

                bits[j] = ((bits[j + 1] << 1) | 1) & char_match;
                if errors > 0 {
                    bits[j] |= (((last_bits[j + 1] | last_bits[j]) << 1) | 1) | last_bits[j + 1];
                }

                if bits[j] & mask != 0 {
                    let score = self.score(errors, m, location, current);
                    if score <= threshold {
                        threshold = score;
                        best_location = Some(current);
                        if current <= location {
                            break;
                        }
                        start = (2 * location).saturating_sub(current).max(1);
                    }
                }
                j -= 1;
            }

            if self.score(errors + 1, m, location, location) > threshold {
                break;
            }
            last_bits = bits;
        }

        best_location.map(|_| threshold)
    }

    fn score(&self, errors: usize, pattern_len: usize, expected: usize, current: usize) -> f64 {
        let accuracy = errors as f64 / pattern_len as f64;
        let proximity = expected.abs_diff(current);
        if self.distance == 0 {
            return if proximity > 0 { 1.0 } else { accuracy };
        }
        accuracy + proximity as f64 / self.distance as f64
    }
}

impl SimilarityScorer for Bitap {
    fn similarity(&self, pattern: &str, text: &str) -> Option<f64> {
        self.search(pattern, text)
            .map(|score| (1.0 - score).clamp(0.0, 1.0))
    }
}

/// Bit mask per pattern character, first character in the highest bit
fn alphabet(pattern: &[char]) -> HashMap<char, u64> {
    let m = pattern.len();
    let mut masks = HashMap::new();
    for (i, c) in pattern.iter().enumerate() {
        *masks.entry(*c).or_insert(0u64) |= 1u64 << (m - i - 1);
    }
    masks
}

fn find(text: &[char], pattern: &[char], from: usize) -> Option<usize> {
    if pattern.len() > text.len() {
        return None;
    }
    (from..=text.len() - pattern.len()).find(|&i| text[i..i + pattern.len()] == *pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_perfect() {
        let bitap = Bitap::default();
        assert_eq!(bitap.search("hello", "hello"), Some(0.0));
        assert_eq!(bitap.similarity("hello", "hello world"), Some(1.0));
    }

    #[test]
    fn test_typo_scores_between() {
        let bitap = Bitap::default();
        let similarity = bitap.similarity("helo", "hello").unwrap();
        assert!(similarity > 0.6 && similarity < 1.0, "got {}", similarity);
    }

    #[test]
    fn test_distance_penalty() {
        let bitap = Bitap::default();
        let near = bitap.similarity("cat", "cat and dog").unwrap();
        let far = bitap.similarity("dog", "cat and dog").unwrap();
        assert!(near > far);
    }

    #[test]
    fn test_unrelated_text() {
        let bitap = Bitap::default();
        assert_eq!(bitap.similarity("xyz", "hello"), None);
        assert_eq!(bitap.similarity("a much longer sentence", "hi"), None);
    }

    #[test]
    fn test_empty_inputs() {
        let bitap = Bitap::default();
        assert_eq!(bitap.similarity("", "hello"), None);
        assert_eq!(bitap.similarity("hello", ""), None);
    }

    #[test]
    fn test_long_pattern_is_truncated() {
        let bitap = Bitap::default();
        let long: String = "ab".repeat(50);
        assert!(bitap.similarity(&long, &long).is_some());
    }
}
