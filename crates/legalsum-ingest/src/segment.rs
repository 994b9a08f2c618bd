//! Sentence segmentation.
//!
//! The normalizer only depends on the [`Segmenter`] trait. [`RuleSegmenter`]
//! is the default: it splits after `.`, `!` or `?` followed by whitespace,
//! unless the period closes an abbreviation, an initial, or a short list
//! enumerator, or the next word starts in lower case.

use std::collections::HashSet;

/// A sentence boundary detector.
///
/// Each call returns a fresh lazy iterator over trimmed, non-empty sentences,
/// so a segmentation can be restarted by calling `segment` again.
pub trait Segmenter: Send + Sync {
    fn segment<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a>;
}

/// Abbreviations common in contracts that end in a period without ending a sentence.
pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "inc", "corp", "co", "ltd", "llc", "no",
    "nos", "art", "sec", "para", "cl", "vs", "v", "e.g", "i.e", "approx", "dept", "est", "jan",
    "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "u.s",
];

/// Punctuation-driven segmenter with an abbreviation list.
#[derive(Debug, Clone)]
pub struct RuleSegmenter {
    abbreviations: HashSet<String>,
}

impl RuleSegmenter {
    pub fn new<I, S>(abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            abbreviations: abbreviations
                .into_iter()
                .map(|a| a.as_ref().trim_end_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Iterate over the sentences of `text`.
    pub fn sentences<'a>(&'a self, text: &'a str) -> Sentences<'a> {
        Sentences {
            text,
            pos: 0,
            segmenter: self,
        }
    }

    /// Whether a period after `word` is part of the word rather than a sentence end.
    fn is_non_terminal(&self, word: &str) -> bool {
        let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
        if word.is_empty() {
            return false;
        }
        // Single-letter initials: "J. Smith", "(a). "
        let mut chars = word.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_alphabetic() {
                return true;
            }
        }
        // Short enumerators: "1. Definitions", "12. Term"
        if word.len() <= 2 && word.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
        self.abbreviations.contains(&word.to_lowercase())
    }
}

impl Default for RuleSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_ABBREVIATIONS)
    }
}

impl Segmenter for RuleSegmenter {
    fn segment<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        Box::new(self.sentences(text))
    }
}

/// Lazy sentence iterator returned by [`RuleSegmenter::sentences`].
pub struct Sentences<'a> {
    text: &'a str,
    pos: usize,
    segmenter: &'a RuleSegmenter,
}

impl<'a> Sentences<'a> {
    /// Byte offset just past the next sentence boundary at or after `from`,
    /// or `None` when the rest of the text is one sentence.
    fn next_boundary(&self, from: usize) -> Option<usize> {
        let rest = &self.text[from..];
        let mut iter = rest.char_indices().peekable();

        while let Some((i, c)) = iter.next() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }

            // Swallow repeated terminators and closing quotes/brackets.
            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = iter.peek() {
                if matches!(next, '.' | '!' | '?' | '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}') {
                    end = j + next.len_utf8();
                    iter.next();
                } else {
                    break;
                }
            }

            // A boundary needs trailing whitespace.
            match iter.peek() {
                Some(&(_, next)) if next.is_whitespace() => {}
                _ => continue,
            }

            if c == '.' {
                let word = rest[..i].rsplit(char::is_whitespace).next().unwrap_or("");
                if self.segmenter.is_non_terminal(word) {
                    continue;
                }
                let following = rest[end..].trim_start().chars().next();
                if following.is_some_and(|f| f.is_lowercase()) {
                    continue;
                }
            }

            return Some(from + end);
        }

        None
    }
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while self.pos < self.text.len() {
            let start = self.pos;
            let end = self.next_boundary(start).unwrap_or(self.text.len());
            self.pos = end;

            let sentence = self.text[start..end].trim();
            if !sentence.is_empty() {
                return Some(sentence);
            }
        }
        None
    }
}
