// Text Processing Service
// Tokenizers and small statistics shared by the scoring analyzers

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[a-z0-9]+(?:'[a-z]+)?").expect("word regex"))
}

fn word_span_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[a-z0-9]+(?:['\u{2019}][a-z]+)?").expect("word span regex"))
}

fn sentence_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("sentence regex"))
}

fn sentence_terminal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^.!?]+([.!?]+)?").expect("sentence terminal regex"))
}

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("paragraph regex"))
}

fn vowel_group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[aeiouy]+").expect("vowel regex"))
}

/// Normalize smart quotes, dashes and line endings so the regexes below see plain ASCII punctuation
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    text.replace(['\u{201c}', '\u{201d}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{2013}', '\u{2014}'], "-")
        .replace('\u{00A0}', " ")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Lowercase word tokens (letters, digits, inner apostrophes)
pub fn tokenize_words(text: &str) -> Vec<String> {
    let lower = normalize_text(text).to_lowercase();
    word_re()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Word token with its char offsets (and byte offsets) in the source text
#[derive(Debug, Clone, PartialEq)]
pub struct WordSpan {
    pub word: String,
    pub start: usize,
    pub end: usize,
    pub byte_start: usize,
    pub byte_end: usize,
}

/// Like `tokenize_words`, but keeps offsets into the unmodified input.
/// Char offsets are carried forward from the previous match, so this stays linear.
pub fn word_spans(text: &str) -> Vec<WordSpan> {
    let mut byte_pos = 0usize;
    let mut char_pos = 0usize;
    word_span_re()
        .find_iter(text)
        .map(|m| {
            char_pos += text[byte_pos..m.start()].chars().count();
            let len = m.as_str().chars().count();
            let span = WordSpan {
                word: m.as_str().replace('\u{2019}', "'").to_lowercase(),
                start: char_pos,
                end: char_pos + len,
                byte_start: m.start(),
                byte_end: m.end(),
            };
            char_pos += len;
            byte_pos = m.end();
            span
        })
        .collect()
}

/// Split on runs of `.`, `!` or `?`, dropping empty pieces
pub fn split_sentences(text: &str) -> Vec<String> {
    sentence_split_re()
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sentence with the punctuation run that closed it (None for a trailing fragment)
#[derive(Debug, Clone, PartialEq)]
pub struct TerminatedSentence {
    pub text: String,
    pub terminal: Option<char>,
}

pub fn split_sentences_with_terminal(text: &str) -> Vec<TerminatedSentence> {
    sentence_terminal_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?.as_str();
            let terminal = caps.get(1).and_then(|m| m.as_str().chars().last());
            let body = whole.trim_end_matches(['.', '!', '?']).trim();
            if body.is_empty() {
                return None;
            }
            Some(TerminatedSentence {
                text: body.to_string(),
                terminal,
            })
        })
        .collect()
}

/// Paragraphs are separated by one or more blank lines
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = normalize_text(text);
    paragraph_re()
        .split(&normalized)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Vowel-cluster syllable estimate with silent trailing `e` correction
pub fn count_syllables(word: &str) -> usize {
    let w = word.to_lowercase();
    let w: String = w.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    if w.is_empty() {
        return 0;
    }
    if w.len() <= 3 {
        return 1;
    }

    let mut count = vowel_group_re().find_iter(&w).count();
    if w.ends_with('e') && !w.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for fewer than two values
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Frequency table of contiguous n-token windows
pub fn ngram_counts<'a>(tokens: &'a [String], n: usize) -> HashMap<&'a [String], usize> {
    let mut counts: HashMap<&[String], usize> = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Up to `radius` characters either side of the byte range `[byte_start, byte_end)`.
/// Only the window itself is walked; offsets off a char boundary yield an empty string.
pub fn context_window(text: &str, byte_start: usize, byte_end: usize, radius: usize) -> String {
    if byte_start > byte_end {
        return String::new();
    }
    let (Some(before), Some(after)) = (text.get(..byte_start), text.get(byte_end..)) else {
        return String::new();
    };
    let from = before
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(byte_start, |(i, _)| i);
    let to = after
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| byte_end + i);
    text[from..to].trim().to_string()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive whole-word (or whole-phrase) occurrences in already-lowercased text
pub fn count_phrase(haystack_lower: &str, phrase: &str) -> usize {
    let phrase = phrase.to_lowercase();
    if phrase.is_empty() {
        return 0;
    }
    haystack_lower
        .match_indices(phrase.as_str())
        .filter(|(i, m)| {
            let before = haystack_lower[..*i].chars().next_back();
            let after = haystack_lower[i + m.len()..].chars().next();
            !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
        })
        .count()
}
