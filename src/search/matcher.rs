//! 検索用マッチャー

use super::types::SearchMatch;
use crate::error::BufferError;
use regex::{Regex, RegexBuilder};

/// 文字列マッチング戦略（1行単位）
pub trait StringMatcher {
    /// 行内のすべてのマッチを列順で返す
    fn find_in_line(&self, line_index: usize, text: &str) -> Vec<SearchMatch>;
}

/// リテラルマッチャー（重なり合うマッチも列挙する）
#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    pattern: Vec<char>,
    case_sensitive: bool,
}

impl LiteralMatcher {
    pub fn new(pattern: &str, case_sensitive: bool) -> Self {
        Self {
            pattern: pattern.chars().collect(),
            case_sensitive,
        }
    }
}

impl StringMatcher for LiteralMatcher {
    fn find_in_line(&self, line_index: usize, text: &str) -> Vec<SearchMatch> {
        if self.pattern.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        if self.pattern.len() > chars.len() {
            return Vec::new();
        }

        let width = self.pattern.len();
        (0..=chars.len() - width)
            .filter(|&start| {
                chars[start..start + width]
                    .iter()
                    .zip(&self.pattern)
                    .all(|(a, b)| chars_equal(*a, *b, self.case_sensitive))
            })
            .map(|start| SearchMatch::new(line_index, start, start + width))
            .collect()
    }
}

fn chars_equal(a: char, b: char, case_sensitive: bool) -> bool {
    if case_sensitive || a == b {
        return a == b;
    }

    // Unicodeケースフォールディング（簡易）
    a.to_lowercase().eq(b.to_lowercase())
}

/// 正規表現マッチャー
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, BufferError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|err| BufferError::InvalidPattern(err.to_string()))?;
        Ok(Self { regex })
    }
}

impl StringMatcher for RegexMatcher {
    fn find_in_line(&self, line_index: usize, text: &str) -> Vec<SearchMatch> {
        self.regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| {
                let column = text[..m.start()].chars().count();
                let len = m.as_str().chars().count();
                SearchMatch::new(line_index, column, column + len)
            })
            .collect()
    }
}
