//! 検索
//!
//! バッファの行を走査する状態を持たない検索。結果は (行, 列) 順。

pub mod matcher;
pub mod types;

pub use matcher::{LiteralMatcher, RegexMatcher, StringMatcher};
pub use types::{SearchMatch, SearchResults};

use crate::cancel::CancelToken;
use crate::error::BufferError;

/// すべての行をマッチャーで走査する
///
/// キャンセルされた場合はそれまでの結果を返す（1行ごとに確認）。
pub fn scan_lines<M>(lines: &[String], matcher: &M, cancel: Option<&CancelToken>) -> Vec<SearchMatch>
where
    M: StringMatcher + ?Sized,
{
    let mut matches = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            log::debug!("search cancelled after {} lines", index);
            break;
        }
        matches.extend(matcher.find_in_line(index, line));
    }
    matches
}

/// リテラル検索
pub fn find_text(lines: &[String], query: &str, case_sensitive: bool) -> Vec<SearchMatch> {
    if query.is_empty() {
        return Vec::new();
    }
    scan_lines(lines, &LiteralMatcher::new(query, case_sensitive), None)
}

/// キャンセル可能なリテラル検索
pub fn find_text_cancellable(
    lines: &[String],
    query: &str,
    case_sensitive: bool,
    cancel: &CancelToken,
) -> Vec<SearchMatch> {
    if query.is_empty() {
        return Vec::new();
    }
    scan_lines(lines, &LiteralMatcher::new(query, case_sensitive), Some(cancel))
}

/// 正規表現検索
pub fn find_regex(
    lines: &[String],
    pattern: &str,
    case_sensitive: bool,
) -> Result<Vec<SearchMatch>, BufferError> {
    if pattern.is_empty() {
        return Ok(Vec::new());
    }
    let matcher = RegexMatcher::new(pattern, case_sensitive)?;
    Ok(scan_lines(lines, &matcher, None))
}
