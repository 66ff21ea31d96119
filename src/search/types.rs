//! 検索関連の共通型

use crate::buffer::{Position, Selection};

/// 1件の検索マッチ情報（行内、文字単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchMatch {
    /// マッチ行
    pub line: usize,
    /// マッチ開始列
    pub column: usize,
    /// マッチ終了列（排他的）
    pub end_column: usize,
}

impl SearchMatch {
    pub fn new(line: usize, column: usize, end_column: usize) -> Self {
        Self {
            line,
            column,
            end_column,
        }
    }

    /// マッチ開始位置
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// マッチ長（文字数）
    pub fn len(&self) -> usize {
        self.end_column.saturating_sub(self.column)
    }

    pub fn is_empty(&self) -> bool {
        self.column == self.end_column
    }

    /// マッチ範囲を選択範囲として返す
    pub fn to_selection(&self) -> Selection {
        Selection::new(self.position(), Position::new(self.line, self.end_column))
    }
}

/// 検索結果と現在位置
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    query: String,
    matches: Vec<SearchMatch>,
    current: Option<usize>,
}

impl SearchResults {
    pub fn new(query: impl Into<String>, matches: Vec<SearchMatch>) -> Self {
        let current = if matches.is_empty() { None } else { Some(0) };
        Self {
            query: query.into(),
            matches,
            current,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&SearchMatch> {
        self.current.and_then(|idx| self.matches.get(idx))
    }

    /// 次のマッチへ（末尾から先頭へ折り返す）
    pub fn next(&mut self) -> Option<&SearchMatch> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        self.current = Some(self.current.map_or(0, |idx| (idx + 1) % len));
        self.current()
    }

    /// 前のマッチへ（先頭から末尾へ折り返す）
    pub fn prev(&mut self) -> Option<&SearchMatch> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        self.current = Some(self.current.map_or(len - 1, |idx| (idx + len - 1) % len));
        self.current()
    }

    /// 指定行に最も近いマッチを現在位置にする（同距離なら前方を優先）
    pub fn select_nearest(&mut self, line: usize) -> Option<&SearchMatch> {
        let nearest = self
            .matches
            .iter()
            .enumerate()
            .min_by_key(|(_, m)| (m.line.abs_diff(line), m.line < line))
            .map(|(idx, _)| idx)?;
        self.current = Some(nearest);
        self.current()
    }

    /// ステータス行用の表示文字列
    pub fn status_message(&self) -> String {
        match self.current {
            Some(idx) => format!(
                "Match {} of {} for \"{}\"",
                idx + 1,
                self.matches.len(),
                self.query
            ),
            None => format!("検索文字列が見つかりません: {}", self.query),
        }
    }
}
